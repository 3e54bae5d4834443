// Dependency injection container

use crate::logging::{debug, trace};
use crate::{Error, Provider};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

type ProviderMap = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

/// The dependency injection container.
///
/// Concrete providers are keyed by their own type. Trait-object services
/// (`register_dyn`) are keyed by `Arc<dyn Trait>` so that a service can be
/// registered under the interface its consumers resolve.
#[derive(Clone)]
pub struct Container {
    providers: Arc<RwLock<ProviderMap>>,
}

impl Container {
    pub fn new() -> Self {
        debug!("Creating new DI container");
        Self {
            providers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a provider instance, replacing any previous registration
    pub fn register<T: Provider>(&self, instance: T) {
        let type_name = std::any::type_name::<T>();

        trace!(provider = type_name, "Acquiring write lock for registration");
        self.insert(TypeId::of::<T>(), Arc::new(instance));

        debug!(provider = type_name, "Provider registered in DI container");
    }

    /// Register a shared provider instance
    pub fn register_arc<T: Provider>(&self, instance: Arc<T>) {
        let type_name = std::any::type_name::<T>();
        self.insert(TypeId::of::<T>(), instance);
        debug!(provider = type_name, "Shared provider registered");
    }

    /// Register a service under a trait-object type (`Arc<dyn Trait>`)
    pub fn register_dyn<T>(&self, service: Arc<T>)
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let type_name = std::any::type_name::<T>();
        self.insert(TypeId::of::<Arc<T>>(), Arc::new(service));
        debug!(service = type_name, "Service registered in DI container");
    }

    /// Register a provider using a factory function
    pub fn register_factory<T: Provider, F>(&self, factory: F)
    where
        F: FnOnce() -> T,
    {
        let type_name = std::any::type_name::<T>();
        debug!(provider = type_name, "Creating provider from factory");

        let instance = factory();
        self.register(instance);
    }

    /// Resolve a provider, registering one from `factory` if absent
    pub fn resolve_or_register<T: Provider, F>(&self, factory: F) -> Arc<T>
    where
        F: FnOnce() -> T,
    {
        let mut providers = self.providers.write().unwrap_or_else(PoisonError::into_inner);
        let entry = providers
            .entry(TypeId::of::<T>())
            .or_insert_with(|| {
                debug!(
                    provider = std::any::type_name::<T>(),
                    "Registering provider on first use"
                );
                Arc::new(factory())
            })
            .clone();
        drop(providers);

        match entry.downcast::<T>() {
            Ok(provider) => provider,
            // The slot is keyed by TypeId::of::<T>, so the downcast always matches
            Err(_) => unreachable!("provider registered under a foreign TypeId"),
        }
    }

    /// Resolve a provider by type
    pub fn resolve<T: Provider>(&self) -> Result<Arc<T>, Error> {
        let type_name = std::any::type_name::<T>();

        trace!(provider = type_name, "Attempting to resolve provider");
        let result = self.get::<T>().ok_or_else(|| {
            Error::ProviderNotFound(format!("Provider not found: {}", type_name))
        });

        match &result {
            Ok(_) => debug!(provider = type_name, "Provider resolved successfully"),
            Err(_) => debug!(provider = type_name, "Provider not found in container"),
        }

        result
    }

    /// Look up a provider by type, returning `None` when it is not registered
    pub fn get<T: Provider>(&self) -> Option<Arc<T>> {
        self.lookup(TypeId::of::<T>())
            .and_then(|any| any.downcast::<T>().ok())
    }

    /// Look up a service registered with [`Container::register_dyn`]
    pub fn get_dyn<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let service = self
            .lookup(TypeId::of::<Arc<T>>())
            .and_then(|any| any.downcast::<Arc<T>>().ok())
            .map(|outer| Arc::clone(&*outer));

        trace!(
            service = std::any::type_name::<T>(),
            found = service.is_some(),
            "Looked up service"
        );
        service
    }

    /// Resolve a service registered with [`Container::register_dyn`]
    pub fn resolve_dyn<T>(&self) -> Result<Arc<T>, Error>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.get_dyn::<T>().ok_or_else(|| {
            Error::ProviderNotFound(format!(
                "Service not found: {}",
                std::any::type_name::<T>()
            ))
        })
    }

    /// Check if a provider is registered
    pub fn has<T: Provider>(&self) -> bool {
        let exists = self.lookup(TypeId::of::<T>()).is_some();
        trace!(
            provider = std::any::type_name::<T>(),
            exists = exists,
            "Checked provider existence"
        );
        exists
    }

    /// Check if a trait-object service is registered
    pub fn has_dyn<T>(&self) -> bool
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.lookup(TypeId::of::<Arc<T>>()).is_some()
    }

    /// Number of registered providers and services
    pub fn len(&self) -> usize {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all providers
    pub fn clear(&self) {
        let mut providers = self.providers.write().unwrap_or_else(PoisonError::into_inner);
        let count = providers.len();
        providers.clear();

        debug!(provider_count = count, "Cleared all providers from container");
    }

    fn insert(&self, type_id: TypeId, instance: Arc<dyn Any + Send + Sync>) {
        let mut providers = self.providers.write().unwrap_or_else(PoisonError::into_inner);
        providers.insert(type_id, instance);
    }

    fn lookup(&self, type_id: TypeId) -> Option<Arc<dyn Any + Send + Sync>> {
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);
        providers.get(&type_id).cloned()
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}
