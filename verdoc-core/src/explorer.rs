//! Versioned API explorer
//!
//! Turns the routes in the container's [`EndpointRegistry`] into
//! [`ApiDescription`]s grouped by API version, and reports the set of versions
//! the service exposes through [`ApiVersionDescriptionProvider`].

use crate::logging::debug;
use crate::{
    ApiVersion, ApiVersionDescription, ApiVersionDescriptionProvider, ApiVersionModel,
    ApiVersioningOptions, Container, EndpointMetadata, EndpointRegistry, HttpMethod,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One route as seen by documentation tooling, within one version group.
#[derive(Debug, Clone)]
pub struct ApiDescription {
    pub method: HttpMethod,
    pub relative_path: String,
    /// Group (document) this description was produced for
    pub group_name: Option<String>,
    pub api_version: Option<ApiVersion>,
    pub metadata: EndpointMetadata,
}

impl ApiDescription {
    pub fn version_model(&self) -> Option<&ApiVersionModel> {
        self.metadata.version_model.as_ref()
    }

    /// Whether the route is deprecated in the version it was described for
    pub fn is_deprecated(&self) -> bool {
        match (self.version_model(), &self.api_version) {
            (Some(model), Some(version)) => model.is_deprecated(version),
            _ => false,
        }
    }
}

/// Source of route descriptions for documentation generators.
pub trait ApiDescriptionProvider: Send + Sync {
    fn api_descriptions(&self) -> Vec<ApiDescription>;
}

type GroupNameFormat = Arc<dyn Fn(&ApiVersion) -> String + Send + Sync>;

/// Explorer deriving versions from the routes' version models.
pub struct VersionedApiExplorer {
    registry: Arc<EndpointRegistry>,
    default_version: ApiVersion,
    group_name_format: GroupNameFormat,
}

impl VersionedApiExplorer {
    pub fn new(registry: Arc<EndpointRegistry>, options: &ApiVersioningOptions) -> Self {
        Self {
            registry,
            default_version: options.default_api_version,
            group_name_format: Arc::new(ApiVersion::group_name),
        }
    }

    /// Override how versions are turned into group names
    pub fn with_group_name_format<F>(mut self, format: F) -> Self
    where
        F: Fn(&ApiVersion) -> String + Send + Sync + 'static,
    {
        self.group_name_format = Arc::new(format);
        self
    }

    fn discovered_versions(&self) -> BTreeMap<ApiVersion, bool> {
        // version -> deprecated by every route that maps it
        let mut versions: BTreeMap<ApiVersion, bool> = BTreeMap::new();
        for route in self.registry.routes() {
            let Some(model) = route.metadata.version_model.as_ref() else {
                continue;
            };
            for version in model.versions() {
                let deprecated = model.is_deprecated(&version);
                versions
                    .entry(version)
                    .and_modify(|all_deprecated| *all_deprecated &= deprecated)
                    .or_insert(deprecated);
            }
        }

        if versions.is_empty() {
            versions.insert(self.default_version, false);
        }
        versions
    }
}

impl ApiVersionDescriptionProvider for VersionedApiExplorer {
    fn api_version_descriptions(&self) -> Vec<ApiVersionDescription> {
        self.discovered_versions()
            .into_iter()
            .map(|(version, deprecated)| {
                ApiVersionDescription::new(version, (self.group_name_format)(&version), deprecated)
            })
            .collect()
    }
}

impl ApiDescriptionProvider for VersionedApiExplorer {
    fn api_descriptions(&self) -> Vec<ApiDescription> {
        let all_versions: Vec<ApiVersion> = self.discovered_versions().into_keys().collect();
        let mut descriptions = Vec::new();

        for route in self.registry.routes() {
            // Version-neutral routes are described once per known version
            let versions = match route.metadata.version_model.as_ref() {
                Some(model) => model.versions(),
                None => all_versions.clone(),
            };

            for version in versions {
                descriptions.push(ApiDescription {
                    method: route.method,
                    relative_path: route.path.clone(),
                    group_name: Some((self.group_name_format)(&version)),
                    api_version: Some(version),
                    metadata: route.metadata.clone(),
                });
            }
        }

        debug!(count = descriptions.len(), "Explored API descriptions");
        descriptions
    }
}

impl Container {
    /// Register the versioned API explorer for the routes added so far.
    ///
    /// The explorer is registered both as the
    /// [`ApiVersionDescriptionProvider`] and as the [`ApiDescriptionProvider`].
    pub fn add_versioned_api_explorer(&self) -> Arc<VersionedApiExplorer> {
        let options = self
            .get::<ApiVersioningOptions>()
            .map(|options| (*options).clone())
            .unwrap_or_default();
        let explorer = Arc::new(VersionedApiExplorer::new(self.endpoints(), &options));

        let as_versions: Arc<dyn ApiVersionDescriptionProvider> = explorer.clone();
        let as_descriptions: Arc<dyn ApiDescriptionProvider> = explorer.clone();
        self.register_dyn(as_versions);
        self.register_dyn(as_descriptions);

        debug!("Versioned API explorer registered");
        explorer
    }

    /// Register API versioning options
    pub fn add_api_versioning(&self, options: ApiVersioningOptions) {
        debug!(
            default_version = %options.default_api_version,
            report_api_versions = options.report_api_versions,
            "API versioning enabled"
        );
        self.register(options);
    }
}
