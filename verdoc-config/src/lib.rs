// Configuration management for the verdoc framework
//
// Values live in a single tree. Top-level objects are *sections*
// (`{"Swagger": {"Enabled": false}}`) and keys are matched ignoring case, so
// a later `SWAGGER__ENABLED=true` environment variable overrides the file
// value. Paths use `:` between sections, e.g. `Swagger:Enabled`.

pub mod config_service;
pub mod env;
pub mod error;
pub mod loader;
pub mod tree;

pub use config_service::{ConfigService, ConfigServiceBuilder};
pub use env::{ENV_SECTION_SEPARATOR, EnvLoader};
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use verdoc_core::Provider;
use verdoc_core::logging::debug;

/// Separator between section names in a key path
pub const KEY_DELIMITER: char = ':';

fn split_key(key: &str) -> Vec<&str> {
    key.split(KEY_DELIMITER).filter(|s| !s.is_empty()).collect()
}

/// Deserialize a configuration value, retrying with string scalars coerced
/// to booleans and numbers when the direct conversion fails.
fn deserialize_lenient<T: DeserializeOwned>(value: &Value) -> Result<T> {
    match serde_json::from_value(value.clone()) {
        Ok(bound) => Ok(bound),
        Err(first) => serde_json::from_value(tree::coerce_scalars(value))
            .map_err(|_| ConfigError::DeserializationError(first.to_string())),
    }
}

/// Main configuration manager
#[derive(Clone)]
pub struct ConfigManager {
    config: Arc<RwLock<Map<String, Value>>>,
    env_prefix: Option<String>,
}

impl ConfigManager {
    /// Create a new configuration manager
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(Map::new())),
            env_prefix: None,
        }
    }

    /// Create with environment variable prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            config: Arc::new(RwLock::new(Map::new())),
            env_prefix: Some(prefix.into()),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Map<String, Value>> {
        self.config.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Map<String, Value>> {
        self.config.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load configuration from environment variables.
    ///
    /// `__` in a variable name separates sections.
    pub fn load_env(&self) -> Result<()> {
        let loader = EnvLoader::new(self.env_prefix.clone());
        let env_vars = loader.load()?;

        let mut config = self.write();
        for (key, value) in &env_vars {
            tree::set_path(&mut config, &env::section_path(key), Value::String(value.clone()));
        }

        debug!(count = env_vars.len(), prefix = ?self.env_prefix, "Loaded environment configuration");
        Ok(())
    }

    /// Load configuration from .env file
    pub fn load_dotenv(&self, path: Option<&str>) -> Result<()> {
        if let Some(path) = path {
            dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
        } else {
            dotenvy::dotenv().ok();
        }
        self.load_env()
    }

    /// Load configuration from file, merging it over existing values
    pub fn load_file(&self, path: impl AsRef<Path>, format: FileFormat) -> Result<()> {
        let path = path.as_ref();
        let data = ConfigLoader::new(format).load_file(path)?;
        self.merge_value(&data);

        debug!(path = %path.display(), format = ?format, "Loaded configuration file");
        Ok(())
    }

    /// Load configuration from file, detecting the format from its extension
    pub fn load_file_auto(&self, path: impl AsRef<Path>) -> Result<()> {
        let format = ConfigLoader::auto(path.as_ref())?.format();
        self.load_file(path, format)
    }

    /// Load configuration from an in-memory document
    pub fn load_str(&self, content: &str, format: FileFormat) -> Result<()> {
        let data = ConfigLoader::new(format).parse(content)?;
        self.merge_value(&data);
        Ok(())
    }

    fn merge_value(&self, data: &Value) {
        if let Value::Object(map) = data {
            tree::merge(&mut self.write(), map);
        }
    }

    /// Set a configuration value at a `:`-separated path
    pub fn set<T: serde::Serialize>(&self, key: &str, value: T) -> Result<()> {
        let json_value = serde_json::to_value(value)
            .map_err(|e| ConfigError::SerializationError(e.to_string()))?;

        tree::set_path(&mut self.write(), &split_key(key), json_value);
        Ok(())
    }

    /// Get a configuration value at a `:`-separated path
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let config = self.read();

        let value = tree::get_path(&config, &split_key(key))
            .ok_or_else(|| ConfigError::KeyNotFound(key.to_string()))?;

        deserialize_lenient(value)
    }

    /// Get a configuration value with default
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Get a string value
    pub fn get_string(&self, key: &str) -> Result<String> {
        self.get(key)
    }

    /// Get an integer value
    pub fn get_int(&self, key: &str) -> Result<i64> {
        self.get(key)
    }

    /// Get a boolean value
    pub fn get_bool(&self, key: &str) -> Result<bool> {
        self.get(key)
    }

    /// Get a float value
    pub fn get_float(&self, key: &str) -> Result<f64> {
        self.get(key)
    }

    /// Check if a key exists
    pub fn has(&self, key: &str) -> bool {
        tree::get_path(&self.read(), &split_key(key)).is_some()
    }

    /// Get all top-level keys
    pub fn keys(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Raw value of a section, if present
    pub fn section(&self, name: &str) -> Option<Value> {
        tree::get_path(&self.read(), &split_key(name)).cloned()
    }

    /// Bind a section to a typed record.
    ///
    /// Returns `Ok(None)` when the section is absent, null or has no entries.
    /// Keys inside the section are matched ignoring case and `_`/`-`, so the
    /// record's fields should be named in that normalized form (see
    /// [`tree::normalize_key`]). String values are accepted for booleans and
    /// numbers.
    pub fn bind_section<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let Some(section) = self.section(name) else {
            debug!(section = name, "Configuration section not present");
            return Ok(None);
        };

        match &section {
            Value::Null => Ok(None),
            Value::Object(entries) if entries.is_empty() => Ok(None),
            Value::Object(_) => deserialize_lenient(&tree::normalized(&section)).map(Some),
            _ => Err(ConfigError::InvalidSection(name.to_string())),
        }
    }

    /// Bind the whole configuration tree to a typed record
    pub fn bind<T: DeserializeOwned>(&self) -> Result<T> {
        let root = Value::Object(self.read().clone());
        deserialize_lenient(&tree::normalized(&root))
    }

    /// Merge configuration from another manager; its values win
    pub fn merge(&self, other: &ConfigManager) -> Result<()> {
        if Arc::ptr_eq(&self.config, &other.config) {
            return Ok(());
        }
        let other_config = other.read().clone();
        tree::merge(&mut self.write(), &other_config);
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for ConfigManager {}
