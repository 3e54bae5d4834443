// ConfigService - layered configuration sources

use crate::{ConfigManager, FileFormat, Result};
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use verdoc_core::logging::{debug, warn};

/// Configuration assembled from layered sources.
#[derive(Clone)]
pub struct ConfigService {
    manager: ConfigManager,
}

impl ConfigService {
    /// Create from an existing manager
    pub fn from_manager(manager: ConfigManager) -> Self {
        Self { manager }
    }

    /// Builder for creating configured service
    pub fn builder() -> ConfigServiceBuilder {
        ConfigServiceBuilder::new()
    }

    /// Get configuration value
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        self.manager.get(key)
    }

    /// Get configuration value with default
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.manager.get_or(key, default)
    }

    /// Bind a section to a typed record
    pub fn bind_section<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        self.manager.bind_section(name)
    }

    /// Check if key exists
    pub fn has(&self, key: &str) -> bool {
        self.manager.has(key)
    }

    /// Get underlying manager
    pub fn manager(&self) -> &ConfigManager {
        &self.manager
    }

    pub fn into_manager(self) -> ConfigManager {
        self.manager
    }
}

enum Source {
    File {
        path: PathBuf,
        format: Option<FileFormat>,
        optional: bool,
    },
    Dotenv(Option<String>),
    Env,
}

/// Builder for ConfigService.
///
/// Sources are applied in the order they are added; later sources override
/// earlier ones key by key.
pub struct ConfigServiceBuilder {
    manager: ConfigManager,
    sources: Vec<Source>,
}

impl ConfigServiceBuilder {
    pub fn new() -> Self {
        Self {
            manager: ConfigManager::new(),
            sources: Vec::new(),
        }
    }

    /// Set environment variable prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.manager = ConfigManager::with_prefix(prefix);
        self
    }

    /// Add a configuration file with an explicit format
    pub fn add_file(mut self, path: impl Into<PathBuf>, format: FileFormat) -> Self {
        self.sources.push(Source::File {
            path: path.into(),
            format: Some(format),
            optional: false,
        });
        self
    }

    /// Add a configuration file that may be missing; format from extension
    pub fn add_optional_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(Source::File {
            path: path.into(),
            format: None,
            optional: true,
        });
        self
    }

    /// Load a .env file, then the environment
    pub fn load_dotenv(mut self, path: Option<String>) -> Self {
        self.sources.push(Source::Dotenv(path));
        self
    }

    /// Load environment variables
    pub fn load_env(mut self) -> Self {
        self.sources.push(Source::Env);
        self
    }

    /// Build the configuration service
    pub fn build(self) -> Result<ConfigService> {
        for source in self.sources {
            match source {
                Source::File {
                    path,
                    format,
                    optional,
                } => {
                    if optional && !path.exists() {
                        debug!(path = %path.display(), "Optional configuration file not found");
                        continue;
                    }
                    match format {
                        Some(format) => self.manager.load_file(&path, format)?,
                        None => self.manager.load_file_auto(&path)?,
                    }
                }
                Source::Dotenv(path) => {
                    if let Err(err) = self.manager.load_dotenv(path.as_deref()) {
                        warn!(error = %err, "Failed to load .env file");
                    }
                }
                Source::Env => self.manager.load_env()?,
            }
        }

        Ok(ConfigService::from_manager(self.manager))
    }
}

impl Default for ConfigServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
