// The `Swagger` configuration section

use serde::Deserialize;
use verdoc_config::{ConfigError, ConfigManager};

/// Feature flags read from the `Swagger` section.
///
/// Both flags default to on: only an explicit `false` turns a feature off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct SwaggerConfigurationSection {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default, rename = "authorizationenabled")]
    pub authorization_enabled: Option<bool>,
}

impl SwaggerConfigurationSection {
    pub const SECTION_NAME: &'static str = "Swagger";

    /// Bind the section; `None` when the configuration has no such section
    pub fn bind(config: &ConfigManager) -> Result<Option<Self>, ConfigError> {
        config.bind_section(Self::SECTION_NAME)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled != Some(false)
    }

    pub fn is_authorization_enabled(&self) -> bool {
        self.authorization_enabled != Some(false)
    }
}
