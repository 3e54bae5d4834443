// Environment variable loading

use crate::{ConfigError, Result};
use std::collections::HashMap;
use std::env;

/// Separator standing in for the section delimiter in variable names
/// (`SWAGGER__ENABLED` is `Enabled` inside the `Swagger` section).
pub const ENV_SECTION_SEPARATOR: &str = "__";

/// Environment variable loader
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    /// Create a new environment loader
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    /// Load environment variables, stripping the prefix when one is set.
    ///
    /// Names keep their original case; lookups downstream ignore case.
    pub fn load(&self) -> Result<HashMap<String, String>> {
        Ok(self.filter(env::vars()))
    }

    fn filter(&self, vars: impl Iterator<Item = (String, String)>) -> HashMap<String, String> {
        vars.filter_map(|(key, value)| match self.prefix {
            Some(ref prefix) => {
                let rest = key.strip_prefix(prefix.as_str())?;
                let rest = rest.trim_start_matches('_');
                (!rest.is_empty()).then(|| (rest.to_string(), value))
            }
            None => Some((key, value)),
        })
        .collect()
    }

    /// Load a specific environment variable
    pub fn load_var(&self, key: &str) -> Result<String> {
        let full_key = if let Some(ref prefix) = self.prefix {
            format!("{}_{}", prefix, key.to_uppercase())
        } else {
            key.to_uppercase()
        };

        env::var(&full_key).map_err(ConfigError::EnvError)
    }

    /// Load with default value
    pub fn load_var_or(&self, key: &str, default: &str) -> String {
        self.load_var(key).unwrap_or_else(|_| default.to_string())
    }
}

/// Split a variable name into its section path.
pub fn section_path(name: &str) -> Vec<&str> {
    name.split(ENV_SECTION_SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .collect()
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(None)
    }
}
