//! Configuration for reading definition documents
//!
//! `DefinitionConfig` controls how lenient the definition reader is. It can
//! be built in code or loaded from TOML:
//!
//! ```toml
//! allow_comments = true
//! strict_keys = false
//! auto_increment_seed = 1
//! ```

pub mod error;

pub use error::{ConfigError, ConfigResult};

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_AUTO_INCREMENT_SEED;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefinitionConfig {
    /// Strip `//` and `/* */` comments outside strings before parsing
    pub allow_comments: bool,
    /// Reject unknown schema and field keys instead of skipping them
    pub strict_keys: bool,
    /// Seed for auto-increment fields that do not declare one
    pub auto_increment_seed: i64,
}

impl Default for DefinitionConfig {
    fn default() -> Self {
        Self {
            allow_comments: true,
            strict_keys: false,
            auto_increment_seed: DEFAULT_AUTO_INCREMENT_SEED,
        }
    }
}

impl DefinitionConfig {
    /// Parse and validate a configuration from TOML text
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn strict() -> Self {
        Self {
            strict_keys: true,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.auto_increment_seed < 0 {
            return Err(ConfigError::validation(format!(
                "auto_increment_seed must not be negative, got {}",
                self.auto_increment_seed
            )));
        }
        Ok(())
    }
}
