use crate::domain::AdhocConfig;
use crate::ports::ConfigProvider;

// ============================================================================
// StaticConfigProvider - Hardcoded config for testing/development
// ============================================================================

/// Static configuration provider with hardcoded values.
///
/// Useful for testing and development. For production, use `TomlConfigProvider`.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigProvider {
    config: AdhocConfig,
}

impl StaticConfigProvider {
    /// Create with default config.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: AdhocConfig::default(),
        }
    }

    /// Create with the specified config.
    #[must_use]
    pub fn with_config(config: AdhocConfig) -> Self {
        Self { config }
    }
}

impl ConfigProvider for StaticConfigProvider {
    fn adhoc_config(&self) -> AdhocConfig {
        self.config.clone()
    }
}

// ============================================================================
// TomlConfigProvider - Production config loading (requires "config" feature)
// ============================================================================

#[cfg(feature = "config")]
mod toml_config {
    use super::*;
    use serde::Deserialize;
    use std::fs;
    use std::path::Path;
    use thiserror::Error;

    /// Configuration file structure.
    #[derive(Debug, Deserialize, Default)]
    struct ConfigFile {
        #[serde(default)]
        adhoc: AdhocConfigFile,
    }

    #[derive(Debug, Deserialize, Default)]
    struct AdhocConfigFile {
        max_sockets: Option<usize>,
        max_port_attempts: Option<u32>,
    }

    /// Errors from configuration loading.
    #[derive(Debug, Error)]
    pub enum ConfigError {
        /// Could not read the file.
        #[error("failed to read config file: {0}")]
        Io(#[from] std::io::Error),
        /// Could not parse the TOML contents.
        #[error("failed to parse config file: {0}")]
        Parse(#[from] toml::de::Error),
    }

    /// TOML-based configuration provider.
    ///
    /// # Config File Format
    ///
    /// ```toml
    /// [adhoc]
    /// max_sockets = 256
    /// max_port_attempts = 65535
    /// ```
    ///
    /// Missing keys fall back to [`AdhocConfig::default`].
    #[derive(Debug, Clone)]
    pub struct TomlConfigProvider {
        config: AdhocConfig,
    }

    impl TomlConfigProvider {
        /// Load configuration from a TOML file.
        pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
            let contents = fs::read_to_string(path)?;
            Self::parse(&contents)
        }

        /// Parse configuration from TOML text.
        pub fn parse(contents: &str) -> Result<Self, ConfigError> {
            let file: ConfigFile = toml::from_str(contents)?;
            let defaults = AdhocConfig::default();
            Ok(Self {
                config: AdhocConfig {
                    max_sockets: file.adhoc.max_sockets.unwrap_or(defaults.max_sockets),
                    max_port_attempts: file
                        .adhoc
                        .max_port_attempts
                        .unwrap_or(defaults.max_port_attempts),
                },
            })
        }
    }

    impl ConfigProvider for TomlConfigProvider {
        fn adhoc_config(&self) -> AdhocConfig {
            self.config.clone()
        }
    }

}

#[cfg(feature = "config")]
pub use toml_config::{ConfigError, TomlConfigProvider};
