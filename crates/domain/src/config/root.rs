use serde::{Deserialize, Serialize};

use super::backend::BackendConfig;
use super::cache::CacheConfig;
use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::server::{ServerConfig, STANDARD_UDP_PAYLOAD};

const LOCAL_CONFIG_PATH: &str = "jsondns.toml";
const SYSTEM_CONFIG_PATH: &str = "/etc/jsondns/config.toml";

/// Main configuration structure for the gateway daemon
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Listener configuration (bind address, port, payload limit)
    #[serde(default)]
    pub server: ServerConfig,

    /// JSON answering service
    #[serde(default)]
    pub backend: BackendConfig,

    /// Reply cache
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. jsondns.toml in current directory
    /// 3. /etc/jsondns/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if let Some(found) = Self::get_config_path() {
            Self::from_file(&found)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(port) = overrides.dns_port {
            self.server.dns_port = port;
        }
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(host) = overrides.backend_host {
            self.backend.host = host;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(file) = overrides.log_file {
            self.logging.file = Some(file);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.dns_port == 0 {
            return Err(ConfigError::Validation("DNS port cannot be 0".to_string()));
        }

        if self.server.max_payload < STANDARD_UDP_PAYLOAD {
            return Err(ConfigError::Validation(format!(
                "max_payload must be at least {} bytes",
                STANDARD_UDP_PAYLOAD
            )));
        }

        if self.backend.host.trim().is_empty() {
            return Err(ConfigError::Validation(
                "No backend host configured".to_string(),
            ));
        }

        if self.cache.default_ttl == 0 {
            return Err(ConfigError::Validation(
                "cache.default_ttl must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Path of the configuration file `load` would pick without an explicit path
    pub fn get_config_path() -> Option<String> {
        if std::path::Path::new(LOCAL_CONFIG_PATH).exists() {
            Some(LOCAL_CONFIG_PATH.to_string())
        } else if std::path::Path::new(SYSTEM_CONFIG_PATH).exists() {
            Some(SYSTEM_CONFIG_PATH.to_string())
        } else {
            None
        }
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub dns_port: Option<u16>,
    pub bind_address: Option<String>,
    pub backend_host: Option<String>,
    pub log_level: Option<String>,
    pub log_file: Option<String>,
}
