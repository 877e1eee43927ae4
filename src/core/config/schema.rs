//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Validation
//!
//! Config values are validated after parsing: the port must be non-zero,
//! the bind address must parse as an IP address and the scaffold timeout
//! must be positive.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Top-level config file.
///
/// # Example
///
/// ```toml
/// [server]
/// port = 8080
/// bind = "127.0.0.1"
/// debug = true
/// scaffold_timeout_secs = 120
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// `adt server` defaults
    pub server: Option<ServerConfig>,
}

impl ConfigFile {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(server) = &self.server {
            server.validate()?;
        }
        Ok(())
    }
}

/// `[server]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Listen port
    pub port: Option<u16>,

    /// Listen address
    pub bind: Option<String>,

    /// Debug logging and access log
    pub debug: Option<bool>,

    /// Upper bound on a single scaffold call
    pub scaffold_timeout_secs: Option<u64>,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == Some(0) {
            return Err(ConfigError::InvalidValue(
                "server.port must be between 1 and 65535".to_string(),
            ));
        }

        if let Some(bind) = &self.bind {
            if bind.parse::<IpAddr>().is_err() {
                return Err(ConfigError::InvalidValue(format!(
                    "server.bind '{}' is not an IP address",
                    bind
                )));
            }
        }

        if self.scaffold_timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "server.scaffold_timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
