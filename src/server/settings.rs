//! server::settings
//!
//! Server settings, built once at startup.
//!
//! # Precedence
//!
//! Defaults < config file `[server]` table < environment (`SECRET_KEY`) <
//! CLI flags. The result is immutable and shared through the router state.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::core::config::{Config, ConfigError};
use crate::core::secret::SecretKey;

/// Values given on the `adt server` command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerOverrides {
    pub port: Option<u16>,
    pub bind: Option<String>,
    /// `--debug` only ever turns debug on.
    pub debug: bool,
    pub timeout_secs: Option<u64>,
}

/// Effective server settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub addr: SocketAddr,
    pub debug: bool,
    pub scaffold_timeout: Duration,
    pub secret_key: SecretKey,
}

impl Settings {
    /// Resolve settings from config, environment and flags.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidValue` for an unparsable bind address, port 0
    /// or a zero timeout given on the command line.
    pub fn init(config: &Config, overrides: &ServerOverrides) -> Result<Self, ConfigError> {
        Self::init_with_secret(config, overrides, SecretKey::from_env())
    }

    /// Like [`Settings::init`] with an explicit secret key.
    pub fn init_with_secret(
        config: &Config,
        overrides: &ServerOverrides,
        secret_key: SecretKey,
    ) -> Result<Self, ConfigError> {
        let port = overrides.port.unwrap_or_else(|| config.port());
        if port == 0 {
            return Err(ConfigError::InvalidValue(
                "port must be between 1 and 65535".to_string(),
            ));
        }

        let bind = overrides.bind.as_deref().unwrap_or_else(|| config.bind());
        let ip: IpAddr = bind.parse().map_err(|_| {
            ConfigError::InvalidValue(format!("bind address '{}' is not an IP address", bind))
        })?;

        let scaffold_timeout = match overrides.timeout_secs {
            Some(0) => {
                return Err(ConfigError::InvalidValue(
                    "timeout must be greater than zero".to_string(),
                ))
            }
            Some(secs) => Duration::from_secs(secs),
            None => config.scaffold_timeout(),
        };

        Ok(Self {
            addr: SocketAddr::new(ip, port),
            debug: overrides.debug || config.debug(),
            scaffold_timeout,
            secret_key,
        })
    }

    /// Settings for an ephemeral local server.
    pub fn local(scaffold_timeout: Duration) -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            debug: false,
            scaffold_timeout,
            secret_key: SecretKey::generate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{ConfigFile, ServerConfig};

    fn config_with(server: ServerConfig) -> Config {
        let mut config = Config::default();
        config.file = ConfigFile {
            server: Some(server),
        };
        config
    }

    #[test]
    fn defaults() {
        let settings = Settings::init_with_secret(
            &Config::default(),
            &ServerOverrides::default(),
            SecretKey::generate(),
        )
        .unwrap();

        assert_eq!(settings.addr, "0.0.0.0:8000".parse().unwrap());
        assert!(!settings.debug);
        assert_eq!(settings.scaffold_timeout, Duration::from_secs(300));
    }

    #[test]
    fn flags_override_config() {
        let config = config_with(ServerConfig {
            port: Some(9000),
            bind: Some("127.0.0.1".to_string()),
            debug: Some(false),
            scaffold_timeout_secs: Some(60),
        });
        let overrides = ServerOverrides {
            port: Some(9100),
            bind: None,
            debug: true,
            timeout_secs: Some(5),
        };

        let settings =
            Settings::init_with_secret(&config, &overrides, SecretKey::generate()).unwrap();
        assert_eq!(settings.addr, "127.0.0.1:9100".parse().unwrap());
        assert!(settings.debug);
        assert_eq!(settings.scaffold_timeout, Duration::from_secs(5));
    }

    #[test]
    fn config_debug_is_honored_without_flag() {
        let config = config_with(ServerConfig {
            debug: Some(true),
            ..Default::default()
        });
        let settings =
            Settings::init_with_secret(&config, &ServerOverrides::default(), SecretKey::generate())
                .unwrap();
        assert!(settings.debug);
    }

    #[test]
    fn bad_flags_rejected() {
        let bad_bind = ServerOverrides {
            bind: Some("not-an-ip".to_string()),
            ..Default::default()
        };
        assert!(Settings::init_with_secret(&Config::default(), &bad_bind, SecretKey::generate())
            .is_err());

        let zero_timeout = ServerOverrides {
            timeout_secs: Some(0),
            ..Default::default()
        };
        assert!(
            Settings::init_with_secret(&Config::default(), &zero_timeout, SecretKey::generate())
                .is_err()
        );

        let zero_port = ServerOverrides {
            port: Some(0),
            ..Default::default()
        };
        assert!(
            Settings::init_with_secret(&Config::default(), &zero_port, SecretKey::generate())
                .is_err()
        );
    }
}
