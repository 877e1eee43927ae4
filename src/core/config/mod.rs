//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. Environment (`SECRET_KEY`, handled by the server settings)
//! 4. CLI flags (not handled here)
//!
//! # Config Locations
//!
//! Searched in order, first existing file wins:
//! 1. `$ADT_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/adt/config.toml`
//! 3. `~/.adt/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use adt::core::config::Config;
//!
//! let config = Config::load().unwrap();
//! println!("port: {}", config.port());
//! println!("timeout: {:?}", config.scaffold_timeout());
//! ```

pub mod schema;

pub use schema::{ConfigFile, ServerConfig};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Default `adt server` port.
pub const DEFAULT_PORT: u16 = 8000;

/// Default listen address.
pub const DEFAULT_BIND: &str = "0.0.0.0";

/// Default upper bound on one scaffold call.
pub const DEFAULT_SCAFFOLD_TIMEOUT: Duration = Duration::from_secs(300);

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Loaded configuration with defaults applied through accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub file: ConfigFile,
    /// Path the file was loaded from, if any
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed
    /// or validated. A missing config file is not an error.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_first(&Self::search_paths())
    }

    /// Candidate config paths in search order.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Ok(path) = std::env::var("ADT_CONFIG") {
            paths.push(PathBuf::from(path));
        }
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg_home).join("adt/config.toml"));
        }
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".adt/config.toml"));
        }
        paths
    }

    /// Load the first existing file among `candidates`, or defaults.
    pub fn load_first(candidates: &[PathBuf]) -> Result<Self, ConfigError> {
        match candidates.iter().find(|p| p.exists()) {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Load and validate a specific file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let file: ConfigFile = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        file.validate()?;
        Ok(Self {
            file,
            path: Some(path.to_path_buf()),
        })
    }

    /// The file this config came from.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn server(&self) -> Option<&ServerConfig> {
        self.file.server.as_ref()
    }

    pub fn port(&self) -> u16 {
        self.server().and_then(|s| s.port).unwrap_or(DEFAULT_PORT)
    }

    pub fn bind(&self) -> &str {
        self.server()
            .and_then(|s| s.bind.as_deref())
            .unwrap_or(DEFAULT_BIND)
    }

    pub fn debug(&self) -> bool {
        self.server().and_then(|s| s.debug).unwrap_or(false)
    }

    pub fn scaffold_timeout(&self) -> Duration {
        self.server()
            .and_then(|s| s.scaffold_timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_SCAFFOLD_TIMEOUT)
    }
}
