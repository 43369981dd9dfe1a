//! Application configuration loading and validation.
//!
//! Configuration is read from a TOML file. Every key has a default, so an
//! empty or missing file yields a usable [`Config`].
//!
//! ```toml
//! data_dir = "/home/me/.local/share/dbviewer"
//! page_size = 10
//! call_timeout_ms = 5000
//! busy_timeout_ms = 2000
//! bootstrap_sample = true
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//! ```

pub mod logging;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ConfigError, Result};
pub use logging::LoggingConfig;

const APP_DIR_NAME: &str = "dbviewer";

/// Main application configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Application data directory. Holds `sample.db`.
    pub data_dir: PathBuf,

    /// Default row limit for table data requests.
    pub page_size: i64,

    /// Upper bound on a single service call, in milliseconds.
    pub call_timeout_ms: u64,

    /// How long the engine waits on a locked database file, in milliseconds.
    pub busy_timeout_ms: u64,

    /// Provision the sample database at startup.
    pub bootstrap_sample: bool,

    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            page_size: 10,
            call_timeout_ms: 5_000,
            busy_timeout_ms: 2_000,
            bootstrap_sample: true,
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate configuration from a TOML string.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size < 0 {
            return Err(ConfigError::InvalidValue {
                field: "page_size",
                reason: format!("must be non-negative, got {}", self.page_size),
            }
            .into());
        }
        if self.call_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "call_timeout_ms",
                reason: "must be greater than zero".into(),
            }
            .into());
        }
        if self.busy_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "busy_timeout_ms",
                reason: "must be greater than zero".into(),
            }
            .into());
        }
        Ok(())
    }

    /// Location of the sample database inside the data directory.
    pub fn sample_path(&self) -> PathBuf {
        self.data_dir.join("sample.db")
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    pub fn init_logging(&self) {
        self.logging.init();
    }
}

/// Returns the platform data directory for the application.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(".").join(format!(".{APP_DIR_NAME}")))
}

/// Returns the default config file path inside the platform config directory.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(".").join(format!(".{APP_DIR_NAME}")))
        .join("config.toml")
}
