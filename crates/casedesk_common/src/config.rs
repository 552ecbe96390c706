//! Configuration management for casedesk.
//!
//! Loads settings from a TOML file or uses defaults. Lookup order: explicit
//! path, `$CASEDESK_CONFIG`, `/etc/casedesk/config.toml`.

use crate::error::ConfigError;
use crate::pipeline::TransformOptions;
use crate::ranker::{RECENT_OPEN_LIMIT, TOP_VENDOR_LIMIT};
use crate::record::FieldMap;
use crate::table::TableDialect;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Config file path
pub const CONFIG_PATH: &str = "/etc/casedesk/config.toml";

/// Environment variable overriding the config path
pub const CONFIG_ENV: &str = "CASEDESK_CONFIG";

/// Source table configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// CSV export URL of the sheet
    #[serde(default = "default_source_url")]
    pub url: String,

    /// `delimiter` and `header_row`, stored inline in `[source]`
    #[serde(flatten)]
    pub dialect: TableDialect,

    /// Seconds between refresh cycles
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// HTTP timeout for one fetch
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

fn default_source_url() -> String {
    String::new()
}

fn default_refresh_interval() -> u64 {
    300 // 5 minutes
}

fn default_fetch_timeout() -> u64 {
    30
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_source_url(),
            dialect: TableDialect::default(),
            refresh_interval_secs: default_refresh_interval(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

impl SourceConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// Dashboard list sizes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_recent_open_limit")]
    pub recent_open_limit: usize,

    #[serde(default = "default_top_vendor_limit")]
    pub top_vendor_limit: usize,
}

fn default_recent_open_limit() -> usize {
    RECENT_OPEN_LIMIT
}

fn default_top_vendor_limit() -> usize {
    TOP_VENDOR_LIMIT
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            recent_open_limit: default_recent_open_limit(),
            top_vendor_limit: default_top_vendor_limit(),
        }
    }
}

/// HTTP surface of the daemon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    // Localhost only unless configured otherwise
    "127.0.0.1:7870".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Fallback filter when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CasedeskConfig {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub columns: FieldMap,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CasedeskConfig {
    /// Parse configuration from TOML text and validate it.
    pub fn from_toml(text: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: CasedeskConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text, &path.display().to_string())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.refresh_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "source.refresh_interval_secs must be greater than 0".to_string(),
            ));
        }
        let delimiter = self.source.dialect.delimiter;
        if delimiter == '"' || delimiter == '\n' {
            return Err(ConfigError::Invalid(format!(
                "source.delimiter {:?} cannot be used",
                delimiter
            )));
        }
        for field in crate::record::LogicalField::ALL {
            if self.columns.candidates(field).is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "columns.{} needs at least one column name",
                    field.as_str()
                )));
            }
        }
        Ok(())
    }

    pub fn transform_options(&self) -> TransformOptions {
        TransformOptions {
            fields: self.columns.clone(),
            recent_open_limit: self.display.recent_open_limit,
            top_vendor_limit: self.display.top_vendor_limit,
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

/// Resolve the config path: explicit, then environment, then the system path.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    PathBuf::from(CONFIG_PATH)
}

/// Load configuration, falling back to defaults when no file exists.
///
/// An explicitly given path must exist; the implicit locations may be absent.
pub fn load_config(explicit: Option<&Path>) -> Result<CasedeskConfig, ConfigError> {
    let path = config_path(explicit);
    if path.exists() {
        let config = CasedeskConfig::load_from(&path)?;
        info!("Config loaded from {}", path.display());
        Ok(config)
    } else if explicit.is_some() {
        Err(ConfigError::Io {
            path: path.display().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "config file not found"),
        })
    } else {
        warn!("No config at {}, using defaults", path.display());
        Ok(CasedeskConfig::default())
    }
}
