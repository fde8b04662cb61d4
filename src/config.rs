//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::storage::Resolution;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Availability store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Storage resolution for entities created without an explicit one
    #[serde(default = "default_resolution")]
    pub default_resolution: String,

    /// Create unknown entities on first write
    #[serde(default = "default_auto_create")]
    pub auto_create: bool,

    /// Restore the collection on startup and write it back on shutdown
    #[serde(default)]
    pub persist: bool,

    pub snapshot_path: Option<String>,
}

fn default_resolution() -> String {
    Resolution::default().label()
}

fn default_auto_create() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            default_resolution: default_resolution(),
            auto_create: default_auto_create(),
            persist: false,
            snapshot_path: None,
        }
    }
}

impl StoreConfig {
    /// Parsed default resolution; unknown labels fall back to 5 minutes
    pub fn resolution(&self) -> Resolution {
        let parsed = Resolution::parse(&self.default_resolution);
        if parsed.is_defined() {
            parsed
        } else {
            tracing::warn!(
                label = %self.default_resolution,
                "Unknown default resolution, using {}",
                Resolution::default()
            );
            Resolution::default()
        }
    }

    /// Snapshot location, falling back to the local data directory
    pub fn snapshot_path(&self) -> PathBuf {
        match &self.snapshot_path {
            Some(path) => PathBuf::from(path),
            None => dirs::data_local_dir()
                .map(|p| p.join("availability"))
                .unwrap_or_else(|| PathBuf::from("./availability_data"))
                .join("snapshot.json"),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Largest window a single range request may cover, counted in units
    /// of the finer of the requested and storage resolutions
    #[serde(default = "default_max_units")]
    pub max_units: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8083
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_units() -> u64 {
    1_000_000
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            request_timeout_secs: default_request_timeout(),
            max_units: default_max_units(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("availability").join("config.toml")),
            Some(PathBuf::from("/etc/availability/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Store overrides
        if let Some(resolution) = var("AVAILABILITY_DEFAULT_RESOLUTION") {
            self.store.default_resolution = resolution;
        }
        if let Some(flag) = var("AVAILABILITY_AUTO_CREATE").and_then(|v| parse_flag(&v)) {
            self.store.auto_create = flag;
        }
        if let Some(flag) = var("AVAILABILITY_PERSIST").and_then(|v| parse_flag(&v)) {
            self.store.persist = flag;
        }
        if let Some(path) = var("AVAILABILITY_SNAPSHOT_PATH") {
            self.store.snapshot_path = Some(path);
        }

        // API overrides
        if let Some(host) = var("AVAILABILITY_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = var("AVAILABILITY_API_PORT").and_then(|p| p.parse().ok()) {
            self.api.port = port;
        }
        if let Some(max) = var("AVAILABILITY_API_MAX_UNITS").and_then(|m| m.parse().ok()) {
            self.api.max_units = max;
        }

        // Logging overrides
        if let Some(level) = var("AVAILABILITY_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("AVAILABILITY_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Availability Store Configuration
#
# Environment variables override these settings:
# - AVAILABILITY_DEFAULT_RESOLUTION
# - AVAILABILITY_AUTO_CREATE
# - AVAILABILITY_PERSIST
# - AVAILABILITY_SNAPSHOT_PATH
# - AVAILABILITY_API_HOST
# - AVAILABILITY_API_PORT
# - AVAILABILITY_API_MAX_UNITS
# - AVAILABILITY_LOG_LEVEL
# - AVAILABILITY_LOG_FORMAT

[store]
# Storage resolution for new entities: sec, min, 5min, 15min, hour, day or <n>s
default_resolution = "5min"

# Create unknown entities on first write
auto_create = true

# Restore the collection on startup and save it on shutdown
persist = false

# Snapshot file (defaults to ~/.local/share/availability/snapshot.json)
# snapshot_path = "/var/lib/availability/snapshot.json"

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8083

# Allowed CORS origins (empty allows any)
cors_origins = []

# Request timeout in seconds
request_timeout_secs = 30

# Largest range request, in units of the finer resolution involved
max_units = 1000000

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
