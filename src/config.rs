//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::auth::{DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_TTL_SECS};
use crate::store::StorageBackend;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Application identity
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Namespace for all documents (`artifacts/{app_id}/...`)
    #[serde(default = "default_app_id")]
    pub app_id: String,
}

fn default_app_id() -> String {
    "default-app-id".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_id: default_app_id(),
        }
    }
}

/// Sign-in configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Token used by the CLI when none is given on the command line
    #[serde(default)]
    pub initial_auth_token: Option<String>,

    #[serde(default = "default_allow_anonymous")]
    pub allow_anonymous: bool,

    /// Custom token → user id
    #[serde(default)]
    pub custom_tokens: HashMap<String, String>,
}

fn default_allow_anonymous() -> bool {
    true
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            initial_auth_token: None,
            allow_anonymous: default_allow_anonymous(),
            custom_tokens: HashMap::new(),
        }
    }
}

/// Document store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("goalboard").to_string_lossy().to_string())
        .unwrap_or_else(|| "./goalboard_data".to_string())
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            data_dir: default_data_dir(),
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

    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    /// Seconds a session stays valid after sign-in
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,

    /// Live sessions kept at most; the oldest is evicted beyond this
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_max_connections() -> usize {
    1000
}

fn default_session_ttl_secs() -> u64 {
    DEFAULT_SESSION_TTL_SECS
}

fn default_max_sessions() -> usize {
    DEFAULT_MAX_SESSIONS
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_connections: default_max_connections(),
            session_ttl_secs: default_session_ttl_secs(),
            max_sessions: default_max_sessions(),
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty` or `json`
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
            dirs::config_dir().map(|p| p.join("goalboard").join("config.toml")),
            Some(PathBuf::from("/etc/goalboard/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
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

    fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // App
        if let Some(app_id) = var("GOALBOARD_APP_ID") {
            self.app.app_id = app_id;
        }

        // Auth
        if let Some(token) = var("GOALBOARD_AUTH_TOKEN") {
            self.auth.initial_auth_token = Some(token);
        }
        if let Some(allow) = var("GOALBOARD_ALLOW_ANONYMOUS") {
            self.auth.allow_anonymous = allow.to_lowercase() != "false" && allow != "0";
        }

        // Storage
        if let Some(backend) = var("GOALBOARD_STORAGE_BACKEND") {
            match backend.parse() {
                Ok(b) => self.storage.backend = b,
                Err(e) => tracing::warn!("Ignoring GOALBOARD_STORAGE_BACKEND: {}", e),
            }
        }
        if let Some(data_dir) = var("GOALBOARD_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }

        // API
        if let Some(host) = var("GOALBOARD_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = var("GOALBOARD_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }
        if let Some(ttl) = var("GOALBOARD_SESSION_TTL_SECS") {
            if let Ok(t) = ttl.parse() {
                self.api.session_ttl_secs = t;
            }
        }
        if let Some(max) = var("GOALBOARD_MAX_SESSIONS") {
            if let Ok(m) = max.parse() {
                self.api.max_sessions = m;
            }
        }

        // Logging
        if let Some(level) = var("GOALBOARD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("GOALBOARD_LOG_FORMAT") {
            self.logging.format = format;
        }
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
    r#"# Goalboard Configuration
#
# Environment variables override these settings:
# - GOALBOARD_APP_ID
# - GOALBOARD_AUTH_TOKEN
# - GOALBOARD_ALLOW_ANONYMOUS
# - GOALBOARD_STORAGE_BACKEND
# - GOALBOARD_DATA_DIR
# - GOALBOARD_API_HOST
# - GOALBOARD_API_PORT
# - GOALBOARD_SESSION_TTL_SECS
# - GOALBOARD_MAX_SESSIONS
# - GOALBOARD_LOG_LEVEL
# - GOALBOARD_LOG_FORMAT

[app]
# Namespace for all progress documents
app_id = "default-app-id"

[auth]
# Token the CLI signs in with (omit for anonymous sign-in)
# initial_auth_token = "dev-token"

# Allow anonymous sign-in
allow_anonymous = true

# Custom tokens and the user ids they sign in as
[auth.custom_tokens]
# "dev-token" = "dev-user"

[storage]
# Document store backend: sqlite or memory
backend = "sqlite"

# Directory for the SQLite database
data_dir = "./goalboard_data"

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8090

# Maximum concurrent WebSocket connections
max_connections = 1000

# Seconds a sign-in session stays valid
session_ttl_secs = 86400

# Maximum live sessions; the oldest is evicted beyond this
max_sessions = 10000

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.app.app_id, "default-app-id");
        assert!(config.auth.allow_anonymous);
        assert!(config.auth.initial_auth_token.is_none());
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.api.addr(), "0.0.0.0:8090");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.app.app_id, "default-app-id");
        assert_eq!(config.api.port, 8090);
        assert_eq!(config.api.session_ttl_secs, 86_400);
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert!(config.auth.custom_tokens.is_empty());
    }

    #[test]
    fn test_partial_file() {
        let config = Config::parse(
            r#"
            [auth.custom_tokens]
            "tok-1" = "alice"

            [storage]
            backend = "memory"
            "#,
        )
        .unwrap();

        assert_eq!(config.auth.custom_tokens.get("tok-1").map(String::as_str), Some("alice"));
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.app.app_id, "default-app-id");
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            "GOALBOARD_APP_ID" => Some("my-app".to_string()),
            "GOALBOARD_AUTH_TOKEN" => Some("tok".to_string()),
            "GOALBOARD_ALLOW_ANONYMOUS" => Some("false".to_string()),
            "GOALBOARD_STORAGE_BACKEND" => Some("memory".to_string()),
            "GOALBOARD_API_PORT" => Some("not-a-port".to_string()),
            "GOALBOARD_SESSION_TTL_SECS" => Some("600".to_string()),
            _ => None,
        });

        assert_eq!(config.app.app_id, "my-app");
        assert_eq!(config.auth.initial_auth_token.as_deref(), Some("tok"));
        assert!(!config.auth.allow_anonymous);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.api.port, 8090);
        assert_eq!(config.api.session_ttl_secs, 600);
        assert_eq!(config.api.max_sessions, 10_000);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/goalboard.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
