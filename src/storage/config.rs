//! Application configuration.
//!
//! Stored as TOML in the platform data directory. Strava client credentials
//! may also come from `STRAVA_CLIENT_ID` and `STRAVA_CLIENT_SECRET`, which
//! take precedence over the file. Environment values are held outside the
//! serialized fields and never written back to the file.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Placeholder shown instead of a configured secret.
pub const REDACTED: &str = "********";

/// Environment variable overriding `strava.client_id`.
pub const ENV_CLIENT_ID: &str = "STRAVA_CLIENT_ID";
/// Environment variable overriding `strava.client_secret`.
pub const ENV_CLIENT_SECRET: &str = "STRAVA_CLIENT_SECRET";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application version
    pub version: String,
    /// Data directory path
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// SQLite database file; `<data_dir>/healthlog.db` when unset
    pub database_path: Option<PathBuf>,
    pub strava: StravaSettings,
    pub sync: SyncSettings,
    pub incidents: IncidentSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            data_dir: PathBuf::new(),
            database_path: None,
            strava: StravaSettings::default(),
            sync: SyncSettings::default(),
            incidents: IncidentSettings::default(),
        }
    }
}

impl AppConfig {
    /// Resolved database location.
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join("healthlog.db"))
    }

    /// Apply environment overrides from `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(id) = lookup(ENV_CLIENT_ID).filter(|v| !v.is_empty()) {
            self.strava.env_client_id = Some(id);
        }
        if let Some(secret) = lookup(ENV_CLIENT_SECRET).filter(|v| !v.is_empty()) {
            self.strava.env_client_secret = Some(secret);
        }
    }

    /// Copy safe to display, with the client secret masked.
    pub fn redacted(&self) -> AppConfig {
        let mut config = self.clone();
        if config.strava.client_secret.is_some() {
            config.strava.client_secret = Some(REDACTED.to_string());
        }
        config.strava.env_client_secret = config
            .strava
            .env_client_secret
            .as_ref()
            .map(|_| REDACTED.to_string());
        config
    }
}

/// Strava API application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StravaSettings {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// OAuth redirect registered with the Strava application
    pub redirect_uri: String,
    #[serde(skip)]
    pub env_client_id: Option<String>,
    #[serde(skip)]
    pub env_client_secret: Option<String>,
}

impl Default for StravaSettings {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: "http://localhost:8888/strava/callback".to_string(),
            env_client_id: None,
            env_client_secret: None,
        }
    }
}

impl StravaSettings {
    /// Client ID and secret, when both are set. Environment values win.
    pub fn client_credentials(&self) -> Option<(&str, &str)> {
        let id = self.env_client_id.as_ref().or(self.client_id.as_ref())?;
        let secret = self
            .env_client_secret
            .as_ref()
            .or(self.client_secret.as_ref())?;
        Some((id.as_str(), secret.as_str()))
    }

    /// Whether either credential comes from the environment.
    pub fn has_env_overrides(&self) -> bool {
        self.env_client_id.is_some() || self.env_client_secret.is_some()
    }
}

/// Activity sync settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Activities fetched per page (Strava caps this at 200)
    pub per_page: u32,
    /// Refresh the access token this many seconds before it expires
    pub refresh_margin_secs: i64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            per_page: 30,
            refresh_margin_secs: 300,
        }
    }
}

/// Incident listing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IncidentSettings {
    pub default_limit: usize,
}

impl Default for IncidentSettings {
    fn default() -> Self {
        Self { default_limit: 50 }
    }
}

/// Get the application data directory.
pub fn get_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "providenceit", "HealthLog")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the configuration file path.
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

/// Load application configuration from file, with environment overrides.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let mut config = load_config_from(&get_config_path())?;
    config.data_dir = get_data_dir();
    config.apply_env(|key| std::env::var(key).ok());
    Ok(config)
}

/// Load configuration from `path`, returning defaults when it does not exist.
pub fn load_config_from(path: &PathBuf) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Save application configuration to file.
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    save_config_to(config, &get_config_path())
}

/// Save configuration to `path`, creating parent directories.
pub fn save_config_to(config: &AppConfig, path: &PathBuf) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
