//! Integration tests for configuration loading and saving.

use healthlog::storage::config::{
    load_config_from, save_config_to, ENV_CLIENT_ID, ENV_CLIENT_SECRET,
};
use healthlog::storage::AppConfig;
use std::path::PathBuf;

#[test]
fn test_missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config_from(&dir.path().join("absent.toml")).unwrap();

    assert_eq!(config.sync.per_page, 30);
    assert_eq!(config.sync.refresh_margin_secs, 300);
    assert_eq!(config.incidents.default_limit, 50);
    assert!(config.strava.client_credentials().is_none());
}

#[test]
fn test_save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = AppConfig::default();
    config.database_path = Some(PathBuf::from("/tmp/health.db"));
    config.strava.client_id = Some("12345".to_string());
    config.sync.per_page = 100;
    save_config_to(&config, &path).unwrap();

    let loaded = load_config_from(&path).unwrap();
    assert_eq!(loaded.database_path(), PathBuf::from("/tmp/health.db"));
    assert_eq!(loaded.strava.client_id.as_deref(), Some("12345"));
    assert_eq!(loaded.sync.per_page, 100);
    assert_eq!(loaded.incidents.default_limit, 50);
}

#[test]
fn test_partial_file_fills_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[sync]\nper_page = 50\n").unwrap();

    let config = load_config_from(&path).unwrap();
    assert_eq!(config.sync.per_page, 50);
    assert_eq!(config.sync.refresh_margin_secs, 300);
}

#[test]
fn test_invalid_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "sync = [not toml").unwrap();

    assert!(load_config_from(&path).is_err());
}

#[test]
fn test_environment_overrides_file() {
    let mut config = AppConfig::default();
    config.strava.client_id = Some("from-file".to_string());
    config.strava.client_secret = Some("secret".to_string());

    config.apply_env(|key| (key == ENV_CLIENT_ID).then(|| "from-env".to_string()));

    assert_eq!(config.strava.client_credentials(), Some(("from-env", "secret")));
}

#[test]
fn test_saving_after_environment_override_keeps_file_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let mut config = AppConfig::default();
    config.strava.client_id = Some("from-file".to_string());
    save_config_to(&config, &path).unwrap();

    let mut loaded = load_config_from(&path).unwrap();
    loaded.apply_env(|key| match key {
        ENV_CLIENT_ID => Some("from-env".to_string()),
        ENV_CLIENT_SECRET => Some("env-secret".to_string()),
        _ => None,
    });
    save_config_to(&loaded, &path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(!text.contains("env-secret"));
    assert!(!text.contains("from-env"));
    let reloaded = load_config_from(&path).unwrap();
    assert_eq!(reloaded.strava.client_id.as_deref(), Some("from-file"));
    assert!(reloaded.strava.client_secret.is_none());
}

#[test]
fn test_default_database_under_data_dir() {
    let mut config = AppConfig::default();
    config.data_dir = PathBuf::from("/data/healthlog");

    assert_eq!(config.database_path(), PathBuf::from("/data/healthlog/healthlog.db"));
}
