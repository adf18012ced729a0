//! Configuration loader integration tests: file formats, probing failures,
//! and environment-variable loading.

use std::sync::Mutex;

use staffdesk_domain::StaffDeskError;
use staffdesk_infra::config::{load_from_env, load_from_file};
use tempfile::TempDir;

/// Serializes tests that touch process environment variables.
static ENV_LOCK: Mutex<()> = Mutex::new(());

const ENV_VARS: &[&str] = &[
    "STAFFDESK_API_BASE_URL",
    "STAFFDESK_API_TIMEOUT_SECS",
    "STAFFDESK_USER_AGENT",
    "STAFFDESK_KEYRING_SERVICE",
    "STAFFDESK_KEYRING_ACCOUNT",
];

fn clear_env() {
    for var in ENV_VARS {
        std::env::remove_var(var);
    }
}

#[test]
fn loads_json_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("staffdesk.json");
    std::fs::write(
        &path,
        r#"{
            "api": {
                "base_url": "https://ems.example.com/",
                "timeout_seconds": 10
            }
        }"#,
    )
    .unwrap();

    let config = load_from_file(Some(&path)).unwrap();
    assert_eq!(config.api.base_url, "https://ems.example.com");
    assert_eq!(config.api.timeout_seconds, 10);
    // Unspecified sections fall back to defaults
    assert_eq!(config.auth.keyring_account, "main");
}

#[test]
fn loads_toml_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("staffdesk.toml");
    std::fs::write(
        &path,
        r#"
            [api]
            base_url = "http://localhost:8000"

            [auth]
            keyring_service = "StaffDesk.dev"
            keyring_account = "dev"
        "#,
    )
    .unwrap();

    let config = load_from_file(Some(&path)).unwrap();
    assert_eq!(config.api.base_url, "http://localhost:8000");
    assert_eq!(config.api.timeout_seconds, 30);
    assert_eq!(config.auth.keyring_service, "StaffDesk.dev");
}

#[test]
fn rejects_unknown_extensions_and_bad_urls() {
    let dir = TempDir::new().unwrap();

    let path = dir.path().join("staffdesk.yaml");
    std::fs::write(&path, "api: {}").unwrap();
    assert!(matches!(load_from_file(Some(&path)), Err(StaffDeskError::Config(_))));

    let path = dir.path().join("staffdesk.json");
    std::fs::write(&path, r#"{"api": {"base_url": "not a url"}}"#).unwrap();
    assert!(matches!(load_from_file(Some(&path)), Err(StaffDeskError::Config(_))));
}

#[test]
fn env_loading_requires_base_url() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let result = load_from_env();
    assert!(matches!(result, Err(StaffDeskError::Config(_))));
}

#[test]
fn env_loading_applies_overrides_and_defaults() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("STAFFDESK_API_BASE_URL", "https://ems.example.com/");
    std::env::set_var("STAFFDESK_API_TIMEOUT_SECS", "5");
    std::env::set_var("STAFFDESK_KEYRING_ACCOUNT", "alt");

    let config = load_from_env().unwrap();
    clear_env();

    assert_eq!(config.api.base_url, "https://ems.example.com");
    assert_eq!(config.api.timeout_seconds, 5);
    assert_eq!(config.api.user_agent, None);
    assert_eq!(config.auth.keyring_service, "StaffDesk.session");
    assert_eq!(config.auth.keyring_account, "alt");
}

#[test]
fn env_loading_rejects_invalid_timeout() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("STAFFDESK_API_BASE_URL", "https://ems.example.com");
    std::env::set_var("STAFFDESK_API_TIMEOUT_SECS", "soon");

    let result = load_from_env();
    clear_env();

    assert!(matches!(result, Err(StaffDeskError::Config(_))));
}
