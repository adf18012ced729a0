//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `STAFFDESK_API_BASE_URL`: Backend base URL (required)
//! - `STAFFDESK_API_TIMEOUT_SECS`: Request timeout in seconds
//! - `STAFFDESK_USER_AGENT`: User-Agent header value
//! - `STAFFDESK_KEYRING_SERVICE`: Keyring service name for the refresh token
//! - `STAFFDESK_KEYRING_ACCOUNT`: Keyring account name
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./staffdesk.json` or `./staffdesk.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names in the parent directory

use std::path::{Path, PathBuf};

use staffdesk_domain::{Config, Result, StaffDeskError};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `StaffDeskError::Config` if configuration cannot be loaded from
/// either source, the file format is invalid, or required fields are
/// missing.
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("configuration loaded from environment variables");
            Ok(config)
        }
        Err(err) => {
            tracing::debug!(error = ?err, "failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// `STAFFDESK_API_BASE_URL` is required; everything else falls back to its
/// default.
///
/// # Errors
/// Returns `StaffDeskError::Config` if the base URL is missing or invalid,
/// or an optional variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let base_url = env_var("STAFFDESK_API_BASE_URL")?;

    let mut config = Config::default();
    config.api.base_url = validate_base_url(&base_url)?;

    if let Ok(timeout) = std::env::var("STAFFDESK_API_TIMEOUT_SECS") {
        config.api.timeout_seconds = timeout
            .parse::<u64>()
            .map_err(|err| StaffDeskError::Config(format!("invalid timeout: {err}")))?;
    }
    if let Ok(agent) = std::env::var("STAFFDESK_USER_AGENT") {
        config.api.user_agent = Some(agent);
    }
    if let Ok(service) = std::env::var("STAFFDESK_KEYRING_SERVICE") {
        config.auth.keyring_service = service;
    }
    if let Ok(account) = std::env::var("STAFFDESK_KEYRING_ACCOUNT") {
        config.auth.keyring_account = account;
    }

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the locations listed in the module docs.
/// JSON and TOML are supported, detected by file extension.
///
/// # Errors
/// Returns `StaffDeskError::Config` if no file is found, the file cannot be
/// read, or its contents are invalid.
pub fn load_from_file(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => probe_config_paths().into_iter().find(|p| p.exists()).ok_or_else(|| {
            StaffDeskError::Config("no config file found in probed locations".to_string())
        })?,
    };

    let contents = std::fs::read_to_string(&path).map_err(|err| {
        StaffDeskError::Config(format!("failed to read {}: {err}", path.display()))
    })?;

    let mut config: Config = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&contents).map_err(|err| {
            StaffDeskError::Config(format!("invalid JSON in {}: {err}", path.display()))
        })?,
        Some("toml") => toml::from_str(&contents).map_err(|err| {
            StaffDeskError::Config(format!("invalid TOML in {}: {err}", path.display()))
        })?,
        other => {
            return Err(StaffDeskError::Config(format!(
                "unsupported config format: {other:?} ({})",
                path.display()
            )))
        }
    };

    config.api.base_url = validate_base_url(&config.api.base_url)?;
    tracing::info!(path = %path.display(), "configuration loaded from file");
    Ok(config)
}

fn probe_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for dir in ["./", "../"] {
        for name in ["staffdesk", "config"] {
            for ext in ["json", "toml"] {
                paths.push(PathBuf::from(format!("{dir}{name}.{ext}")));
            }
        }
    }
    paths
}

fn env_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| StaffDeskError::Config(format!("missing environment variable: {name}")))
}

/// Require an absolute http(s) URL and normalize away any trailing slash
fn validate_base_url(raw: &str) -> Result<String> {
    let parsed = url::Url::parse(raw)
        .map_err(|err| StaffDeskError::Config(format!("invalid base URL {raw:?}: {err}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(StaffDeskError::Config(format!(
            "base URL must be http or https, got {:?}",
            parsed.scheme()
        )));
    }
    Ok(raw.trim_end_matches('/').to_string())
}
