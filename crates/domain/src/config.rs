//! Application configuration structures
//!
//! Plain data carried by the domain; loading lives in the infra crate.

use serde::{Deserialize, Serialize};

/// Top-level client configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the backend, without a trailing slash
    /// (e.g., "https://ems.example.com")
    pub base_url: String,
    /// Request timeout in seconds, applied to every call including refresh
    #[serde(default = "default_timeout_secs")]
    pub timeout_seconds: u64,
    /// User-Agent header sent with every request
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { base_url: String::new(), timeout_seconds: default_timeout_secs(), user_agent: None }
    }
}

/// Credential storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Keyring service name under which the refresh token is persisted
    #[serde(default = "default_keyring_service")]
    pub keyring_service: String,
    /// Keyring account name
    #[serde(default = "default_keyring_account")]
    pub keyring_account: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            keyring_service: default_keyring_service(),
            keyring_account: default_keyring_account(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_keyring_service() -> String {
    "StaffDesk.session".to_string()
}

fn default_keyring_account() -> String {
    "main".to_string()
}
