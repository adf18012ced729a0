//! Session and credential types
//!
//! The client never inspects token contents; both tokens are opaque strings
//! minted by the backend.

use serde::{Deserialize, Serialize};

use super::user::UserProfile;

/// Access/refresh token pair returned by the login endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived bearer credential for API calls
    pub access: String,
    /// Longer-lived credential used solely to mint new access tokens
    pub refresh: String,
}

/// Authentication state of the client session
///
/// `Pending` covers the restoration window on startup: until the state
/// leaves `Pending`, callers must not make navigation decisions based on
/// authentication (render a neutral loading state instead).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(tag = "state", content = "profile")]
pub enum SessionState {
    /// Bootstrap has not settled yet
    #[default]
    Pending,
    /// Session restored or established; profile is populated
    Authenticated(UserProfile),
    /// No session; the user must log in
    Anonymous,
}

impl SessionState {
    /// Whether bootstrap has settled (either outcome)
    pub fn is_ready(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Whether the session is authenticated
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// Account registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Display name, stored server-side as the first name
    pub name: String,
}

/// Partial profile update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
}
