//! User profile types
//!
//! Profile data derived from the backend at login/bootstrap; the client
//! keeps it only for the lifetime of the session.

use serde::{Deserialize, Serialize};

/// User profile as held by the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    /// Display name; the backend may serve it as `full_name` or `name`,
    /// falling back to the username when both are absent
    pub display_name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Avatar path served by the backend
    pub avatar: Option<String>,
}
