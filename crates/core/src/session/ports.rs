//! Port interfaces for session management
//!
//! These traits define the boundaries between core business logic and
//! infrastructure implementations for credentials and the auth endpoints.

use async_trait::async_trait;
use staffdesk_domain::{ProfileUpdate, Registration, Result, TokenPair, UserProfile};

/// Holder for the session's bearer credentials
///
/// The access token is session-scoped (in memory only); the refresh token
/// persists across restarts. Setting a token to `None` removes it from
/// storage. The store never validates or inspects token contents.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Current access token, if any
    async fn access_token(&self) -> Option<String>;

    /// Replace or remove the access token
    async fn set_access_token(&self, token: Option<String>) -> Result<()>;

    /// Current refresh token, if any
    async fn refresh_token(&self) -> Option<String>;

    /// Replace or remove the persisted refresh token
    async fn set_refresh_token(&self, token: Option<String>) -> Result<()>;

    /// Remove both tokens
    async fn clear(&self) -> Result<()>;
}

/// Trait for the authentication and profile endpoints
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Exchange credentials for an access/refresh token pair
    async fn login(&self, username: &str, password: &str) -> Result<TokenPair>;

    /// Create a new account; does not log in
    async fn register(&self, registration: &Registration) -> Result<()>;

    /// Fetch the current user's profile
    async fn fetch_profile(&self) -> Result<UserProfile>;

    /// Apply a partial profile update, returning the updated profile
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile>;

    /// Change the current user's password
    async fn change_password(&self, old_password: &str, new_password: &str) -> Result<()>;
}
