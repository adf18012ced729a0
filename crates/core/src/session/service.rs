//! Session service with silent restore
//!
//! Owns the session state machine:
//! - On startup, `bootstrap` restores a session from a persisted refresh
//!   token before any navigation decision is made.
//! - Login stores both tokens and fetches the profile.
//! - Logout and irrecoverable failures clear the token store.

use std::sync::Arc;

use staffdesk_domain::{
    ProfileUpdate, Registration, Result, SessionState, StaffDeskError, UserProfile,
};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::ports::{AuthGateway, TokenStore};

/// Session lifecycle service
///
/// State starts as [`SessionState::Pending`] and stays there until
/// `bootstrap` settles; callers must defer authentication-based decisions
/// until then.
pub struct SessionService {
    gateway: Arc<dyn AuthGateway>,
    tokens: Arc<dyn TokenStore>,
    state: RwLock<SessionState>,
}

impl SessionService {
    pub fn new(gateway: Arc<dyn AuthGateway>, tokens: Arc<dyn TokenStore>) -> Self {
        Self { gateway, tokens, state: RwLock::new(SessionState::Pending) }
    }

    /// Current session state
    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    /// Restore the session from a persisted refresh token
    ///
    /// With no refresh token stored, settles to `Anonymous` immediately and
    /// makes no network call. Otherwise fetches the profile; the request
    /// pipeline transparently refreshes the access token on the expected
    /// 401. A failed fetch clears the token store and settles to
    /// `Anonymous` rather than propagating the error.
    pub async fn bootstrap(&self) -> Result<SessionState> {
        if self.tokens.refresh_token().await.is_none() {
            debug!("no persisted refresh token, session starts anonymous");
            return Ok(self.settle(SessionState::Anonymous).await);
        }

        match self.gateway.fetch_profile().await {
            Ok(profile) => {
                info!(username = %profile.username, "session restored");
                Ok(self.settle(SessionState::Authenticated(profile)).await)
            }
            Err(err) => {
                warn!(error = %err, "session restore failed, clearing tokens");
                self.clear_tokens_best_effort().await;
                Ok(self.settle(SessionState::Anonymous).await)
            }
        }
    }

    /// Log in with username and password
    ///
    /// Stores both tokens, then fetches the profile. Any failure clears the
    /// token store and leaves the session anonymous.
    pub async fn login(&self, username: &str, password: &str) -> Result<UserProfile> {
        let pair = match self.gateway.login(username, password).await {
            Ok(pair) => pair,
            Err(err) => {
                warn!(error = %err, "login failed");
                self.clear_tokens_best_effort().await;
                self.settle(SessionState::Anonymous).await;
                return Err(err);
            }
        };

        self.tokens.set_access_token(Some(pair.access)).await?;
        self.tokens.set_refresh_token(Some(pair.refresh)).await?;

        match self.gateway.fetch_profile().await {
            Ok(profile) => {
                info!(username = %profile.username, "login successful");
                self.settle(SessionState::Authenticated(profile.clone())).await;
                Ok(profile)
            }
            Err(err) => {
                warn!(error = %err, "profile fetch after login failed");
                self.clear_tokens_best_effort().await;
                self.settle(SessionState::Anonymous).await;
                Err(err)
            }
        }
    }

    /// Create a new account
    ///
    /// Registration does not log the user in; the caller decides whether to
    /// follow up with [`Self::login`].
    pub async fn register(&self, registration: &Registration) -> Result<()> {
        self.gateway.register(registration).await
    }

    /// Log out, clearing both tokens
    ///
    /// Purely local: the backend is not notified.
    pub async fn logout(&self) -> Result<()> {
        self.tokens.clear().await?;
        self.settle(SessionState::Anonymous).await;
        info!("logged out");
        Ok(())
    }

    /// Update the authenticated user's profile
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile> {
        if !self.state.read().await.is_authenticated() {
            return Err(StaffDeskError::Auth("not authenticated".to_string()));
        }

        let profile = self.gateway.update_profile(update).await?;
        *self.state.write().await = SessionState::Authenticated(profile.clone());
        Ok(profile)
    }

    /// Change the authenticated user's password
    pub async fn change_password(&self, old_password: &str, new_password: &str) -> Result<()> {
        self.gateway.change_password(old_password, new_password).await
    }

    async fn settle(&self, state: SessionState) -> SessionState {
        *self.state.write().await = state.clone();
        state
    }

    async fn clear_tokens_best_effort(&self) {
        if let Err(err) = self.tokens.clear().await {
            warn!(error = %err, "failed to clear token store");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use staffdesk_domain::TokenPair;

    use super::*;

    #[derive(Default)]
    struct FakeTokenStore {
        access: Mutex<Option<String>>,
        refresh: Mutex<Option<String>>,
    }

    impl FakeTokenStore {
        fn with_refresh(token: &str) -> Self {
            let store = Self::default();
            *store.refresh.lock().unwrap() = Some(token.to_string());
            store
        }
    }

    #[async_trait]
    impl TokenStore for FakeTokenStore {
        async fn access_token(&self) -> Option<String> {
            self.access.lock().unwrap().clone()
        }

        async fn set_access_token(&self, token: Option<String>) -> Result<()> {
            *self.access.lock().unwrap() = token;
            Ok(())
        }

        async fn refresh_token(&self) -> Option<String> {
            self.refresh.lock().unwrap().clone()
        }

        async fn set_refresh_token(&self, token: Option<String>) -> Result<()> {
            *self.refresh.lock().unwrap() = token;
            Ok(())
        }

        async fn clear(&self) -> Result<()> {
            *self.access.lock().unwrap() = None;
            *self.refresh.lock().unwrap() = None;
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeGateway {
        profile_calls: AtomicUsize,
        fail_profile: bool,
        fail_login: bool,
    }

    fn profile() -> UserProfile {
        UserProfile {
            username: "jsmith".to_string(),
            display_name: "Jan Smith".to_string(),
            email: "jsmith@example.com".to_string(),
            phone: None,
            avatar: None,
        }
    }

    #[async_trait]
    impl AuthGateway for FakeGateway {
        async fn login(&self, _username: &str, _password: &str) -> Result<TokenPair> {
            if self.fail_login {
                return Err(StaffDeskError::Auth("bad credentials".to_string()));
            }
            Ok(TokenPair { access: "acc-1".to_string(), refresh: "ref-1".to_string() })
        }

        async fn register(&self, _registration: &Registration) -> Result<()> {
            Ok(())
        }

        async fn fetch_profile(&self) -> Result<UserProfile> {
            self.profile_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_profile {
                return Err(StaffDeskError::Auth("refresh failed".to_string()));
            }
            Ok(profile())
        }

        async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile> {
            let mut updated = profile();
            if let Some(name) = &update.full_name {
                updated.display_name = name.clone();
            }
            updated.phone = update.phone.clone();
            Ok(updated)
        }

        async fn change_password(&self, _old: &str, _new: &str) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn bootstrap_without_refresh_token_is_anonymous_and_offline() {
        let gateway = Arc::new(FakeGateway::default());
        let tokens = Arc::new(FakeTokenStore::default());
        let service = SessionService::new(gateway.clone(), tokens);

        assert!(matches!(service.state().await, SessionState::Pending));

        let state = service.bootstrap().await.unwrap();
        assert!(matches!(state, SessionState::Anonymous));

        // No network call was made
        assert_eq!(gateway.profile_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn bootstrap_with_refresh_token_restores_session() {
        let gateway = Arc::new(FakeGateway::default());
        let tokens = Arc::new(FakeTokenStore::with_refresh("ref-1"));
        let service = SessionService::new(gateway.clone(), tokens);

        let state = service.bootstrap().await.unwrap();
        match state {
            SessionState::Authenticated(profile) => assert_eq!(profile.username, "jsmith"),
            other => panic!("expected authenticated state, got {other:?}"),
        }
        assert_eq!(gateway.profile_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_restore_clears_tokens() {
        let gateway = Arc::new(FakeGateway { fail_profile: true, ..Default::default() });
        let tokens = Arc::new(FakeTokenStore::with_refresh("stale"));
        let service = SessionService::new(gateway, tokens.clone());

        let state = service.bootstrap().await.unwrap();
        assert!(matches!(state, SessionState::Anonymous));
        assert!(tokens.refresh_token().await.is_none());
        assert!(tokens.access_token().await.is_none());
    }

    #[tokio::test]
    async fn login_stores_tokens_and_authenticates() {
        let gateway = Arc::new(FakeGateway::default());
        let tokens = Arc::new(FakeTokenStore::default());
        let service = SessionService::new(gateway, tokens.clone());

        let profile = service.login("jsmith", "hunter2").await.unwrap();
        assert_eq!(profile.display_name, "Jan Smith");
        assert_eq!(tokens.access_token().await.as_deref(), Some("acc-1"));
        assert_eq!(tokens.refresh_token().await.as_deref(), Some("ref-1"));
        assert!(service.state().await.is_authenticated());
    }

    #[tokio::test]
    async fn failed_login_leaves_session_anonymous() {
        let gateway = Arc::new(FakeGateway { fail_login: true, ..Default::default() });
        let tokens = Arc::new(FakeTokenStore::default());
        let service = SessionService::new(gateway, tokens.clone());

        let result = service.login("jsmith", "wrong").await;
        assert!(result.is_err());
        assert!(tokens.access_token().await.is_none());
        assert!(matches!(service.state().await, SessionState::Anonymous));
    }

    #[tokio::test]
    async fn logout_clears_both_tokens() {
        let gateway = Arc::new(FakeGateway::default());
        let tokens = Arc::new(FakeTokenStore::default());
        let service = SessionService::new(gateway, tokens.clone());

        service.login("jsmith", "hunter2").await.unwrap();
        service.logout().await.unwrap();

        assert!(tokens.access_token().await.is_none());
        assert!(tokens.refresh_token().await.is_none());

        // A subsequent bootstrap finds no refresh token
        let state = service.bootstrap().await.unwrap();
        assert!(matches!(state, SessionState::Anonymous));
    }

    #[tokio::test]
    async fn update_profile_requires_authentication() {
        let gateway = Arc::new(FakeGateway::default());
        let tokens = Arc::new(FakeTokenStore::default());
        let service = SessionService::new(gateway, tokens);

        let result = service.update_profile(&ProfileUpdate::default()).await;
        assert!(matches!(result, Err(StaffDeskError::Auth(_))));
    }

    #[tokio::test]
    async fn update_profile_replaces_held_profile() {
        let gateway = Arc::new(FakeGateway::default());
        let tokens = Arc::new(FakeTokenStore::default());
        let service = SessionService::new(gateway, tokens);

        service.login("jsmith", "hunter2").await.unwrap();
        let update = ProfileUpdate {
            full_name: Some("Jan A. Smith".to_string()),
            phone: Some("555-0100".to_string()),
        };
        let updated = service.update_profile(&update).await.unwrap();
        assert_eq!(updated.display_name, "Jan A. Smith");

        match service.state().await {
            SessionState::Authenticated(profile) => {
                assert_eq!(profile.phone.as_deref(), Some("555-0100"));
            }
            other => panic!("expected authenticated state, got {other:?}"),
        }
    }
}
