//! Session token store
//!
//! Implements the core `TokenStore` port: an in-memory access token plus a
//! vault-backed refresh token, loaded once at startup and written through
//! on every change.

use std::sync::Arc;

use async_trait::async_trait;
use staffdesk_core::TokenStore;
use staffdesk_domain::Result;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::vault::RefreshTokenVault;

/// The application's injectable token holder
///
/// Shared by the session service (which fills it on login and clears it on
/// logout) and the request pipeline (which reads the access token and
/// replaces it on refresh).
pub struct SessionTokenStore {
    access: RwLock<Option<String>>,
    refresh: RwLock<Option<String>>,
    vault: Arc<dyn RefreshTokenVault>,
}

impl SessionTokenStore {
    /// Create the store, loading any persisted refresh token from the vault
    ///
    /// An unreadable vault is treated as empty so a broken credential store
    /// degrades to an anonymous session instead of blocking startup.
    pub async fn initialize(vault: Arc<dyn RefreshTokenVault>) -> Result<Self> {
        let refresh = match vault.load().await {
            Ok(token) => {
                debug!(present = token.is_some(), "loaded persisted refresh token");
                token
            }
            Err(err) => {
                warn!(error = %err, "refresh token vault unreadable, starting without");
                None
            }
        };

        Ok(Self { access: RwLock::new(None), refresh: RwLock::new(refresh), vault })
    }
}

#[async_trait]
impl TokenStore for SessionTokenStore {
    async fn access_token(&self) -> Option<String> {
        self.access.read().await.clone()
    }

    async fn set_access_token(&self, token: Option<String>) -> Result<()> {
        *self.access.write().await = token;
        Ok(())
    }

    async fn refresh_token(&self) -> Option<String> {
        self.refresh.read().await.clone()
    }

    async fn set_refresh_token(&self, token: Option<String>) -> Result<()> {
        match &token {
            Some(value) => self.vault.store(value).await?,
            None => self.vault.delete().await?,
        }
        *self.refresh.write().await = token;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.vault.delete().await?;
        *self.access.write().await = None;
        *self.refresh.write().await = None;
        debug!("token store cleared");
        Ok(())
    }
}
