//! Refresh token persistence
//!
//! Only the refresh token goes through a vault; it is the one credential
//! that must survive restarts. The access token never touches storage.

use async_trait::async_trait;
use staffdesk_domain::{AuthConfig, Result, StaffDeskError};
use tokio::sync::RwLock;
use tracing::debug;

/// Persistence backend for the refresh token
#[async_trait]
pub trait RefreshTokenVault: Send + Sync {
    /// Load the persisted refresh token, if one exists
    async fn load(&self) -> Result<Option<String>>;

    /// Persist a refresh token, replacing any previous one
    async fn store(&self, token: &str) -> Result<()>;

    /// Remove the persisted refresh token; idempotent
    async fn delete(&self) -> Result<()>;
}

/// Platform credential store (macOS Keychain, Windows Credential Manager,
/// Linux Secret Service) via the `keyring` crate
///
/// `keyring` is blocking, so every operation runs on the blocking pool.
pub struct KeyringVault {
    service: String,
    account: String,
}

impl KeyringVault {
    pub fn new(config: &AuthConfig) -> Self {
        Self { service: config.keyring_service.clone(), account: config.keyring_account.clone() }
    }

    fn entry(service: &str, account: &str) -> Result<keyring::Entry> {
        keyring::Entry::new(service, account)
            .map_err(|err| StaffDeskError::Storage(format!("keyring entry: {err}")))
    }
}

#[async_trait]
impl RefreshTokenVault for KeyringVault {
    async fn load(&self) -> Result<Option<String>> {
        let (service, account) = (self.service.clone(), self.account.clone());
        spawn_vault(move || {
            let entry = Self::entry(&service, &account)?;
            match entry.get_password() {
                Ok(token) => Ok(Some(token)),
                Err(keyring::Error::NoEntry) => Ok(None),
                Err(err) => Err(StaffDeskError::Storage(format!("keyring read: {err}"))),
            }
        })
        .await
    }

    async fn store(&self, token: &str) -> Result<()> {
        let (service, account) = (self.service.clone(), self.account.clone());
        let token = token.to_string();
        spawn_vault(move || {
            let entry = Self::entry(&service, &account)?;
            entry
                .set_password(&token)
                .map_err(|err| StaffDeskError::Storage(format!("keyring write: {err}")))
        })
        .await?;
        debug!("refresh token persisted");
        Ok(())
    }

    async fn delete(&self) -> Result<()> {
        let (service, account) = (self.service.clone(), self.account.clone());
        spawn_vault(move || {
            let entry = Self::entry(&service, &account)?;
            match entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
                Err(err) => Err(StaffDeskError::Storage(format!("keyring delete: {err}"))),
            }
        })
        .await?;
        debug!("refresh token removed");
        Ok(())
    }
}

async fn spawn_vault<T, F>(op: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|err| StaffDeskError::Internal(format!("vault task failed: {err}")))?
}

/// In-memory vault for tests and ephemeral sessions
#[derive(Default)]
pub struct MemoryVault {
    token: RwLock<Option<String>>,
}

impl MemoryVault {
    /// A vault pre-seeded with a refresh token, as after a previous session
    pub fn with_token(token: &str) -> Self {
        Self { token: RwLock::new(Some(token.to_string())) }
    }
}

#[async_trait]
impl RefreshTokenVault for MemoryVault {
    async fn load(&self) -> Result<Option<String>> {
        Ok(self.token.read().await.clone())
    }

    async fn store(&self, token: &str) -> Result<()> {
        *self.token.write().await = Some(token.to_string());
        Ok(())
    }

    async fn delete(&self) -> Result<()> {
        *self.token.write().await = None;
        Ok(())
    }
}
