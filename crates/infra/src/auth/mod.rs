//! Token storage
//!
//! The access token lives in process memory only; the refresh token is
//! persisted through a vault so the session can be restored after a
//! restart.

mod token_store;
mod vault;

pub use token_store::SessionTokenStore;
pub use vault::{KeyringVault, MemoryVault, RefreshTokenVault};
