//! Credential storage layer
//!
//! [`CredentialStore`] is the seam between the auth core and persistence.
//! Username uniqueness is owned by the store: `create_account` must fail
//! atomically with [`StoreError::Conflict`] on a duplicate, whatever any
//! earlier `username_exists` check returned.

pub mod account_repo;
pub mod memory;

pub use account_repo::PgCredentialStore;
pub use memory::InMemoryCredentialStore;

use crate::models::{Account, PublicProfile};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("username already exists")]
    Conflict,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result of an account update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountUpdate {
    Updated,
    /// Row exists but nothing changed
    Unchanged,
    NotFound,
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError>;

    async fn find_public_info_by_username(
        &self,
        username: &str,
    ) -> Result<Option<PublicProfile>, StoreError>;

    async fn username_exists(&self, username: &str) -> Result<bool, StoreError>;

    async fn create_account(
        &self,
        display_name: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<Account, StoreError>;

    async fn update_account(
        &self,
        username: &str,
        display_name: &str,
        password_hash: &str,
    ) -> Result<AccountUpdate, StoreError>;

    async fn save_token(
        &self,
        username: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Liveness of the backing store
    async fn ping(&self) -> Result<(), StoreError>;
}
