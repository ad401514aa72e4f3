//! In-process credential store
//!
//! Backed by a `tokio::sync::RwLock<HashMap>`; the write lock makes the
//! duplicate check and insert in `create_account` a single atomic step.

use super::{AccountUpdate, CredentialStore, StoreError};
use crate::models::{Account, PublicProfile};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryCredentialStore {
    accounts: RwLock<HashMap<String, Account>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.read().await.get(username).cloned())
    }

    async fn find_public_info_by_username(
        &self,
        username: &str,
    ) -> Result<Option<PublicProfile>, StoreError> {
        Ok(self
            .accounts
            .read()
            .await
            .get(username)
            .cloned()
            .map(PublicProfile::from))
    }

    async fn username_exists(&self, username: &str) -> Result<bool, StoreError> {
        Ok(self.accounts.read().await.contains_key(username))
    }

    async fn create_account(
        &self,
        display_name: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<Account, StoreError> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(username) {
            return Err(StoreError::Conflict);
        }

        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            display_name: display_name.to_string(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            token: None,
            token_expires_at: None,
            created_at: now,
            updated_at: now,
        };
        accounts.insert(username.to_string(), account.clone());

        Ok(account)
    }

    async fn update_account(
        &self,
        username: &str,
        display_name: &str,
        password_hash: &str,
    ) -> Result<AccountUpdate, StoreError> {
        let mut accounts = self.accounts.write().await;
        let Some(account) = accounts.get_mut(username) else {
            return Ok(AccountUpdate::NotFound);
        };

        if account.display_name == display_name && account.password_hash == password_hash {
            return Ok(AccountUpdate::Unchanged);
        }

        account.display_name = display_name.to_string();
        account.password_hash = password_hash.to_string();
        account.updated_at = Utc::now();

        Ok(AccountUpdate::Updated)
    }

    async fn save_token(
        &self,
        username: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        if let Some(account) = self.accounts.write().await.get_mut(username) {
            account.token = Some(token.to_string());
            account.token_expires_at = Some(expires_at);
            account.updated_at = Utc::now();
        }

        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
