//! Account repository (PostgreSQL)

use super::{AccountUpdate, CredentialStore, StoreError};
use crate::models::{Account, PublicProfile};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub struct PgCredentialStore {
    db: PgPool,
}

impl PgCredentialStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// 唯一约束冲突映射为 Conflict
fn map_insert_error(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => StoreError::Conflict,
        _ => StoreError::Database(e),
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.db)
            .await?;

        Ok(account)
    }

    async fn find_public_info_by_username(
        &self,
        username: &str,
    ) -> Result<Option<PublicProfile>, StoreError> {
        let profile = sqlx::query_as::<_, PublicProfile>(
            "SELECT id, display_name, username FROM accounts WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;

        Ok(profile)
    }

    async fn username_exists(&self, username: &str) -> Result<bool, StoreError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.db)
                .await?;

        Ok(exists)
    }

    async fn create_account(
        &self,
        display_name: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<Account, StoreError> {
        sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (display_name, username, password_hash)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(display_name)
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(map_insert_error)
    }

    async fn update_account(
        &self,
        username: &str,
        display_name: &str,
        password_hash: &str,
    ) -> Result<AccountUpdate, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET
                display_name = $2,
                password_hash = $3,
                updated_at = NOW()
            WHERE username = $1
              AND (display_name IS DISTINCT FROM $2 OR password_hash IS DISTINCT FROM $3)
            "#,
        )
        .bind(username)
        .bind(display_name)
        .bind(password_hash)
        .execute(&self.db)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(AccountUpdate::Updated);
        }

        if self.username_exists(username).await? {
            Ok(AccountUpdate::Unchanged)
        } else {
            Ok(AccountUpdate::NotFound)
        }
    }

    async fn save_token(
        &self,
        username: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE accounts
            SET
                token = $2,
                token_expires_at = $3,
                updated_at = NOW()
            WHERE username = $1
            "#,
        )
        .bind(username)
        .bind(token)
        .bind(expires_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        crate::db::ping(&self.db).await?;
        Ok(())
    }
}
