//! Account domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored account row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Account {
    pub id: Uuid,
    pub display_name: String,
    pub username: String,
    pub password_hash: String,

    // Last issued token
    pub token: Option<String>,
    pub token_expires_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Token record currently stored against an account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl Account {
    /// Last issued token, or `None` when absent or already expired at `now`
    pub fn active_token(&self, now: DateTime<Utc>) -> Option<StoredToken> {
        match (&self.token, self.token_expires_at) {
            (Some(token), Some(expires_at)) if expires_at >= now => Some(StoredToken {
                token: token.clone(),
                expires_at,
            }),
            _ => None,
        }
    }
}

/// Public view of an account, never carries credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub id: Uuid,
    pub display_name: String,
    pub username: String,
}

impl From<Account> for PublicProfile {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            display_name: account.display_name,
            username: account.username,
        }
    }
}

/// Registration request; fields are optional so absence can be reported
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub display_name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Login request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Profile update request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub password: Option<String>,
}
