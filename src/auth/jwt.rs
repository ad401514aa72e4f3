//! Signed bearer tokens (HS256 JWT)
//!
//! The codec is built once from [`SecurityConfig`] and never mutated, so it
//! can be shared across request handlers behind an `Arc` without locking.

use crate::{config::SecurityConfig, error::AppError};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity claims carried by a token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (account ID)
    pub sub: Uuid,

    /// Display name at issue time
    pub name: String,

    pub username: String,

    /// Expiration (unix seconds)
    pub exp: i64,
}

/// Outcome of verifying a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    Valid(Claims),
    Invalid,
    Expired,
}

pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Create codec from the security config
    pub fn from_config(config: &SecurityConfig) -> Result<Self, AppError> {
        Self::from_secret(config.jwt_secret.expose_secret())
    }

    fn from_secret(secret: &str) -> Result<Self, AppError> {
        // HS256 wants at least 32 bytes of key material
        if secret.len() < 32 {
            return Err(AppError::Config("JWT secret too short (min 32 chars)".to_string()));
        }

        // Expiry is checked by `verify_at` against the caller's clock so that
        // expired and forged tokens stay distinguishable.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    /// Sign claims into a compact token string
    pub fn issue(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode token: {:?}", e);
            AppError::Internal(format!("Failed to encode token: {}", e))
        })
    }

    /// Verify a token against the current time
    pub fn verify(&self, token: &str) -> TokenStatus {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token against `now`. The signature is checked before any
    /// claim is decoded.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> TokenStatus {
        let claims = match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => data.claims,
            Err(e) => {
                tracing::debug!("Token validation failed: {:?}", e.kind());
                return TokenStatus::Invalid;
            }
        };

        if claims.exp < now.timestamp() {
            return TokenStatus::Expired;
        }

        TokenStatus::Valid(claims)
    }
}
