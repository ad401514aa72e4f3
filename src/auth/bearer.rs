//! Bearer token extraction and the owner check

use crate::{auth::jwt::Claims, error::AppError};
use axum::{extract::FromRequestParts, http::HeaderMap};
use std::convert::Infallible;

/// Raw bearer token from the `Authorization` header with the `Bearer `
/// prefix and surrounding whitespace removed. A missing header yields an
/// empty token, which never verifies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        Ok(BearerToken(extract_token(&parts.headers)))
    }
}

/// 从 Authorization 头提取令牌
pub fn extract_token(headers: &HeaderMap) -> String {
    let raw = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .trim();

    raw.strip_prefix("Bearer ").unwrap_or(raw).trim().to_string()
}

/// Only the account owner may act on `username`: exact, case-sensitive
/// comparison with the verified token's username claim.
pub fn ensure_owner(claims: &Claims, username: &str) -> Result<(), AppError> {
    if claims.username == username {
        Ok(())
    } else {
        tracing::warn!(
            token_user = %claims.username,
            target_user = %username,
            "Token identity does not match target account"
        );
        Err(AppError::Forbidden)
    }
}
