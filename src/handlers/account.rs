//! 账户相关的 HTTP 处理器

use crate::{
    auth::BearerToken,
    error::AppError,
    middleware::AppState,
    models::{LoginRequest, RegisterRequest, UpdateProfileRequest},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// 请求体无法解析时视为空请求，交由服务层按字段缺失或认证失败处理
fn body_or_default<T: Default>(body: Result<Json<T>, JsonRejection>) -> T {
    match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Request body rejected, treating as empty");
            T::default()
        }
    }
}

/// 注册
pub async fn register(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    state.auth_service.register(body_or_default(body)).await?;

    Ok(Json(json!({ "message": "user created" })))
}

/// 登录
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let response = state.auth_service.login(body_or_default(body)).await?;

    Ok(Json(response))
}

/// 获取用户公开资料
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    BearerToken(token): BearerToken,
) -> Result<impl IntoResponse, AppError> {
    let profile = state.auth_service.get_profile(&username, &token).await?;

    Ok(Json(profile))
}

/// 更新本人资料
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    BearerToken(token): BearerToken,
    body: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    state
        .auth_service
        .update_profile(&username, &token, body_or_default(body))
        .await?;

    Ok(Json(json!({ "message": "profile updated" })))
}
