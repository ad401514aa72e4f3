//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;

use crate::{handlers, middleware::AppState};

/// 请求体上限
const MAX_BODY_BYTES: usize = 16 * 1024;

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check));

    let account_routes = Router::new()
        .route("/register", post(handlers::account::register))
        .route("/login", post(handlers::account::login))
        .route(
            "/users/{username}",
            get(handlers::account::get_profile).put(handlers::account::update_profile),
        );

    Router::new()
        .merge(public_routes)
        .merge(account_routes)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(
                    crate::middleware::request_tracking_middleware,
                ))
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)),
        )
        .with_state(state)
}
