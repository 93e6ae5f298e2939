//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`webhook`] - 库存变更 Webhook 接收
//! - [`sync`] - 手动触发同步 / 去重集合管理
//! - [`mappings`] - 映射表查询和管理

pub mod health;
pub mod mappings;
pub mod sync;
pub mod webhook;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde::Serialize;
use shared::SyncError;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// Assemble the full application router
pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(webhook::router())
        .merge(sync::router())
        .merge(mappings::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Unified API error response body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

/// Engine error surfaced through an ops endpoint
#[derive(Debug)]
pub struct AppError(pub SyncError);

pub type AppResult<T> = Result<T, AppError>;

impl From<SyncError> for AppError {
    fn from(e: SyncError) -> Self {
        Self(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            SyncError::Validation(_) | SyncError::UnmappableOrder { .. } => {
                (StatusCode::BAD_REQUEST, "E0002")
            }
            SyncError::LockTimeout { .. } => (StatusCode::SERVICE_UNAVAILABLE, "E1002"),
            SyncError::StoreNotLoaded => (StatusCode::INTERNAL_SERVER_ERROR, "E1001"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "E9001"),
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "api request failed");
        }

        let body = Json(ErrorBody {
            code,
            message: self.0.to_string(),
        });
        (status, body).into_response()
    }
}
