//! Manual sync triggers
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/sync/stock | POST | 立即执行库存全量同步 |
//! | /api/sync/orders | POST | 立即执行订单轮询 + 发货同步 |
//! | /api/sync/orders/processed | DELETE | 清空订单去重集合（管理操作） |

use axum::routing::{delete, post};
use axum::{Json, Router, extract::State};
use serde::Serialize;
use shared::{OrderSyncStats, SyncStats};

use super::AppResult;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/sync/stock", post(trigger_stock_sweep))
        .route("/api/sync/orders", post(trigger_order_sync))
        .route("/api/sync/orders/processed", delete(clear_processed))
}

async fn trigger_stock_sweep(State(state): State<ServerState>) -> AppResult<Json<SyncStats>> {
    let stats = state.stock_sync.full_sweep().await?;
    Ok(Json(stats))
}

/// Combined result of one manual order synchronization
#[derive(Serialize)]
pub struct OrderSyncReport {
    poll: OrderSyncStats,
    shipments: OrderSyncStats,
}

async fn trigger_order_sync(State(state): State<ServerState>) -> AppResult<Json<OrderSyncReport>> {
    let poll = state.order_sync.poll_and_process().await?;
    let shipments = state.order_sync.process_shipped().await?;
    Ok(Json(OrderSyncReport { poll, shipments }))
}

/// Cleared de-dup markers
#[derive(Serialize)]
pub struct ClearedResponse {
    cleared_processed: usize,
    cleared_shipped: usize,
}

async fn clear_processed(State(state): State<ServerState>) -> Json<ClearedResponse> {
    let (cleared_processed, cleared_shipped) = state.order_sync.clear_processed();
    tracing::info!(
        cleared_processed,
        cleared_shipped,
        "order de-dup sets cleared by admin request"
    );
    Json(ClearedResponse {
        cleared_processed,
        cleared_shipped,
    })
}
