//! 健康检查路由
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /health | GET | 简单健康检查 | 无 |
//! | /health/detailed | GET | 详细健康检查（指标 + 最近一次同步结果） | 无 |
//!
//! # 响应示例
//!
//! ```json
//! {
//!   "status": "ok",
//!   "version": "0.1.0",
//!   "mappings_loaded": true,
//!   "mapping_count": 412
//! }
//! ```

use std::collections::BTreeMap;

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use shared::{OrderSyncStats, SyncStats};

use crate::core::ServerState;

/// 健康检查路由 - 公共路由 (无需认证)
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/detailed", get(detailed_health))
}

/// 简单健康检查响应
#[derive(Serialize)]
pub struct HealthResponse {
    /// 状态 (ok | error)
    status: &'static str,
    /// 版本号
    version: &'static str,
    /// 映射表是否已加载
    mappings_loaded: bool,
    /// 已加载的映射数量
    mapping_count: usize,
}

async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        mappings_loaded: state.mapper.is_loaded(),
        mapping_count: state.mapper.mapping_count(),
    })
}

/// 详细健康检查响应
#[derive(Serialize)]
pub struct DetailedHealthResponse {
    status: &'static str,
    version: &'static str,
    environment: String,
    /// 运行时间 (秒)
    uptime_seconds: i64,
    mapping_count: usize,
    /// 查询命中率计数器
    lookup_metrics: BTreeMap<String, u64>,
    /// 最近一次库存全量同步结果
    #[serde(skip_serializing_if = "Option::is_none")]
    last_stock_sweep: Option<SyncStats>,
    /// 最近一次订单轮询结果
    #[serde(skip_serializing_if = "Option::is_none")]
    last_order_poll: Option<OrderSyncStats>,
    /// 最近一次发货同步结果
    #[serde(skip_serializing_if = "Option::is_none")]
    last_shipment_pass: Option<OrderSyncStats>,
}

async fn detailed_health(State(state): State<ServerState>) -> Json<DetailedHealthResponse> {
    Json(DetailedHealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        uptime_seconds: state.uptime_seconds(),
        mapping_count: state.mapper.mapping_count(),
        lookup_metrics: state.mapper.metrics().snapshot(),
        last_stock_sweep: state.stock_sync.last_sweep(),
        last_order_poll: state.order_sync.last_poll(),
        last_shipment_pass: state.order_sync.last_shipped(),
    })
}
