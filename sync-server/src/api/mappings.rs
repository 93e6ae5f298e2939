//! Mapping table inspection and administration
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/mappings | GET | 映射表概览 + 查询指标 |
//! | /api/mappings/orders | GET | 全部订单映射 |
//! | /api/mappings/orders/{external_order_id} | DELETE | 删除订单映射（管理操作） |

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::Serialize;
use shared::mapping::OrderMappingEntry;

use super::{AppError, AppResult};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/mappings", get(mapping_overview))
        .route("/api/mappings/orders", get(list_order_mappings))
        .route(
            "/api/mappings/orders/{external_order_id}",
            delete(delete_order_mapping),
        )
}

#[derive(Serialize)]
pub struct MappingOverview {
    loaded: bool,
    count: usize,
    lookup_metrics: BTreeMap<String, u64>,
}

async fn mapping_overview(State(state): State<ServerState>) -> Json<MappingOverview> {
    Json(MappingOverview {
        loaded: state.mapper.is_loaded(),
        count: state.mapper.mapping_count(),
        lookup_metrics: state.mapper.metrics().snapshot(),
    })
}

async fn list_order_mappings(
    State(state): State<ServerState>,
) -> AppResult<Json<Vec<OrderMappingEntry>>> {
    Ok(Json(state.mapper.order_mappings()?))
}

async fn delete_order_mapping(
    State(state): State<ServerState>,
    Path(external_order_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let deleted = state.mapper.delete_order_mapping(&external_order_id).await?;
    if deleted {
        tracing::info!(external_order_id = %external_order_id, "order mapping deleted by admin request");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Ok(StatusCode::NOT_FOUND)
    }
}
