//! HTTP clients for the two external platforms
//!
//! # 模块结构
//!
//! - [`retry`] - 指数退避重试策略（所有出站 Marketplace 调用共用）
//! - [`inventory`] - 上游 ERP 客户端（库存查询、订单/发货创建）
//! - [`marketplace`] - 下游销售渠道客户端（订单轮询、库存推送）
//!
//! Both clients map failures into [`ApiError`] with transient/permanent
//! classification; the retry policy lives one layer up, in the executors.

pub mod inventory;
pub mod marketplace;
pub mod retry;

pub use inventory::{InventoryApi, InventoryClient};
pub use marketplace::{MAX_STOCK_BATCH, MarketplaceApi, MarketplaceClient};
pub use retry::RetryConfig;

use std::time::Duration;

use serde::de::DeserializeOwned;
use shared::ApiError;

/// Check the response status and decode the JSON body.
///
/// Non-success statuses become [`ApiError`] (429/5xx transient, other 4xx
/// permanent); a 429 carries the server's `Retry-After` seconds when the
/// header is present. A body that fails to decode is a permanent error.
pub(crate) async fn decode_json<T: DeserializeOwned>(
    response: reqwest::Response,
    context: &str,
) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs);

        let body = response.text().await.unwrap_or_default();
        let snippet: String = body.chars().take(200).collect();
        let mut err = ApiError::from_status(
            status.as_u16(),
            format!("{context} failed with status {status}: {snippet}"),
        );
        if let Some(delay) = retry_after {
            err = err.with_retry_after(delay);
        }
        return Err(err);
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::permanent(format!("{context}: failed to parse response: {e}")))
}

/// Map a reqwest transport failure (timeout, refused/reset connection, DNS)
/// into a transient [`ApiError`].
pub(crate) fn transport_error(error: reqwest::Error, context: &str) -> ApiError {
    ApiError::transient(format!("{context}: request failed: {error}"))
}

/// Build the shared reqwest client with the fixed per-request timeout
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, ApiError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ApiError::permanent(format!("failed to build HTTP client: {e}")))
}
