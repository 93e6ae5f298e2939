//! Inventory stock webhook
//!
//! The upstream ERP notifies stock changes as an event list; each event
//! carries a resource URL whose last path segment is the internal id.
//!
//! Response contract: the handler answers 200 for every outcome except an
//! authentication/content-type failure (401) or a missing body (400); business
//! failures must never drive the sender into a retry storm.
//! Synchronization itself happens in fire-and-forget tasks AFTER the
//! response; a 200 therefore only acknowledges receipt, never success.

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::post;
use serde::Deserialize;

use crate::core::ServerState;

/// Event types that are stock-relevant; everything else is accepted and
/// ignored
const STOCK_EVENT_TYPES: &[&str] = &["stock", "stock.updated"];

pub fn router() -> Router<ServerState> {
    Router::new().route("/webhooks/inventory", post(handle_inventory_webhook))
}

#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    /// Resource URL; the internal id is its last path segment
    pub resource: String,
}

async fn handle_inventory_webhook(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: String,
) -> StatusCode {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !content_type.starts_with("application/json") {
        tracing::warn!(content_type, "webhook rejected: unexpected content type");
        return StatusCode::UNAUTHORIZED;
    }

    if let Some(expected) = &state.config.webhook_token {
        let provided = headers
            .get("x-webhook-token")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if provided != expected {
            tracing::warn!("webhook rejected: token mismatch");
            return StatusCode::UNAUTHORIZED;
        }
    }

    // Weak authenticity check only: log a mismatch but keep processing.
    // TODO: replace with HMAC signature verification once the ERP supports
    // signing webhook deliveries.
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if user_agent != state.config.webhook_user_agent {
        tracing::warn!(user_agent, "webhook from unexpected user agent");
    }

    if body.trim().is_empty() {
        return StatusCode::BAD_REQUEST;
    }

    let payload: WebhookPayload = match serde_json::from_str(&body) {
        Ok(payload) => payload,
        Err(e) => {
            // Malformed payloads are logged and dropped, never bounced;
            // bouncing would only make the sender redeliver the same body.
            tracing::warn!(error = %e, "webhook body could not be parsed");
            return StatusCode::OK;
        }
    };

    let mut dispatched = 0usize;
    let mut ignored = 0usize;
    for event in payload.events {
        if !STOCK_EVENT_TYPES.contains(&event.event_type.as_str()) {
            ignored += 1;
            continue;
        }
        let Some(internal_id) = extract_internal_id(&event.resource) else {
            tracing::warn!(resource = %event.resource, "webhook event without extractable id");
            continue;
        };

        dispatched += 1;
        let stock_sync = state.stock_sync.clone();
        tokio::spawn(async move {
            stock_sync.handle_webhook_update(&internal_id).await;
        });
    }

    tracing::debug!(dispatched, ignored, "webhook processed");
    StatusCode::OK
}

/// Internal id = last path segment of the resource URL
///
/// Query strings and fragments are stripped first; a trailing slash does
/// not hide the segment. A URL without any path segment has no id.
pub fn extract_internal_id(resource: &str) -> Option<String> {
    let without_query = resource.split(['?', '#']).next().unwrap_or(resource);
    let without_scheme = without_query
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(without_query);
    let (_, segment) = without_scheme.trim_end_matches('/').rsplit_once('/')?;
    if segment.is_empty() {
        return None;
    }
    Some(segment.to_string())
}
