//! Marketplace wire types
//!
//! Everything the downstream sales channel speaks: orders as we poll them
//! and stock updates as we push them. All identifiers in this module are
//! EXTERNAL ids; translation to internal ids happens in the engine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order lifecycle status on the marketplace side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Returned,
}

impl OrderStatus {
    /// Query-string representation used by the orders endpoint
    pub fn as_query(&self) -> &'static str {
        match self {
            Self::Processing => "PROCESSING",
            Self::Shipped => "SHIPPED",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
            Self::Returned => "RETURNED",
        }
    }
}

/// An order as returned by the marketplace orders endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceOrder {
    pub order_id: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub line_items: Vec<MarketplaceLineItem>,
    /// Buyer block, passed through to Inventory untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer: Option<serde_json::Value>,
    /// Shipping address block, passed through to Inventory untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// One order position; `sku` is the marketplace's external product id
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceLineItem {
    pub sku: String,
    pub quantity: u32,
    /// Unit price in the MAJOR currency unit (e.g. 19.99 EUR)
    pub unit_price: Decimal,
}

/// Envelope of the orders endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct OrdersResponse {
    #[serde(default)]
    pub orders: Vec<MarketplaceOrder>,
}

/// One stock row in an outbound stock push
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockUpdateItem {
    /// External product id on the marketplace
    pub sku: String,
    pub warehouse_id: u32,
    pub items: Vec<StockEntry>,
}

impl StockUpdateItem {
    /// Build the standard single-entry `FIT` stock row
    pub fn fit(sku: String, warehouse_id: u32, count: i64, updated_at: DateTime<Utc>) -> Self {
        Self {
            sku,
            warehouse_id,
            items: vec![StockEntry {
                count,
                kind: "FIT".to_string(),
                updated_at,
            }],
        }
    }
}

/// Quantity entry inside a stock row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockEntry {
    pub count: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub updated_at: DateTime<Utc>,
}

/// Response from the marketplace after a stock push
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockPushResponse {
    #[serde(default)]
    pub accepted: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}
