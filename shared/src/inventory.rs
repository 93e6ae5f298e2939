//! Inventory (ERP) wire types
//!
//! Types spoken by the upstream inventory system: stock levels as we read
//! them, sales orders and shipments as we create them. All identifiers in
//! this module are INTERNAL ids.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stock level of one product as reported by Inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLevel {
    pub on_hand: i64,
    pub reserved: i64,
}

impl StockLevel {
    /// Sellable quantity: on-hand minus reservations, floored at zero
    ///
    /// Oversold situations report negative raw availability; the marketplace
    /// rejects negative counts, so the floor is applied here.
    pub fn available(&self) -> i64 {
        (self.on_hand - self.reserved).max(0)
    }
}

/// Sales order creation request against Inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryOrderRequest {
    /// External order id, kept for traceability on the ERP side
    pub external_reference: String,
    pub positions: Vec<OrderPosition>,
    /// Reserve the ordered quantity on creation
    pub reserve_stock: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<serde_json::Value>,
}

/// One position of an Inventory sales order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPosition {
    /// Internal product id
    pub product_id: String,
    pub quantity: u32,
    /// Unit price in the MINOR currency unit (cents)
    pub unit_price_minor: i64,
}

/// Response after creating a sales order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedOrder {
    pub order_id: String,
}

/// Shipment creation request referencing a previously created order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentRequest {
    /// Internal sales order id
    pub order_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    pub shipped_at: DateTime<Utc>,
}

/// Response after creating a shipment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedShipment {
    pub shipment_id: String,
}
