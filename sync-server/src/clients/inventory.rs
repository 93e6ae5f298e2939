//! Inventory (ERP) HTTP client

use std::time::Duration;

use async_trait::async_trait;
use shared::ApiError;
use shared::inventory::{
    CreatedOrder, CreatedShipment, InventoryOrderRequest, ShipmentRequest, StockLevel,
};

use super::{decode_json, http_client, transport_error};

/// Operations the engine needs from the upstream inventory system
#[async_trait]
pub trait InventoryApi: Send + Sync {
    /// Current stock level of one product
    async fn stock_level(&self, product_id: &str) -> Result<StockLevel, ApiError>;

    /// Create a sales order, returning the assigned internal order id
    async fn create_order(&self, request: &InventoryOrderRequest) -> Result<CreatedOrder, ApiError>;

    /// Create a shipment for a previously created order
    async fn create_shipment(
        &self,
        request: &ShipmentRequest,
    ) -> Result<CreatedShipment, ApiError>;
}

/// reqwest-backed client against the Inventory REST API
pub struct InventoryClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl InventoryClient {
    pub fn new(
        base_url: String,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

#[async_trait]
impl InventoryApi for InventoryClient {
    async fn stock_level(&self, product_id: &str) -> Result<StockLevel, ApiError> {
        let url = format!("{}/api/products/{product_id}/stock", self.base_url);
        let response = self
            .request(self.client.get(&url))
            .send()
            .await
            .map_err(|e| transport_error(e, "inventory stock lookup"))?;
        decode_json(response, "inventory stock lookup").await
    }

    async fn create_order(
        &self,
        request: &InventoryOrderRequest,
    ) -> Result<CreatedOrder, ApiError> {
        let url = format!("{}/api/sales-orders", self.base_url);
        let response = self
            .request(self.client.post(&url))
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error(e, "inventory order creation"))?;
        decode_json(response, "inventory order creation").await
    }

    async fn create_shipment(
        &self,
        request: &ShipmentRequest,
    ) -> Result<CreatedShipment, ApiError> {
        let url = format!("{}/api/shipments", self.base_url);
        let response = self
            .request(self.client.post(&url))
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error(e, "inventory shipment creation"))?;
        decode_json(response, "inventory shipment creation").await
    }
}
