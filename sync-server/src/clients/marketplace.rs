//! Marketplace HTTP client

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use shared::ApiError;
use shared::marketplace::{
    MarketplaceOrder, OrderStatus, OrdersResponse, StockPushResponse, StockUpdateItem,
};

use super::{decode_json, http_client, transport_error};

/// Hard cap of the marketplace stock endpoint per call
pub const MAX_STOCK_BATCH: usize = 2000;

/// Operations the engine needs from the downstream marketplace
#[async_trait]
pub trait MarketplaceApi: Send + Sync {
    /// Orders currently in the given status
    async fn orders(&self, status: OrderStatus) -> Result<Vec<MarketplaceOrder>, ApiError>;

    /// Push stock rows; implementations must respect [`MAX_STOCK_BATCH`]
    async fn push_stock_batch(
        &self,
        items: &[StockUpdateItem],
    ) -> Result<StockPushResponse, ApiError>;
}

#[derive(Serialize)]
struct StockPushRequest<'a> {
    stocks: &'a [StockUpdateItem],
}

/// reqwest-backed client against the Marketplace REST API
pub struct MarketplaceClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl MarketplaceClient {
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
impl MarketplaceApi for MarketplaceClient {
    async fn orders(&self, status: OrderStatus) -> Result<Vec<MarketplaceOrder>, ApiError> {
        let url = format!("{}/api/orders", self.base_url);
        let response = self
            .request(self.client.get(&url))
            .query(&[("status", status.as_query())])
            .send()
            .await
            .map_err(|e| transport_error(e, "marketplace order poll"))?;
        let body: OrdersResponse = decode_json(response, "marketplace order poll").await?;
        Ok(body.orders)
    }

    async fn push_stock_batch(
        &self,
        items: &[StockUpdateItem],
    ) -> Result<StockPushResponse, ApiError> {
        let url = format!("{}/api/stocks", self.base_url);
        let mut total = StockPushResponse::default();

        // The endpoint caps one call at MAX_STOCK_BATCH rows
        for chunk in items.chunks(MAX_STOCK_BATCH) {
            let response = self
                .request(self.client.post(&url))
                .json(&StockPushRequest { stocks: chunk })
                .send()
                .await
                .map_err(|e| transport_error(e, "marketplace stock push"))?;
            let part: StockPushResponse = decode_json(response, "marketplace stock push").await?;
            total.accepted += part.accepted;
            total.errors.extend(part.errors);
        }

        Ok(total)
    }
}
