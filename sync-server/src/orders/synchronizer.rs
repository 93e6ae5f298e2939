//! Order synchronizer: marketplace orders into Inventory, shipments back
//!
//! State machine per order, driven by the external status:
//!
//! ```text
//! PROCESSING --(poll, translate, create)--> created in Inventory
//! created    --(poll, SHIPPED/DELIVERED, create shipment)--> shipped
//! ```
//!
//! Line items with no mapping are dropped individually; an order whose items
//! are ALL unmapped fails as a whole and is re-offered on the next poll.
//! Per-order failures never abort the pass.

use std::sync::{Arc, RwLock};

use chrono::Utc;
use dashmap::DashSet;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use shared::inventory::{InventoryOrderRequest, OrderPosition, ShipmentRequest};
use shared::marketplace::{MarketplaceOrder, OrderStatus};
use shared::{ApiError, OrderSyncStats, SyncError, SyncResult};

use crate::clients::retry::{self, RetryConfig};
use crate::clients::{InventoryApi, MarketplaceApi};
use crate::mapping::Mapper;

pub struct OrderSynchronizer {
    mapper: Arc<Mapper>,
    inventory: Arc<dyn InventoryApi>,
    marketplace: Arc<dyn MarketplaceApi>,
    retry: RetryConfig,
    /// External order ids already created in Inventory this process
    /// lifetime. Best effort only, NOT durable across restarts; the order
    /// mapping store is the authoritative record. Cleared by admin action.
    processed: DashSet<String>,
    /// External order ids whose shipment was already propagated
    shipped: DashSet<String>,
    last_poll: RwLock<Option<OrderSyncStats>>,
    last_shipped: RwLock<Option<OrderSyncStats>>,
}

impl OrderSynchronizer {
    pub fn new(
        mapper: Arc<Mapper>,
        inventory: Arc<dyn InventoryApi>,
        marketplace: Arc<dyn MarketplaceApi>,
    ) -> Self {
        Self {
            mapper,
            inventory,
            marketplace,
            retry: RetryConfig::ORDER_POLL,
            processed: DashSet::new(),
            shipped: DashSet::new(),
            last_poll: RwLock::new(None),
            last_shipped: RwLock::new(None),
        }
    }

    /// Poll `PROCESSING` orders and create the new ones in Inventory.
    pub async fn poll_and_process(&self) -> SyncResult<OrderSyncStats> {
        let orders = self.fetch_orders(OrderStatus::Processing).await?;
        tracing::info!(count = orders.len(), "polled processing orders");

        let mut stats = OrderSyncStats::default();
        for order in &orders {
            if self.processed.contains(&order.order_id) {
                tracing::debug!(order_id = %order.order_id, "order already processed, skipping");
                continue;
            }
            match self.process_order(order).await {
                Ok(internal_order_id) => {
                    self.processed.insert(order.order_id.clone());
                    stats.record_success();
                    tracing::info!(
                        external_order_id = %order.order_id,
                        internal_order_id = %internal_order_id,
                        "order created in inventory"
                    );
                }
                Err(e) => {
                    tracing::warn!(order_id = %order.order_id, error = %e, "order processing failed");
                    stats.record_failure(format!("{}: {e}", order.order_id));
                }
            }
        }

        if let Ok(mut last) = self.last_poll.write() {
            *last = Some(stats.clone());
        }
        Ok(stats)
    }

    /// Translate one order and create it in Inventory.
    ///
    /// Returns the internal order id; persists the order mapping before
    /// returning so a later shipment can find its target.
    async fn process_order(&self, order: &MarketplaceOrder) -> SyncResult<String> {
        let mut positions = Vec::with_capacity(order.line_items.len());
        for item in &order.line_items {
            let Some(product_id) = self.mapper.external_to_internal(&item.sku) else {
                tracing::warn!(
                    order_id = %order.order_id,
                    sku = %item.sku,
                    "dropping line item, sku is unmapped"
                );
                continue;
            };
            positions.push(OrderPosition {
                product_id,
                quantity: item.quantity,
                unit_price_minor: to_minor_units(item.unit_price)?,
            });
        }

        if positions.is_empty() {
            return Err(SyncError::UnmappableOrder {
                external_order_id: order.order_id.clone(),
            });
        }

        let request = InventoryOrderRequest {
            external_reference: order.order_id.clone(),
            positions,
            reserve_stock: true,
            buyer: order.buyer.clone(),
            shipping_address: order.shipping_address.clone(),
        };
        let created = self.inventory.create_order(&request).await?;
        self.mapper
            .save_order_mapping(&order.order_id, &created.order_id)
            .await?;
        Ok(created.order_id)
    }

    /// Propagate shipments for orders the marketplace reports as shipped
    /// or delivered.
    pub async fn process_shipped(&self) -> SyncResult<OrderSyncStats> {
        let mut orders = self.fetch_orders(OrderStatus::Shipped).await?;
        // Orders can jump straight to DELIVERED between two polls
        let delivered = self.fetch_orders(OrderStatus::Delivered).await?;
        for order in delivered {
            if !orders.iter().any(|o| o.order_id == order.order_id) {
                orders.push(order);
            }
        }
        tracing::info!(count = orders.len(), "polled shipped orders");

        let mut stats = OrderSyncStats::default();
        for order in &orders {
            if self.shipped.contains(&order.order_id) {
                tracing::debug!(order_id = %order.order_id, "shipment already propagated, skipping");
                continue;
            }
            match self.ship_order(order).await {
                Ok(()) => {
                    self.shipped.insert(order.order_id.clone());
                    stats.record_success();
                }
                Err(e) => {
                    tracing::warn!(order_id = %order.order_id, error = %e, "shipment propagation failed");
                    stats.record_failure(format!("{}: {e}", order.order_id));
                }
            }
        }

        if let Ok(mut last) = self.last_shipped.write() {
            *last = Some(stats.clone());
        }
        Ok(stats)
    }

    /// Status-filtered poll through the shared retry policy
    async fn fetch_orders(&self, status: OrderStatus) -> SyncResult<Vec<MarketplaceOrder>> {
        let marketplace = &self.marketplace;
        let orders = retry::execute(self.retry, || fetch_status(marketplace, status)).await?;
        Ok(orders)
    }

    async fn ship_order(&self, order: &MarketplaceOrder) -> SyncResult<()> {
        // A missing mapping means the order was never successfully created
        // upstream; per-order failure, not fatal.
        let Some(internal_order_id) = self.mapper.internal_order_id(&order.order_id) else {
            return Err(SyncError::Validation(format!(
                "no order mapping for {}, order was never created in inventory",
                order.order_id
            )));
        };

        let request = ShipmentRequest {
            order_id: internal_order_id.clone(),
            tracking_number: None,
            shipped_at: Utc::now(),
        };
        match self.inventory.create_shipment(&request).await {
            Ok(shipment) => {
                tracing::info!(
                    external_order_id = %order.order_id,
                    internal_order_id = %internal_order_id,
                    shipment_id = %shipment.shipment_id,
                    "shipment created in inventory"
                );
                Ok(())
            }
            // Already shipped upstream, treat as success
            Err(e) if e.status == Some(409) => {
                tracing::debug!(
                    external_order_id = %order.order_id,
                    "shipment already exists in inventory"
                );
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Administrative reset of the in-memory de-dup sets.
    ///
    /// Returns how many (processed, shipped) markers were dropped.
    pub fn clear_processed(&self) -> (usize, usize) {
        let processed = self.processed.len();
        let shipped = self.shipped.len();
        self.processed.clear();
        self.shipped.clear();
        (processed, shipped)
    }

    pub fn last_poll(&self) -> Option<OrderSyncStats> {
        self.last_poll.read().ok().and_then(|s| s.clone())
    }

    pub fn last_shipped(&self) -> Option<OrderSyncStats> {
        self.last_shipped.read().ok().and_then(|s| s.clone())
    }
}

/// One retryable poll attempt; the retry executor calls this repeatedly
async fn fetch_status(
    marketplace: &Arc<dyn MarketplaceApi>,
    status: OrderStatus,
) -> Result<Vec<MarketplaceOrder>, ApiError> {
    marketplace.orders(status).await
}

/// Convert a major-unit price (e.g. 19.99) into exact minor units (1999).
///
/// Fails for negative prices and for prices carrying sub-minor-unit
/// precision; rounding is never applied.
pub fn to_minor_units(price: Decimal) -> SyncResult<i64> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(SyncError::Validation(format!(
            "price must be non-negative, got {price}"
        )));
    }
    let minor = price * Decimal::from(100);
    if !minor.fract().is_zero() {
        return Err(SyncError::Validation(format!(
            "price {price} has sub-minor-unit precision"
        )));
    }
    minor.to_i64().ok_or_else(|| {
        SyncError::Validation(format!("price {price} overflows minor unit range"))
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use shared::ApiError;
    use shared::inventory::{CreatedOrder, CreatedShipment, StockLevel};
    use shared::marketplace::{MarketplaceLineItem, StockPushResponse, StockUpdateItem};

    use super::*;
    use crate::mapping::{MappingStore, OrderMappingStore};

    #[derive(Default)]
    struct MockInventory {
        created: Mutex<Vec<InventoryOrderRequest>>,
        shipments: Mutex<Vec<ShipmentRequest>>,
        next_order_id: AtomicU32,
        fail_create: bool,
        shipment_conflict: bool,
    }

    #[async_trait]
    impl InventoryApi for MockInventory {
        async fn stock_level(&self, _product_id: &str) -> Result<StockLevel, ApiError> {
            unimplemented!("not used by order tests")
        }

        async fn create_order(
            &self,
            request: &InventoryOrderRequest,
        ) -> Result<CreatedOrder, ApiError> {
            if self.fail_create {
                return Err(ApiError::from_status(500, "order creation exploded"));
            }
            self.created.lock().unwrap().push(request.clone());
            let n = self.next_order_id.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(CreatedOrder {
                order_id: format!("SO-{n}"),
            })
        }

        async fn create_shipment(
            &self,
            request: &ShipmentRequest,
        ) -> Result<CreatedShipment, ApiError> {
            if self.shipment_conflict {
                return Err(ApiError::from_status(409, "shipment already exists"));
            }
            self.shipments.lock().unwrap().push(request.clone());
            Ok(CreatedShipment {
                shipment_id: format!("SH-{}", request.order_id),
            })
        }
    }

    #[derive(Default)]
    struct MockMarketplace {
        processing: Vec<MarketplaceOrder>,
        shipped: Vec<MarketplaceOrder>,
        delivered: Vec<MarketplaceOrder>,
    }

    #[async_trait]
    impl MarketplaceApi for MockMarketplace {
        async fn orders(&self, status: OrderStatus) -> Result<Vec<MarketplaceOrder>, ApiError> {
            Ok(match status {
                OrderStatus::Processing => self.processing.clone(),
                OrderStatus::Shipped => self.shipped.clone(),
                OrderStatus::Delivered => self.delivered.clone(),
                _ => Vec::new(),
            })
        }

        async fn push_stock_batch(
            &self,
            _items: &[StockUpdateItem],
        ) -> Result<StockPushResponse, ApiError> {
            Ok(StockPushResponse::default())
        }
    }

    fn order(id: &str, status: OrderStatus, items: &[(&str, u32, &str)]) -> MarketplaceOrder {
        MarketplaceOrder {
            order_id: id.to_string(),
            status,
            line_items: items
                .iter()
                .map(|(sku, quantity, price)| MarketplaceLineItem {
                    sku: sku.to_string(),
                    quantity: *quantity,
                    unit_price: price.parse().unwrap(),
                })
                .collect(),
            buyer: None,
            shipping_address: None,
            created_at: None,
        }
    }

    async fn mapper_with(mappings: &[(&str, &str)]) -> (tempfile::TempDir, Arc<Mapper>) {
        let dir = tempfile::tempdir().unwrap();
        let products = MappingStore::new(dir.path().join("product_mappings.json"));
        let orders = OrderMappingStore::new(dir.path().join("order_mappings.json"));
        let table: BTreeMap<String, String> = mappings
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        products.save(&table).await.unwrap();
        let mapper = Mapper::new(products, orders);
        mapper.load_mappings().await.unwrap();
        (dir, Arc::new(mapper))
    }

    #[tokio::test]
    async fn unmapped_line_items_are_dropped_individually() {
        let (_dir, mapper) = mapper_with(&[("P1", "OFF1"), ("P2", "OFF2")]).await;
        let inventory = Arc::new(MockInventory::default());
        let marketplace = Arc::new(MockMarketplace {
            processing: vec![order(
                "MP-1",
                OrderStatus::Processing,
                &[("OFF1", 2, "19.99"), ("OFF2", 1, "5.00"), ("OFF-UNKNOWN", 1, "1.00")],
            )],
            ..Default::default()
        });
        let sync = OrderSynchronizer::new(mapper.clone(), inventory.clone(), marketplace);

        let stats = sync.poll_and_process().await.unwrap();
        assert_eq!(stats.processed, 1);
        assert_eq!(stats.successful, 1);
        assert!(stats.is_complete());

        let created = inventory.created.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].positions.len(), 2);
        assert_eq!(created[0].positions[0].product_id, "P1");
        assert_eq!(created[0].positions[0].unit_price_minor, 1999);
        assert!(created[0].reserve_stock);

        // Order mapping was persisted for the shipment pass
        assert_eq!(mapper.internal_order_id("MP-1").as_deref(), Some("SO-1"));
    }

    #[tokio::test]
    async fn fully_unmapped_order_fails_and_is_reoffered() {
        let (_dir, mapper) = mapper_with(&[("P1", "OFF1")]).await;
        let inventory = Arc::new(MockInventory::default());
        let marketplace = Arc::new(MockMarketplace {
            processing: vec![order(
                "MP-2",
                OrderStatus::Processing,
                &[("OFF-A", 1, "1.00"), ("OFF-B", 2, "2.00")],
            )],
            ..Default::default()
        });
        let sync = OrderSynchronizer::new(mapper.clone(), inventory.clone(), marketplace);

        let stats = sync.poll_and_process().await.unwrap();
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.successful, 0);
        assert!(inventory.created.lock().unwrap().is_empty());
        assert_eq!(mapper.internal_order_id("MP-2"), None);

        // Not marked processed: the next poll attempts the order again
        let stats = sync.poll_and_process().await.unwrap();
        assert_eq!(stats.failed, 1);
    }

    #[tokio::test]
    async fn processed_orders_are_deduplicated_within_a_lifetime() {
        let (_dir, mapper) = mapper_with(&[("P1", "OFF1")]).await;
        let inventory = Arc::new(MockInventory::default());
        let marketplace = Arc::new(MockMarketplace {
            processing: vec![order("MP-3", OrderStatus::Processing, &[("OFF1", 1, "3.50")])],
            ..Default::default()
        });
        let sync = OrderSynchronizer::new(mapper, inventory.clone(), marketplace);

        assert_eq!(sync.poll_and_process().await.unwrap().successful, 1);
        // Second poll re-offers the same order; the de-dup set skips it
        let stats = sync.poll_and_process().await.unwrap();
        assert_eq!(stats.processed, 0);
        assert_eq!(inventory.created.lock().unwrap().len(), 1);

        // Admin reset drops the marker
        let (processed, _) = sync.clear_processed();
        assert_eq!(processed, 1);
        sync.poll_and_process().await.unwrap();
        assert_eq!(inventory.created.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn per_order_failures_do_not_abort_the_pass() {
        let (_dir, mapper) = mapper_with(&[("P1", "OFF1")]).await;
        let inventory = Arc::new(MockInventory::default());
        let marketplace = Arc::new(MockMarketplace {
            processing: vec![
                order("MP-4", OrderStatus::Processing, &[("OFF-UNKNOWN", 1, "1.00")]),
                order("MP-5", OrderStatus::Processing, &[("OFF1", 1, "2.00")]),
            ],
            ..Default::default()
        });
        let sync = OrderSynchronizer::new(mapper, inventory.clone(), marketplace);

        let stats = sync.poll_and_process().await.unwrap();
        assert_eq!(stats.processed, 2);
        assert_eq!(stats.successful, 1);
        assert_eq!(stats.failed, 1);
        assert!(stats.errors[0].starts_with("MP-4:"));
        assert_eq!(inventory.created.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn shipment_references_the_mapped_inventory_order() {
        let (_dir, mapper) = mapper_with(&[]).await;
        mapper.save_order_mapping("MP-6", "SO-600").await.unwrap();

        let inventory = Arc::new(MockInventory::default());
        let marketplace = Arc::new(MockMarketplace {
            shipped: vec![order("MP-6", OrderStatus::Shipped, &[])],
            ..Default::default()
        });
        let sync = OrderSynchronizer::new(mapper, inventory.clone(), marketplace);

        let stats = sync.process_shipped().await.unwrap();
        assert_eq!(stats.successful, 1);

        let shipments = inventory.shipments.lock().unwrap();
        assert_eq!(shipments.len(), 1);
        assert_eq!(shipments[0].order_id, "SO-600");
    }

    #[tokio::test]
    async fn shipment_without_mapping_is_a_per_order_failure() {
        let (_dir, mapper) = mapper_with(&[]).await;
        let inventory = Arc::new(MockInventory::default());
        let marketplace = Arc::new(MockMarketplace {
            shipped: vec![order("MP-7", OrderStatus::Shipped, &[])],
            ..Default::default()
        });
        let sync = OrderSynchronizer::new(mapper, inventory.clone(), marketplace);

        let stats = sync.process_shipped().await.unwrap();
        assert_eq!(stats.failed, 1);
        assert!(stats.errors[0].contains("no order mapping"));
        assert!(inventory.shipments.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn existing_shipment_conflict_counts_as_success() {
        let (_dir, mapper) = mapper_with(&[]).await;
        mapper.save_order_mapping("MP-8", "SO-800").await.unwrap();

        let inventory = Arc::new(MockInventory {
            shipment_conflict: true,
            ..Default::default()
        });
        let marketplace = Arc::new(MockMarketplace {
            shipped: vec![order("MP-8", OrderStatus::Shipped, &[])],
            ..Default::default()
        });
        let sync = OrderSynchronizer::new(mapper, inventory, marketplace);

        let stats = sync.process_shipped().await.unwrap();
        assert_eq!(stats.successful, 1);
        assert_eq!(stats.failed, 0);
    }

    #[tokio::test]
    async fn delivered_orders_are_shipped_too() {
        let (_dir, mapper) = mapper_with(&[]).await;
        mapper.save_order_mapping("MP-9", "SO-900").await.unwrap();

        let inventory = Arc::new(MockInventory::default());
        let marketplace = Arc::new(MockMarketplace {
            delivered: vec![order("MP-9", OrderStatus::Delivered, &[])],
            ..Default::default()
        });
        let sync = OrderSynchronizer::new(mapper, inventory.clone(), marketplace);

        let stats = sync.process_shipped().await.unwrap();
        assert_eq!(stats.successful, 1);
        assert_eq!(inventory.shipments.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn order_without_line_items_is_unmappable() {
        let (_dir, mapper) = mapper_with(&[("P1", "OFF1")]).await;
        let inventory = Arc::new(MockInventory::default());
        let marketplace = Arc::new(MockMarketplace {
            processing: vec![order("MP-10", OrderStatus::Processing, &[])],
            ..Default::default()
        });
        let sync = OrderSynchronizer::new(mapper, inventory, marketplace);

        let stats = sync.poll_and_process().await.unwrap();
        assert_eq!(stats.failed, 1);
        assert!(stats.errors[0].contains("no line item could be mapped"));
    }

    #[test]
    fn minor_unit_conversion_is_exact() {
        assert_eq!(to_minor_units(Decimal::new(1999, 2)).unwrap(), 1999); // 19.99
        assert_eq!(to_minor_units(Decimal::from(10)).unwrap(), 1000);
        assert_eq!(to_minor_units(Decimal::ZERO).unwrap(), 0);
        assert_eq!(to_minor_units(Decimal::new(5, 1)).unwrap(), 50); // 0.50
    }

    #[test]
    fn sub_minor_unit_precision_is_rejected() {
        // 0.333 cannot be expressed in whole cents
        assert!(matches!(
            to_minor_units(Decimal::new(333, 3)).unwrap_err(),
            SyncError::Validation(_)
        ));
        assert!(matches!(
            to_minor_units(Decimal::new(-100, 2)).unwrap_err(),
            SyncError::Validation(_)
        ));
    }
}
