//! Unified lookup façade
//!
//! Thin façade over [`MappingStore`] and [`OrderMappingStore`]. Lookup of an
//! absent key is not an error condition anywhere on this surface: both
//! directions return `None` and log at debug level, including for blank
//! input. Every lookup additionally bumps a hit/miss counter; the counters
//! are observability only and have no control-flow impact.

use std::collections::BTreeMap;

use dashmap::DashMap;
use shared::SyncResult;
use shared::mapping::OrderMappingEntry;

use super::order_store::OrderMappingStore;
use super::store::MappingStore;

const INTERNAL_TO_EXTERNAL_HIT: &str = "internal_to_external.hit";
const INTERNAL_TO_EXTERNAL_MISS: &str = "internal_to_external.miss";
const EXTERNAL_TO_INTERNAL_HIT: &str = "external_to_internal.hit";
const EXTERNAL_TO_INTERNAL_MISS: &str = "external_to_internal.miss";
const ORDER_LOOKUP_HIT: &str = "order_lookup.hit";
const ORDER_LOOKUP_MISS: &str = "order_lookup.miss";

/// Lock-free hit/miss counters for id lookups
#[derive(Debug, Default)]
pub struct LookupMetrics {
    counters: DashMap<&'static str, u64>,
}

impl LookupMetrics {
    fn record(&self, key: &'static str) {
        *self.counters.entry(key).or_insert(0) += 1;
    }

    /// Point-in-time snapshot, sorted by counter name
    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        self.counters
            .iter()
            .map(|entry| (entry.key().to_string(), *entry.value()))
            .collect()
    }
}

pub struct Mapper {
    products: MappingStore,
    orders: OrderMappingStore,
    metrics: LookupMetrics,
}

impl Mapper {
    pub fn new(products: MappingStore, orders: OrderMappingStore) -> Self {
        Self {
            products,
            orders,
            metrics: LookupMetrics::default(),
        }
    }

    /// (Re)load the product mapping table; propagates store errors
    pub async fn load_mappings(&self) -> SyncResult<usize> {
        self.products.load().await
    }

    /// internal id → external id; `None` for unknown or blank input
    pub fn internal_to_external(&self, internal_id: &str) -> Option<String> {
        if internal_id.trim().is_empty() {
            tracing::debug!("internal→external lookup with blank input");
            self.metrics.record(INTERNAL_TO_EXTERNAL_MISS);
            return None;
        }
        match self.products.external_id(internal_id) {
            Ok(Some(external_id)) => {
                self.metrics.record(INTERNAL_TO_EXTERNAL_HIT);
                Some(external_id)
            }
            Ok(None) => {
                tracing::debug!(internal_id, "no external id mapped");
                self.metrics.record(INTERNAL_TO_EXTERNAL_MISS);
                None
            }
            Err(e) => {
                tracing::warn!(internal_id, error = %e, "internal→external lookup failed");
                self.metrics.record(INTERNAL_TO_EXTERNAL_MISS);
                None
            }
        }
    }

    /// external id → internal id; `None` for unknown or blank input
    pub fn external_to_internal(&self, external_id: &str) -> Option<String> {
        if external_id.trim().is_empty() {
            tracing::debug!("external→internal lookup with blank input");
            self.metrics.record(EXTERNAL_TO_INTERNAL_MISS);
            return None;
        }
        match self.products.internal_id(external_id) {
            Ok(Some(internal_id)) => {
                self.metrics.record(EXTERNAL_TO_INTERNAL_HIT);
                Some(internal_id)
            }
            Ok(None) => {
                tracing::debug!(external_id, "no internal id mapped");
                self.metrics.record(EXTERNAL_TO_INTERNAL_MISS);
                None
            }
            Err(e) => {
                tracing::warn!(external_id, error = %e, "external→internal lookup failed");
                self.metrics.record(EXTERNAL_TO_INTERNAL_MISS);
                None
            }
        }
    }

    /// Persist an external-order → internal-order association
    pub async fn save_order_mapping(
        &self,
        external_order_id: &str,
        internal_order_id: &str,
    ) -> SyncResult<()> {
        self.orders.save(external_order_id, internal_order_id).await
    }

    /// Previously recorded internal order id, if any
    pub fn internal_order_id(&self, external_order_id: &str) -> Option<String> {
        match self.orders.get(external_order_id) {
            Ok(Some(id)) => {
                self.metrics.record(ORDER_LOOKUP_HIT);
                Some(id)
            }
            Ok(None) => {
                tracing::debug!(external_order_id, "no order mapping recorded");
                self.metrics.record(ORDER_LOOKUP_MISS);
                None
            }
            Err(e) => {
                tracing::warn!(external_order_id, error = %e, "order mapping lookup failed");
                self.metrics.record(ORDER_LOOKUP_MISS);
                None
            }
        }
    }

    /// Administrative removal of an order mapping
    pub async fn delete_order_mapping(&self, external_order_id: &str) -> SyncResult<bool> {
        self.orders.delete(external_order_id).await
    }

    pub fn order_mappings(&self) -> SyncResult<Vec<OrderMappingEntry>> {
        self.orders.list()
    }

    /// All internal ids in the loaded table (the sweep universe)
    pub fn internal_ids(&self) -> SyncResult<Vec<String>> {
        self.products.internal_ids()
    }

    /// All external ids in the loaded table
    pub fn external_ids(&self) -> SyncResult<Vec<String>> {
        self.products.external_ids()
    }

    pub fn mapping_count(&self) -> usize {
        self.products.len()
    }

    pub fn is_loaded(&self) -> bool {
        self.products.is_loaded()
    }

    pub fn metrics(&self) -> &LookupMetrics {
        &self.metrics
    }
}
