//! Stock synchronizer: internal stock changes into marketplace pushes
//!
//! Two entry points share one core step:
//!
//! - [`StockSynchronizer::handle_webhook_update`] syncs exactly one id and
//!   swallows errors; a lost webhook is corrected by the next sweep.
//! - [`StockSynchronizer::full_sweep`] walks every mapped internal id with
//!   per-item error isolation and reports [`SyncStats`] whose buckets always
//!   add up to the universe size.

use std::sync::{Arc, RwLock};

use chrono::Utc;
use shared::ApiError;
use shared::marketplace::{StockPushResponse, StockUpdateItem};
use shared::{SyncResult, SyncStats};

use crate::clients::retry::{self, RetryConfig};
use crate::clients::{InventoryApi, MarketplaceApi};
use crate::mapping::Mapper;

/// Outcome of the core translate-and-push step for one id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Stock was pushed to the marketplace
    Synced,
    /// No external id is mapped; the sweep counts it as skipped
    SkippedUnmapped,
}

pub struct StockSynchronizer {
    mapper: Arc<Mapper>,
    inventory: Arc<dyn InventoryApi>,
    marketplace: Arc<dyn MarketplaceApi>,
    warehouse_id: u32,
    retry: RetryConfig,
    last_sweep: RwLock<Option<SyncStats>>,
}

impl StockSynchronizer {
    pub fn new(
        mapper: Arc<Mapper>,
        inventory: Arc<dyn InventoryApi>,
        marketplace: Arc<dyn MarketplaceApi>,
        warehouse_id: u32,
    ) -> Self {
        Self {
            mapper,
            inventory,
            marketplace,
            warehouse_id,
            retry: RetryConfig::STOCK_PUSH,
            last_sweep: RwLock::new(None),
        }
    }

    /// Core step: resolve the external id, read current stock from
    /// Inventory, push the available quantity to the marketplace.
    pub async fn push_stock(&self, internal_id: &str) -> SyncResult<PushOutcome> {
        let Some(external_id) = self.mapper.internal_to_external(internal_id) else {
            tracing::debug!(internal_id, "skipping stock push, id is unmapped");
            return Ok(PushOutcome::SkippedUnmapped);
        };

        let stock = self.inventory.stock_level(internal_id).await?;
        let available = stock.available();
        let item =
            StockUpdateItem::fit(external_id.clone(), self.warehouse_id, available, Utc::now());

        let marketplace = &self.marketplace;
        retry::execute(self.retry, || push_single(marketplace, item.clone())).await?;

        tracing::debug!(
            internal_id,
            external_id = %external_id,
            count = available,
            "stock pushed"
        );
        Ok(PushOutcome::Synced)
    }

    /// Webhook path: one id, errors logged and swallowed.
    ///
    /// The webhook caller has already been answered; correctness is
    /// guaranteed by the periodic sweep, not by this call.
    pub async fn handle_webhook_update(&self, internal_id: &str) {
        match self.push_stock(internal_id).await {
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(
                    internal_id,
                    error = %e,
                    "webhook stock update failed, next sweep will reconcile"
                );
            }
        }
    }

    /// Full reconciliation sweep over every mapped internal id.
    ///
    /// Items run sequentially; one item's failure lands in `errors` and the
    /// sweep continues. Fails as a whole only when the id universe itself
    /// is unavailable.
    pub async fn full_sweep(&self) -> SyncResult<SyncStats> {
        let ids = self.mapper.internal_ids()?;
        tracing::info!(total = ids.len(), "starting stock sweep");

        let mut stats = SyncStats::default();
        for internal_id in &ids {
            match self.push_stock(internal_id).await {
                Ok(PushOutcome::Synced) => stats.record_synced(),
                Ok(PushOutcome::SkippedUnmapped) => stats.record_skipped(),
                Err(e) => {
                    tracing::warn!(internal_id = %internal_id, error = %e, "stock sweep item failed");
                    stats.record_error(format!("{internal_id}: {e}"));
                }
            }
        }

        tracing::info!(
            total = stats.total,
            synced = stats.synced,
            skipped = stats.skipped,
            errors = stats.errors.len(),
            "stock sweep finished"
        );
        if let Ok(mut last) = self.last_sweep.write() {
            *last = Some(stats.clone());
        }
        Ok(stats)
    }

    /// Stats of the most recent completed sweep
    pub fn last_sweep(&self) -> Option<SyncStats> {
        self.last_sweep.read().ok().and_then(|s| s.clone())
    }
}

/// One retryable push attempt; the retry executor calls this repeatedly
async fn push_single(
    marketplace: &Arc<dyn MarketplaceApi>,
    item: StockUpdateItem,
) -> Result<StockPushResponse, ApiError> {
    marketplace
        .push_stock_batch(std::slice::from_ref(&item))
        .await
}
