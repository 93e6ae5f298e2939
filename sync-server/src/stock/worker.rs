//! Periodic stock reconciliation worker
//!
//! Runs one sweep on startup, then one per configured interval. The sweep is
//! awaited inline in the tick loop, so two sweeps never overlap; a tick that
//! fires while a sweep is still running is delayed, not stacked.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::synchronizer::StockSynchronizer;

pub struct StockSweepWorker {
    sync: Arc<StockSynchronizer>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl StockSweepWorker {
    pub fn new(
        sync: Arc<StockSynchronizer>,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            sync,
            interval,
            shutdown,
        }
    }

    pub async fn run(self) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "stock sweep worker started"
        );

        // Reconcile once on startup before settling into the interval
        if let Err(e) = self.sync.full_sweep().await {
            tracing::error!(error = %e, "initial stock sweep failed");
        }

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await; // skip immediate tick

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::info!("stock sweep worker shutting down");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.sync.full_sweep().await {
                        tracing::error!(error = %e, "periodic stock sweep failed");
                    }
                }
            }
        }

        tracing::info!("stock sweep worker stopped");
    }
}
