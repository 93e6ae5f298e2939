//! Periodic order polling worker
//!
//! No webhook exists for new marketplace orders, so polling is the only
//! ingestion path. Each tick runs the processing pass and then the shipment
//! pass, awaited inline so ticks never overlap.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::synchronizer::OrderSynchronizer;

pub struct OrderPollWorker {
    sync: Arc<OrderSynchronizer>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl OrderPollWorker {
    pub fn new(
        sync: Arc<OrderSynchronizer>,
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
            "order poll worker started"
        );

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::info!("order poll worker shutting down");
                    break;
                }
                _ = interval.tick() => {
                    self.run_once().await;
                }
            }
        }

        tracing::info!("order poll worker stopped");
    }

    async fn run_once(&self) {
        match self.sync.poll_and_process().await {
            Ok(stats) => {
                if stats.processed > 0 {
                    tracing::info!(
                        processed = stats.processed,
                        successful = stats.successful,
                        failed = stats.failed,
                        "order poll finished"
                    );
                }
            }
            Err(e) => tracing::error!(error = %e, "order poll failed"),
        }

        match self.sync.process_shipped().await {
            Ok(stats) => {
                if stats.processed > 0 {
                    tracing::info!(
                        processed = stats.processed,
                        successful = stats.successful,
                        failed = stats.failed,
                        "shipment pass finished"
                    );
                }
            }
            Err(e) => tracing::error!(error = %e, "shipment pass failed"),
        }
    }
}
