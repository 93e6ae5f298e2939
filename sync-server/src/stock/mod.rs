//! Stock synchronization
//!
//! Webhook-driven incremental pushes plus the periodic full reconciliation
//! sweep that corrects any drift from missed or reordered events.

pub mod synchronizer;
pub mod worker;

pub use synchronizer::{PushOutcome, StockSynchronizer};
pub use worker::StockSweepWorker;
