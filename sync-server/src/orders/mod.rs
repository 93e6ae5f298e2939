//! Order synchronization
//!
//! Poll-based ingestion of marketplace orders into Inventory and shipment
//! propagation back for orders the marketplace reports as shipped.

pub mod synchronizer;
pub mod worker;

pub use synchronizer::OrderSynchronizer;
pub use worker::OrderPollWorker;
