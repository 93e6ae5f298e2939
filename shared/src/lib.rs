//! Shared types for the marketplace synchronization service
//!
//! Common types used by the sync-server binary (and any future sibling
//! tooling): mapping file formats, marketplace and inventory wire types,
//! sweep statistics, the unified error taxonomy, and small time utilities.

pub mod error;
pub mod inventory;
pub mod mapping;
pub mod marketplace;
pub mod stats;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{ApiError, ApiErrorKind, SyncError, SyncResult};
pub use mapping::{MappingFile, OrderMappingEntry, OrderMappingFile};
pub use stats::{OrderSyncStats, SyncStats};
