//! Mapping file formats
//!
//! Two JSON files persist the identifier translation state:
//!
//! - the product mapping table: `{ version, lastUpdated, mappings: { internalId: externalId } }`
//! - the order mapping log: `{ mappings: [ { externalOrderId, internalOrderId, createdAt, updatedAt? } ] }`
//!
//! The product table is a map because it is replaced wholesale on every save;
//! the order log is an array so upserts can scan in insertion order.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Schema version written into every product mapping file
pub const MAPPING_FILE_VERSION: &str = "1.0";

/// On-disk representation of the product mapping table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingFile {
    pub version: String,
    pub last_updated: DateTime<Utc>,
    /// internalId → externalId
    pub mappings: BTreeMap<String, String>,
}

impl MappingFile {
    /// Empty, schema-valid file (written when no file exists yet)
    pub fn empty() -> Self {
        Self::with_mappings(BTreeMap::new())
    }

    pub fn with_mappings(mappings: BTreeMap<String, String>) -> Self {
        Self {
            version: MAPPING_FILE_VERSION.to_string(),
            last_updated: Utc::now(),
            mappings,
        }
    }
}

/// On-disk representation of the order mapping log
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderMappingFile {
    #[serde(default)]
    pub mappings: Vec<OrderMappingEntry>,
}

/// One external-order → internal-order association
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderMappingEntry {
    pub external_order_id: String,
    pub internal_order_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}
