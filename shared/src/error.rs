//! Unified error system for the synchronization service
//!
//! Two layers:
//!
//! - [`ApiError`]: a failed call against one of the two external platforms,
//!   classified as transient (retryable) or permanent.
//! - [`SyncError`]: everything the engine itself can fail with: store I/O,
//!   corrupt files, lock timeouts, validation, and order translation.
//!
//! A mapping lookup miss is deliberately NOT an error anywhere in this
//! taxonomy; it is represented as `Option::None` by the callers.

use std::time::Duration;

use thiserror::Error;

/// Result alias used throughout the engine
pub type SyncResult<T> = Result<T, SyncError>;

/// Application-level error type for the synchronization engine
#[derive(Debug, Error)]
pub enum SyncError {
    // ========== Store Errors ==========
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt store file {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("mapping store queried before load()")]
    StoreNotLoaded,

    #[error("timed out after {timeout_ms}ms waiting for lock on {path}")]
    LockTimeout { path: String, timeout_ms: u64 },

    // ========== Business Errors ==========
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("order {external_order_id}: no line item could be mapped")]
    UnmappableOrder { external_order_id: String },

    // ========== External Platform Errors ==========
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl SyncError {
    /// Shorthand for a [`SyncError::Parse`] with a displayable reason
    pub fn parse(path: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Classification of an external API failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// 429, 5xx, or a transport-level failure
    Transient,
    /// Any other 4xx or a malformed response
    Permanent,
}

/// A failed call against Inventory or Marketplace
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    /// HTTP status, when the failure came from a response
    pub status: Option<u16>,
    /// Server-requested delay from a `Retry-After` header (429 only)
    pub retry_after: Option<Duration>,
    pub message: String,
}

impl ApiError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Transient,
            status: None,
            retry_after: None,
            message: message.into(),
        }
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Permanent,
            status: None,
            retry_after: None,
            message: message.into(),
        }
    }

    /// Classify a non-success HTTP status
    ///
    /// 429 and 5xx are transient, everything else is permanent.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let kind = if status == 429 || status >= 500 {
            ApiErrorKind::Transient
        } else {
            ApiErrorKind::Permanent
        };
        Self {
            kind,
            status: Some(status),
            retry_after: None,
            message: message.into(),
        }
    }

    /// Attach a server-requested retry delay
    pub fn with_retry_after(mut self, delay: Duration) -> Self {
        self.retry_after = Some(delay);
        self
    }

    pub fn is_transient(&self) -> bool {
        self.kind == ApiErrorKind::Transient
    }
}
