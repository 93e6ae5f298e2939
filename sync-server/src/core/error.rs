//! Server-level error type

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

/// Errors that can take the server down (startup and serve paths only;
/// sweep-internal failures are isolated and never reach this type)
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Sync(#[from] shared::SyncError),
}
