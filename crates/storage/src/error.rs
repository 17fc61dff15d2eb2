//! Storage error types.

use thiserror::Error;

/// Errors surfaced by a persistence adapter.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing store rejected or failed the operation.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Convenience type alias for storage results.
pub type Result<T> = std::result::Result<T, StorageError>;
