//! # Backend Errors

use thiserror::Error;
use uuid::Uuid;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Storage backend errors
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("Object not found: {tenant}/{block_id}/{name}")]
    ObjectNotFound {
        tenant: String,
        block_id: Uuid,
        name: String,
    },

    #[error("Range {offset}+{length} out of bounds for {key} ({object_size} bytes)")]
    RangeOutOfBounds {
        key: String,
        offset: u64,
        length: u64,
        object_size: u64,
    },

    #[error("I/O error on {key}: {message}")]
    Io { key: String, message: String },

    #[error("Operation canceled")]
    Canceled,

    #[error("Operation timed out")]
    TimedOut,
}

impl BackendError {
    /// True for cancellation and deadline errors
    pub fn is_cancellation(&self) -> bool {
        matches!(self, BackendError::Canceled | BackendError::TimedOut)
    }
}

/// Object key string used in error context
pub(crate) fn object_key(tenant: &str, block_id: Uuid, name: &str) -> String {
    format!("{}/{}/{}", tenant, block_id, name)
}
