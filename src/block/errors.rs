//! # Block Errors

use thiserror::Error;
use uuid::Uuid;

use crate::backend::BackendError;

use super::record::TraceId;

/// Result type for block operations
pub type BlockResult<T> = Result<T, BlockError>;

/// Block read and write errors
#[derive(Debug, Clone, Error)]
pub enum BlockError {
    // Open errors
    #[error("Block not found: {tenant}/{block_id}")]
    NotFound { tenant: String, block_id: Uuid },

    #[error("Corrupt metadata for {tenant}/{block_id}: {reason}")]
    CorruptMeta {
        tenant: String,
        block_id: Uuid,
        reason: String,
    },

    #[error("Unsupported block version: {found}")]
    UnsupportedVersion { found: String },

    // Decode errors
    #[error("Corrupt page at offset {offset}: {reason}")]
    CorruptPage { offset: u64, reason: String },

    #[error("Corrupt record index: {reason}")]
    CorruptIndex { reason: String },

    #[error("Checksum mismatch on object {name}")]
    ChecksumMismatch { name: String },

    // Write errors
    #[error("Record {id} appended out of ascending id order")]
    OutOfOrder { id: TraceId },

    #[error("Frame too large: {size} bytes exceeds u32 framing")]
    FrameTooLarge { size: u64 },

    #[error("Compression failed: {reason}")]
    CompressionFailed { reason: String },

    // Transport
    #[error("Backend error: {0}")]
    Backend(BackendError),

    #[error("Operation canceled")]
    Canceled,

    #[error("Operation timed out")]
    TimedOut,
}

impl From<BackendError> for BlockError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Canceled => BlockError::Canceled,
            BackendError::TimedOut => BlockError::TimedOut,
            other => BlockError::Backend(other),
        }
    }
}

impl BlockError {
    /// True for errors that mean stored bytes cannot be trusted
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            BlockError::CorruptMeta { .. }
                | BlockError::CorruptPage { .. }
                | BlockError::CorruptIndex { .. }
                | BlockError::ChecksumMismatch { .. }
        )
    }

    /// True for cancellation and deadline errors
    pub fn is_cancellation(&self) -> bool {
        matches!(self, BlockError::Canceled | BlockError::TimedOut)
    }
}
