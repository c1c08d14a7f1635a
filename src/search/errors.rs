//! # Tag Table Wire Errors

use thiserror::Error;

/// Result type for tag table decoding
pub type TagWireResult<T> = Result<T, TagWireError>;

/// Tag table decode errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagWireError {
    #[error("Tag table truncated: needed {needed} bytes at offset {offset}")]
    Truncated { offset: usize, needed: usize },

    #[error("Tag table string at offset {offset} is not UTF-8")]
    InvalidUtf8 { offset: usize },

    #[error("Tag table carries {remaining} bytes past its declared entries")]
    TrailingBytes { remaining: usize },
}
