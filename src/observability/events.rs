//! Block lifecycle events
//!
//! Explicit, typed events covering the edges of a block's life: open,
//! completion, verification, and corruption detection. Hot read paths emit
//! nothing.

use std::fmt;

/// Observable block events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockEvent {
    /// Block handle opened (metadata and index loaded)
    BlockOpened,
    /// Block written and sealed
    BlockCompleted,
    /// Full-object checksum verification passed
    VerifyPassed,
    /// Full-object checksum verification failed
    VerifyFailed,
    /// Corrupt metadata, index, or page detected
    CorruptionDetected,
}

impl BlockEvent {
    /// Event name as logged
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockEvent::BlockOpened => "BLOCK_OPENED",
            BlockEvent::BlockCompleted => "BLOCK_COMPLETED",
            BlockEvent::VerifyPassed => "BLOCK_VERIFY_PASSED",
            BlockEvent::VerifyFailed => "BLOCK_VERIFY_FAILED",
            BlockEvent::CorruptionDetected => "BLOCK_CORRUPTION",
        }
    }

    /// True for events that report damaged on-disk state
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            BlockEvent::VerifyFailed | BlockEvent::CorruptionDetected
        )
    }
}

impl fmt::Display for BlockEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
