//! # Cancellation Token
//!
//! Cooperative cancellation handle threaded through every operation that
//! touches storage. Clones share one cancel flag; an optional deadline turns
//! the token into a timeout as well. Backends call [`CancelToken::check`]
//! before performing I/O, so a canceled caller never starts a new fetch.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::errors::{BackendError, BackendResult};

/// Cancellation and deadline handle for in-flight operations
#[derive(Debug, Clone)]
pub struct CancelToken {
    canceled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    /// Create a token that never expires
    pub fn new() -> Self {
        Self {
            canceled: Arc::new(AtomicBool::new(false)),
            deadline: None,
        }
    }

    /// Create a token that expires after `timeout`
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            canceled: Arc::new(AtomicBool::new(false)),
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// Cancel the operation; observed by every clone of this token
    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
    }

    /// Whether `cancel` has been called on this token or a clone
    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }

    /// Whether the deadline, if any, has passed
    pub fn deadline_exceeded(&self) -> bool {
        match self.deadline {
            Some(deadline) => Instant::now() >= deadline,
            None => false,
        }
    }

    /// Fail fast if the token is canceled or expired
    ///
    /// Cancellation takes precedence over the deadline so that an explicit
    /// `cancel` is always reported as `Canceled`.
    pub fn check(&self) -> BackendResult<()> {
        if self.is_canceled() {
            return Err(BackendError::Canceled);
        }
        if self.deadline_exceeded() {
            return Err(BackendError::TimedOut);
        }
        Ok(())
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
