//! # Observability
//!
//! Structured JSON logging for block lifecycle events.
//!
//! # Principles
//!
//! 1. Observability is read-only, no side effects on block operations
//! 2. No async or background threads
//! 3. Deterministic output (sorted fields, one line per event)
//! 4. Lifecycle edges only; `find` and iteration emit nothing
//!
//! # Usage
//!
//! ```ignore
//! use tracestore::observability::{log_event, BlockEvent};
//!
//! log_event(BlockEvent::BlockOpened, &[("tenant", "acme"), ("records", "42")]);
//! ```

mod events;
mod logger;

pub use events::BlockEvent;
pub use logger::{Logger, Severity};

/// Log a lifecycle event with fields
///
/// Failure events are logged at WARN, everything else at INFO.
pub fn log_event(event: BlockEvent, fields: &[(&str, &str)]) {
    if event.is_failure() {
        Logger::warn(event.as_str(), fields);
    } else {
        Logger::info(event.as_str(), fields);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event_does_not_panic() {
        log_event(BlockEvent::BlockOpened, &[("tenant", "acme")]);
        log_event(BlockEvent::CorruptionDetected, &[("detail", "bad frame")]);
    }
}
