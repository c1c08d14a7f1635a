//! # Tag Value Index
//!
//! Per-trace map from tag key to the set of distinct values observed for
//! that key, serialized into search query responses. Two storage
//! strategies implement one contract:
//!
//! - [`SmallTagValueMap`]: linear vectors, minimal overhead for the common
//!   low-cardinality trace
//! - [`LargeTagValueMap`]: hash sets, constant-time inserts for
//!   high-cardinality traces
//!
//! Callers pick a strategy at construction from expected cardinality and
//! never change it. Serialized output depends only on logical content, so
//! consumers cannot tell which strategy produced a buffer.

mod errors;
mod large;
mod small;
mod wire;

pub use errors::{TagWireError, TagWireResult};
pub use large::LargeTagValueMap;
pub use small::SmallTagValueMap;
pub use wire::decode_tag_table;

/// Contract shared by both tag map strategies
pub trait TagValueMap {
    /// Record `value` under `key`; a value already present is ignored
    fn add(&mut self, key: &str, value: &str);

    /// Distinct values recorded under `key`, in ascending byte order
    fn values(&self, key: &str) -> Vec<&str>;

    /// Append the wire table to `buf`, returning the table's start offset
    ///
    /// Keys and per-key values are written in ascending byte order, so
    /// identical logical content serializes to identical bytes whichever
    /// strategy built it.
    fn serialize_to(&self, buf: &mut Vec<u8>) -> usize;

    /// Number of distinct keys
    fn key_count(&self) -> usize;

    /// Whether no tags have been recorded
    fn is_empty(&self) -> bool {
        self.key_count() == 0
    }
}
