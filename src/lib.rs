//! tracestore - Immutable block storage for trace records
//!
//! Records sorted by trace id are framed into compressed pages, indexed by
//! each page's first id, and served through two read paths: point lookup
//! and ordered scan. Blocks are write-once; a pluggable backend supplies
//! the bytes. A dual-strategy tag value map feeds search queries.

pub mod backend;
pub mod block;
pub mod observability;
pub mod search;

pub use backend::{BackendError, BlockBackend, CancelToken, LocalBackend, MemoryBackend};
pub use block::{
    BlockError, BlockIterator, BlockMeta, BlockReader, BlockResult, BlockWriter, Compression,
    RecordIter, TraceId,
};
pub use search::{decode_tag_table, LargeTagValueMap, SmallTagValueMap, TagValueMap};
