//! # Block Encoding
//!
//! Immutable, versioned, compressed, id-sorted blocks of trace records.
//!
//! A block is three objects under `(tenant, block id)`:
//!
//! - `meta.json`: descriptor read once per open ([`BlockMeta`])
//! - `data`: page frames concatenated in ascending-id order ([`page`])
//! - `index`: one fixed-width entry per page ([`RecordIndex`])
//!
//! [`BlockWriter`] produces the three objects from an ascending record
//! stream; [`BlockReader`] answers point lookups and hands out ordered
//! iterators, fetching page ranges on demand through a
//! [`BlockBackend`](crate::backend::BlockBackend). Blocks are write-once:
//! nothing mutates after completion.
//!
//! # Invariants
//!
//! 1. Records ascend strictly by trace id; the writer enforces this,
//!    readers assume it
//! 2. Index entries ascend strictly by first id and tile the data object
//! 3. A point lookup reads at most one page range
//! 4. Length or decompression disagreement is corruption, surfaced and
//!    never skipped

pub mod compression;
pub mod errors;
pub mod index;
pub mod iterator;
pub mod meta;
pub mod page;
pub mod reader;
pub mod record;
pub mod writer;

/// Name of the block descriptor object
pub const META_OBJECT: &str = "meta.json";

/// Name of the page data object
pub const DATA_OBJECT: &str = "data";

/// Name of the record index sidecar object
pub const INDEX_OBJECT: &str = "index";

/// Block format version written and read by this crate
pub const CURRENT_VERSION: &str = "v1";

pub use compression::Compression;
pub use errors::{BlockError, BlockResult};
pub use index::{IndexEntry, RecordIndex, INDEX_ENTRY_LEN};
pub use iterator::{BlockIterator, RecordIter};
pub use meta::{compute_checksum, format_checksum, parse_checksum, BlockMeta};
pub use page::{decode_page, encode_page, PAGE_HEADER_LEN};
pub use reader::BlockReader;
pub use record::{Record, TraceId};
pub use writer::BlockWriter;
