//! # Record Index
//!
//! Sorted table mapping each page's first trace identifier to its byte range
//! in the data object. Persisted as a sidecar object of fixed-width entries:
//!
//! ```text
//! +------------------+
//! | First Trace ID   | (16 bytes)
//! +------------------+
//! | Page Offset      | (u64 LE)
//! +------------------+
//! | Page Length      | (u32 LE)
//! +------------------+
//! ```
//!
//! Entries ascend strictly by first identifier and tile the data object in
//! order: each page starts where the previous one ended. The whole index is
//! materialized in memory at block open; lookups are a predecessor binary
//! search narrowing to one page.

use super::errors::{BlockError, BlockResult};
use super::record::TraceId;

/// Serialized size of one index entry
pub const INDEX_ENTRY_LEN: usize = TraceId::LENGTH + 8 + 4;

/// One page's entry in the record index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    /// First trace identifier in the page
    pub first_id: TraceId,
    /// Byte offset of the page frame in the data object
    pub offset: u64,
    /// Byte length of the page frame
    pub length: u32,
}

impl IndexEntry {
    fn write(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.first_id.as_bytes());
        buf.extend_from_slice(&self.offset.to_le_bytes());
        buf.extend_from_slice(&self.length.to_le_bytes());
    }

    fn read(chunk: &[u8]) -> IndexEntry {
        let mut id = [0u8; TraceId::LENGTH];
        id.copy_from_slice(&chunk[..TraceId::LENGTH]);
        let mut offset = [0u8; 8];
        offset.copy_from_slice(&chunk[TraceId::LENGTH..TraceId::LENGTH + 8]);
        let mut length = [0u8; 4];
        length.copy_from_slice(&chunk[TraceId::LENGTH + 8..INDEX_ENTRY_LEN]);

        IndexEntry {
            first_id: TraceId::new(id),
            offset: u64::from_le_bytes(offset),
            length: u32::from_le_bytes(length),
        }
    }
}

/// In-memory record index for one block
#[derive(Debug, Clone, Default)]
pub struct RecordIndex {
    entries: Vec<IndexEntry>,
}

impl RecordIndex {
    /// Build an index from entries, validating ordering and tiling
    pub fn new(entries: Vec<IndexEntry>) -> BlockResult<Self> {
        Self::validate(&entries)?;
        Ok(Self { entries })
    }

    /// Parse the persisted sidecar object
    pub fn from_bytes(data: &[u8]) -> BlockResult<Self> {
        if data.len() % INDEX_ENTRY_LEN != 0 {
            return Err(BlockError::CorruptIndex {
                reason: format!(
                    "{} bytes is not a multiple of the {}-byte entry size",
                    data.len(),
                    INDEX_ENTRY_LEN
                ),
            });
        }

        let entries = data.chunks_exact(INDEX_ENTRY_LEN).map(IndexEntry::read).collect();
        Self::new(entries)
    }

    /// Serialize to the sidecar wire format
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.entries.len() * INDEX_ENTRY_LEN);
        for entry in &self.entries {
            entry.write(&mut buf);
        }
        buf
    }

    fn validate(entries: &[IndexEntry]) -> BlockResult<()> {
        let mut expected_offset = 0u64;
        for (i, entry) in entries.iter().enumerate() {
            if entry.offset != expected_offset {
                return Err(BlockError::CorruptIndex {
                    reason: format!(
                        "entry {} at offset {} leaves a gap from {}",
                        i, entry.offset, expected_offset
                    ),
                });
            }
            if i > 0 && entries[i - 1].first_id >= entry.first_id {
                return Err(BlockError::CorruptIndex {
                    reason: format!("entry {} first id not ascending", i),
                });
            }
            expected_offset += u64::from(entry.length);
        }
        Ok(())
    }

    /// Number of pages indexed
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the block has no pages
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in page order
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Entry for the page at position `n`
    pub fn entry(&self, n: usize) -> Option<&IndexEntry> {
        self.entries.get(n)
    }

    /// Total byte length of the data object the entries tile
    pub fn data_len(&self) -> u64 {
        match self.entries.last() {
            Some(last) => last.offset + u64::from(last.length),
            None => 0,
        }
    }

    /// Locate the one page that could contain `id`
    ///
    /// Predecessor search: the greatest entry whose first id is <= `id`.
    /// `None` means the id precedes every page and cannot be present.
    pub fn find_page(&self, id: TraceId) -> Option<&IndexEntry> {
        let following = self.entries.partition_point(|entry| entry.first_id <= id);
        if following == 0 {
            None
        } else {
            Some(&self.entries[following - 1])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tid(n: u8) -> TraceId {
        let mut bytes = [0u8; TraceId::LENGTH];
        bytes[TraceId::LENGTH - 1] = n;
        TraceId::new(bytes)
    }

    fn sample_index() -> RecordIndex {
        // Pages of first ids 10, 20, 30 tiling 300 bytes
        RecordIndex::new(vec![
            IndexEntry {
                first_id: tid(10),
                offset: 0,
                length: 100,
            },
            IndexEntry {
                first_id: tid(20),
                offset: 100,
                length: 150,
            },
            IndexEntry {
                first_id: tid(30),
                offset: 250,
                length: 50,
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_predecessor_search() {
        let index = sample_index();

        // Before the first page: absent without I/O
        assert!(index.find_page(tid(5)).is_none());

        // Exact first ids land on their own page
        assert_eq!(index.find_page(tid(10)).unwrap().offset, 0);
        assert_eq!(index.find_page(tid(20)).unwrap().offset, 100);

        // Ids between pages land on the earlier page
        assert_eq!(index.find_page(tid(15)).unwrap().offset, 0);
        assert_eq!(index.find_page(tid(29)).unwrap().offset, 100);

        // Ids past the last first id land on the last page
        assert_eq!(index.find_page(tid(30)).unwrap().offset, 250);
        assert_eq!(index.find_page(tid(200)).unwrap().offset, 250);
    }

    #[test]
    fn test_wire_roundtrip() {
        let index = sample_index();
        let bytes = index.to_bytes();
        assert_eq!(bytes.len(), 3 * INDEX_ENTRY_LEN);

        let parsed = RecordIndex::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.entries(), index.entries());
    }

    #[test]
    fn test_empty_index() {
        let index = RecordIndex::from_bytes(&[]).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.data_len(), 0);
        assert!(index.find_page(tid(1)).is_none());
    }

    #[test]
    fn test_ragged_length_is_corrupt() {
        let mut bytes = sample_index().to_bytes();
        bytes.truncate(bytes.len() - 1);

        let result = RecordIndex::from_bytes(&bytes);
        assert!(matches!(result, Err(BlockError::CorruptIndex { .. })));
    }

    #[test]
    fn test_unsorted_entries_are_corrupt() {
        let result = RecordIndex::new(vec![
            IndexEntry {
                first_id: tid(20),
                offset: 0,
                length: 10,
            },
            IndexEntry {
                first_id: tid(10),
                offset: 10,
                length: 10,
            },
        ]);
        assert!(matches!(result, Err(BlockError::CorruptIndex { .. })));
    }

    #[test]
    fn test_gap_between_pages_is_corrupt() {
        let result = RecordIndex::new(vec![
            IndexEntry {
                first_id: tid(10),
                offset: 0,
                length: 10,
            },
            IndexEntry {
                first_id: tid(20),
                offset: 15,
                length: 10,
            },
        ]);
        assert!(matches!(result, Err(BlockError::CorruptIndex { .. })));
    }

    #[test]
    fn test_data_len_tracks_last_entry() {
        assert_eq!(sample_index().data_len(), 300);
    }
}
