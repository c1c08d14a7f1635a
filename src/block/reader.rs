//! # Block Reader
//!
//! Read handle over one completed block. Opening loads the metadata and the
//! full record index into memory; afterwards a point lookup costs one ranged
//! read of one page, and a scan streams pages in index order. The data
//! object itself is never held in memory whole.

use std::sync::Arc;

use uuid::Uuid;

use crate::backend::{BackendError, BlockBackend, CancelToken};
use crate::observability::{log_event, BlockEvent};

use super::compression::Compression;
use super::errors::{BlockError, BlockResult};
use super::index::RecordIndex;
use super::iterator::BlockIterator;
use super::meta::{compute_checksum, parse_checksum, BlockMeta};
use super::page::decode_page;
use super::record::TraceId;
use super::{CURRENT_VERSION, DATA_OBJECT, INDEX_OBJECT};

/// Reader for one immutable block
#[derive(Debug, Clone)]
pub struct BlockReader {
    backend: Arc<dyn BlockBackend>,
    meta: BlockMeta,
    compression: Compression,
    index: Arc<RecordIndex>,
}

impl BlockReader {
    /// Open the block at `tenant`/`block_id`
    ///
    /// Validates the format version, resolves the codec, and loads the
    /// record index. Fails rather than serving a block whose index
    /// disagrees with its metadata.
    pub fn open(
        backend: Arc<dyn BlockBackend>,
        tenant: &str,
        block_id: Uuid,
        cancel: &CancelToken,
    ) -> BlockResult<Self> {
        match Self::open_inner(backend, tenant, block_id, cancel) {
            Ok(reader) => {
                log_event(
                    BlockEvent::BlockOpened,
                    &[
                        ("tenant", tenant),
                        ("block_id", &block_id.to_string()),
                        ("records", &reader.meta.total_records.to_string()),
                        ("pages", &reader.index.len().to_string()),
                    ],
                );
                Ok(reader)
            }
            Err(err) => {
                if err.is_corruption() {
                    log_event(
                        BlockEvent::CorruptionDetected,
                        &[
                            ("tenant", tenant),
                            ("block_id", &block_id.to_string()),
                            ("error", &err.to_string()),
                        ],
                    );
                }
                Err(err)
            }
        }
    }

    fn open_inner(
        backend: Arc<dyn BlockBackend>,
        tenant: &str,
        block_id: Uuid,
        cancel: &CancelToken,
    ) -> BlockResult<Self> {
        let meta = BlockMeta::load(backend.as_ref(), tenant, block_id, cancel)?;
        if meta.version != CURRENT_VERSION {
            return Err(BlockError::UnsupportedVersion {
                found: meta.version,
            });
        }
        let compression = meta.codec()?;

        let index_bytes = match backend.read_all(tenant, block_id, INDEX_OBJECT, cancel) {
            Ok(bytes) => bytes,
            Err(BackendError::ObjectNotFound { .. }) => {
                return Err(BlockError::CorruptIndex {
                    reason: "index object missing".to_string(),
                })
            }
            Err(other) => return Err(other.into()),
        };
        let index = RecordIndex::from_bytes(&index_bytes)?;

        if index.data_len() != meta.total_size {
            return Err(BlockError::CorruptIndex {
                reason: format!(
                    "index tiles {} bytes but metadata records {}",
                    index.data_len(),
                    meta.total_size
                ),
            });
        }

        Ok(Self {
            backend,
            meta,
            compression,
            index: Arc::new(index),
        })
    }

    /// Block descriptor loaded at open
    pub fn meta(&self) -> &BlockMeta {
        &self.meta
    }

    /// Number of pages in the block
    pub fn page_count(&self) -> usize {
        self.index.len()
    }

    /// Look up one record by trace identifier
    ///
    /// Narrows to the single page that could hold `id`, fetches it with one
    /// ranged read, and scans its records. An absent id is `Ok(None)`; ids
    /// that precede the first page are resolved without any I/O.
    pub fn find(&self, id: TraceId, cancel: &CancelToken) -> BlockResult<Option<Vec<u8>>> {
        let entry = match self.index.find_page(id) {
            Some(entry) => *entry,
            None => return Ok(None),
        };

        let frame = self.backend.read_range(
            &self.meta.tenant,
            self.meta.block_id,
            DATA_OBJECT,
            entry.offset,
            u64::from(entry.length),
            cancel,
        )?;
        let records = decode_page(&frame, entry.offset, self.compression)?;

        Ok(records.into_iter().find(|r| r.id == id).map(|r| r.payload))
    }

    /// Iterate every record in ascending id order
    ///
    /// `pages_per_fetch` pages are fetched per ranged read; zero is treated
    /// as one.
    pub fn records(&self, pages_per_fetch: usize) -> BlockIterator {
        BlockIterator::new(
            Arc::clone(&self.backend),
            self.meta.tenant.clone(),
            self.meta.block_id,
            self.compression,
            Arc::clone(&self.index),
            pages_per_fetch,
        )
    }

    /// Verify the stored objects against the metadata checksums
    ///
    /// Reads the data and index objects in full; intended for repair and
    /// audit passes, not the query path.
    pub fn verify(&self, cancel: &CancelToken) -> BlockResult<()> {
        for (name, recorded) in [
            (DATA_OBJECT, &self.meta.data_checksum),
            (INDEX_OBJECT, &self.meta.index_checksum),
        ] {
            let expected = parse_checksum(recorded).ok_or_else(|| BlockError::CorruptMeta {
                tenant: self.meta.tenant.clone(),
                block_id: self.meta.block_id,
                reason: format!("unparseable checksum \"{}\" for {}", recorded, name),
            })?;

            let bytes =
                self.backend
                    .read_all(&self.meta.tenant, self.meta.block_id, name, cancel)?;
            if compute_checksum(&bytes) != expected {
                log_event(
                    BlockEvent::VerifyFailed,
                    &[
                        ("tenant", &self.meta.tenant),
                        ("block_id", &self.meta.block_id.to_string()),
                        ("object", name),
                    ],
                );
                return Err(BlockError::ChecksumMismatch {
                    name: name.to_string(),
                });
            }
        }

        log_event(
            BlockEvent::VerifyPassed,
            &[
                ("tenant", &self.meta.tenant),
                ("block_id", &self.meta.block_id.to_string()),
            ],
        );
        Ok(())
    }
}
