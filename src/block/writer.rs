//! # Block Writer
//!
//! Builds one immutable block. Records appended in strictly ascending id
//! order are framed into the current page; when the buffered frames reach
//! the page size target the page is encoded and cut. `complete` seals the
//! block: the final page is cut, then the data, index, and metadata objects
//! are uploaded, metadata last so a block is only discoverable once its
//! bytes are durable.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::backend::{BlockBackend, CancelToken};
use crate::observability::{log_event, BlockEvent};

use super::compression::Compression;
use super::errors::{BlockError, BlockResult};
use super::index::{IndexEntry, RecordIndex};
use super::meta::{compute_checksum, format_checksum, BlockMeta};
use super::page::encode_page;
use super::record::{Record, TraceId};
use super::{CURRENT_VERSION, DATA_OBJECT, INDEX_OBJECT};

/// Default page size target in bytes
pub const DEFAULT_PAGE_SIZE_TARGET: usize = 1024 * 1024;

/// Writer for one immutable block
pub struct BlockWriter {
    backend: Arc<dyn BlockBackend>,
    tenant: String,
    block_id: Uuid,
    compression: Compression,
    page_size_target: usize,

    current_page: Vec<Record>,
    current_page_bytes: usize,
    data: Vec<u8>,
    entries: Vec<IndexEntry>,
    last_id: Option<TraceId>,
    total_records: u64,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
}

impl BlockWriter {
    /// Create a writer for a fresh block id
    pub fn new(
        backend: Arc<dyn BlockBackend>,
        tenant: impl Into<String>,
        compression: Compression,
    ) -> Self {
        Self::with_block_id(backend, tenant, Uuid::new_v4(), compression)
    }

    /// Create a writer for a caller-chosen block id
    pub fn with_block_id(
        backend: Arc<dyn BlockBackend>,
        tenant: impl Into<String>,
        block_id: Uuid,
        compression: Compression,
    ) -> Self {
        Self {
            backend,
            tenant: tenant.into(),
            block_id,
            compression,
            page_size_target: DEFAULT_PAGE_SIZE_TARGET,
            current_page: Vec::new(),
            current_page_bytes: 0,
            data: Vec::new(),
            entries: Vec::new(),
            last_id: None,
            total_records: 0,
            start_time: None,
            end_time: None,
        }
    }

    /// Override the page size target
    pub fn with_page_size_target(mut self, bytes: usize) -> Self {
        self.page_size_target = bytes.max(1);
        self
    }

    /// Block id this writer will produce
    pub fn block_id(&self) -> Uuid {
        self.block_id
    }

    /// Records appended so far
    pub fn record_count(&self) -> u64 {
        self.total_records
    }

    /// Append a record
    ///
    /// Ids must ascend strictly; duplicates and regressions are rejected
    /// without mutating writer state.
    pub fn append(
        &mut self,
        id: TraceId,
        payload: Vec<u8>,
        cancel: &CancelToken,
    ) -> BlockResult<()> {
        cancel.check()?;

        if let Some(last) = self.last_id {
            if id <= last {
                return Err(BlockError::OutOfOrder { id });
            }
        }

        let record = Record::new(id, payload);
        let frame_len = record.frame_len();
        if frame_len as u64 > u64::from(u32::MAX) {
            return Err(BlockError::FrameTooLarge {
                size: frame_len as u64,
            });
        }

        self.current_page.push(record);
        self.current_page_bytes += frame_len;
        self.last_id = Some(id);
        self.total_records += 1;

        if self.current_page_bytes >= self.page_size_target {
            self.cut_page()?;
        }
        Ok(())
    }

    /// Append a record that covers the given time range
    ///
    /// Extends the block's time bounds; `complete` stamps blocks without
    /// explicit ranges from the completion clock instead.
    pub fn append_with_time(
        &mut self,
        id: TraceId,
        payload: Vec<u8>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        cancel: &CancelToken,
    ) -> BlockResult<()> {
        self.append(id, payload, cancel)?;

        self.start_time = Some(match self.start_time {
            Some(existing) => existing.min(start),
            None => start,
        });
        self.end_time = Some(match self.end_time {
            Some(existing) => existing.max(end),
            None => end,
        });
        Ok(())
    }

    fn cut_page(&mut self) -> BlockResult<()> {
        if self.current_page.is_empty() {
            return Ok(());
        }

        let first_id = self.current_page[0].id;
        let frame = encode_page(&self.current_page, self.compression)?;
        if frame.len() as u64 > u64::from(u32::MAX) {
            return Err(BlockError::FrameTooLarge {
                size: frame.len() as u64,
            });
        }

        self.entries.push(IndexEntry {
            first_id,
            offset: self.data.len() as u64,
            length: frame.len() as u32,
        });
        self.data.extend_from_slice(&frame);
        self.current_page.clear();
        self.current_page_bytes = 0;
        Ok(())
    }

    /// Seal the block: cut the final page and upload data, index, metadata
    ///
    /// Consumes the writer; a sealed block is never appended to again.
    pub fn complete(mut self, cancel: &CancelToken) -> BlockResult<BlockMeta> {
        self.cut_page()?;

        let index = RecordIndex::new(std::mem::take(&mut self.entries))?;
        let index_bytes = index.to_bytes();
        let created_at = Utc::now();

        let meta = BlockMeta {
            tenant: self.tenant.clone(),
            block_id: self.block_id,
            version: CURRENT_VERSION.to_string(),
            compression: self.compression.name().to_string(),
            total_records: self.total_records,
            total_size: self.data.len() as u64,
            created_at,
            start_time: self.start_time.unwrap_or(created_at),
            end_time: self.end_time.unwrap_or(created_at),
            data_checksum: format_checksum(compute_checksum(&self.data)),
            index_checksum: format_checksum(compute_checksum(&index_bytes)),
        };

        self.backend
            .write(&self.tenant, self.block_id, DATA_OBJECT, &self.data, cancel)?;
        self.backend.write(
            &self.tenant,
            self.block_id,
            INDEX_OBJECT,
            &index_bytes,
            cancel,
        )?;
        meta.store(self.backend.as_ref(), cancel)?;

        log_event(
            BlockEvent::BlockCompleted,
            &[
                ("tenant", &meta.tenant),
                ("block_id", &meta.block_id.to_string()),
                ("records", &meta.total_records.to_string()),
                ("pages", &index.len().to_string()),
                ("size_bytes", &meta.total_size.to_string()),
                ("compression", &meta.compression),
            ],
        );
        Ok(meta)
    }
}

impl std::fmt::Debug for BlockWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockWriter")
            .field("tenant", &self.tenant)
            .field("block_id", &self.block_id)
            .field("compression", &self.compression)
            .field("records", &self.total_records)
            .field("pages", &self.entries.len())
            .finish()
    }
}
