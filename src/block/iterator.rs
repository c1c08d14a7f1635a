//! # Block Iterator
//!
//! Ordered scan over every record in a block. Pages are fetched in index
//! order, a configurable number per ranged read, and decoded records are
//! buffered until yielded. Because the writer appends in ascending id order
//! and pages tile the data object, the scan is globally ordered without any
//! merging.

use std::collections::VecDeque;
use std::sync::Arc;

use uuid::Uuid;

use crate::backend::{BlockBackend, CancelToken};

use super::compression::Compression;
use super::errors::{BlockError, BlockResult};
use super::index::RecordIndex;
use super::page::decode_page;
use super::record::{Record, TraceId};
use super::DATA_OBJECT;

/// Pull-based scan over a block's records
///
/// `Ok(None)` from [`BlockIterator::next_record`] means the block is
/// exhausted. An error ends the scan: it is returned once, and every call
/// after that yields `Ok(None)`.
#[derive(Debug)]
pub struct BlockIterator {
    backend: Arc<dyn BlockBackend>,
    tenant: String,
    block_id: Uuid,
    compression: Compression,
    index: Arc<RecordIndex>,
    pages_per_fetch: usize,

    next_page: usize,
    buffered: VecDeque<Record>,
    failed: bool,
}

impl BlockIterator {
    pub(crate) fn new(
        backend: Arc<dyn BlockBackend>,
        tenant: String,
        block_id: Uuid,
        compression: Compression,
        index: Arc<RecordIndex>,
        pages_per_fetch: usize,
    ) -> Self {
        Self {
            backend,
            tenant,
            block_id,
            compression,
            index,
            pages_per_fetch: pages_per_fetch.max(1),
            next_page: 0,
            buffered: VecDeque::new(),
            failed: false,
        }
    }

    /// Return the next record in ascending id order
    pub fn next_record(
        &mut self,
        cancel: &CancelToken,
    ) -> BlockResult<Option<(TraceId, Vec<u8>)>> {
        if self.failed {
            return Ok(None);
        }

        while self.buffered.is_empty() {
            if self.next_page >= self.index.len() {
                return Ok(None);
            }
            if let Err(err) = self.fetch_batch(cancel) {
                self.failed = true;
                return Err(err);
            }
        }

        Ok(self.buffered.pop_front().map(|r| (r.id, r.payload)))
    }

    /// Fetch the next batch of pages with one ranged read
    fn fetch_batch(&mut self, cancel: &CancelToken) -> BlockResult<()> {
        let end_page = (self.next_page + self.pages_per_fetch).min(self.index.len());
        let batch = &self.index.entries()[self.next_page..end_page];

        // Consecutive pages tile the data object, so the batch is one
        // contiguous byte span
        let span_offset = batch[0].offset;
        let last = batch[batch.len() - 1];
        let span_len = last.offset + u64::from(last.length) - span_offset;

        let bytes = self.backend.read_range(
            &self.tenant,
            self.block_id,
            DATA_OBJECT,
            span_offset,
            span_len,
            cancel,
        )?;

        for entry in batch {
            let start = (entry.offset - span_offset) as usize;
            let frame = bytes
                .get(start..start + entry.length as usize)
                .ok_or_else(|| BlockError::CorruptPage {
                    offset: entry.offset,
                    reason: "page extends past the fetched range".to_string(),
                })?;
            let records = decode_page(frame, entry.offset, self.compression)?;
            self.buffered.extend(records);
        }
        self.next_page = end_page;
        Ok(())
    }

    /// Pages not yet fetched
    pub fn remaining_pages(&self) -> usize {
        self.index.len().saturating_sub(self.next_page)
    }

    /// Adapt into a `std::iter::Iterator` bound to `cancel`
    ///
    /// A scan error stops iteration and is parked on the adapter; callers
    /// that need to distinguish exhaustion from failure inspect
    /// [`RecordIter::error`] after the loop.
    pub fn iter_with(self, cancel: CancelToken) -> RecordIter {
        RecordIter {
            inner: self,
            cancel,
            error: None,
        }
    }
}

/// `Iterator` adapter over [`BlockIterator`]
#[derive(Debug)]
pub struct RecordIter {
    inner: BlockIterator,
    cancel: CancelToken,
    error: Option<BlockError>,
}

impl RecordIter {
    /// Error that ended the scan, if any
    pub fn error(&self) -> Option<&BlockError> {
        self.error.as_ref()
    }

    /// Consume the adapter, returning the scan error, if any
    pub fn into_error(self) -> Option<BlockError> {
        self.error
    }
}

impl Iterator for RecordIter {
    type Item = (TraceId, Vec<u8>);

    fn next(&mut self) -> Option<Self::Item> {
        match self.inner.next_record(&self.cancel) {
            Ok(item) => item,
            Err(err) => {
                self.error = Some(err);
                None
            }
        }
    }
}
