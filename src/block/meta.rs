//! Block metadata and integrity checksums
//!
//! The `meta.json` object is the authoritative block descriptor, written
//! once at completion and read once per open:
//!
//! ```json
//! {
//!   "tenant": "acme",
//!   "block_id": "6a9c3dd0-6f5a-4e8a-9b6f-2f4b6c8d0e1a",
//!   "version": "v1",
//!   "compression": "snappy",
//!   "total_records": 1042,
//!   "total_size": 1048576,
//!   "created_at": "2026-08-22T11:30:00Z",
//!   "start_time": "2026-08-22T11:00:00Z",
//!   "end_time": "2026-08-22T11:29:57Z",
//!   "data_checksum": "crc32:deadbeef",
//!   "index_checksum": "crc32:abcd1234"
//! }
//! ```
//!
//! Checksums cover the whole data and index objects and are verified on
//! demand, not on every read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::{BackendError, BlockBackend, CancelToken};

use super::compression::Compression;
use super::errors::{BlockError, BlockResult};
use super::META_OBJECT;

/// Block descriptor persisted as `meta.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockMeta {
    /// Owning tenant
    pub tenant: String,

    /// Block identifier, unique within the tenant
    pub block_id: Uuid,

    /// Block format version
    pub version: String,

    /// Page compression codec name
    pub compression: String,

    /// Number of records in the block
    pub total_records: u64,

    /// Byte length of the data object
    pub total_size: u64,

    /// When the block was completed
    pub created_at: DateTime<Utc>,

    /// Earliest record time covered by the block
    pub start_time: DateTime<Utc>,

    /// Latest record time covered by the block
    pub end_time: DateTime<Utc>,

    /// CRC32 of the data object (format: "crc32:XXXXXXXX")
    pub data_checksum: String,

    /// CRC32 of the index object (format: "crc32:XXXXXXXX")
    pub index_checksum: String,
}

impl BlockMeta {
    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> BlockResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| BlockError::CorruptMeta {
            tenant: self.tenant.clone(),
            block_id: self.block_id,
            reason: format!("serialize failed: {}", e),
        })
    }

    /// Parse metadata JSON for the block at `tenant`/`block_id`
    pub fn from_json(json: &str, tenant: &str, block_id: Uuid) -> BlockResult<Self> {
        serde_json::from_str(json).map_err(|e| BlockError::CorruptMeta {
            tenant: tenant.to_string(),
            block_id,
            reason: format!("parse failed: {}", e),
        })
    }

    /// Load metadata from the backend
    ///
    /// A missing meta object means the block does not exist; that is the
    /// only condition reported as `NotFound`.
    pub fn load(
        backend: &dyn BlockBackend,
        tenant: &str,
        block_id: Uuid,
        cancel: &CancelToken,
    ) -> BlockResult<Self> {
        let bytes = match backend.read_all(tenant, block_id, META_OBJECT, cancel) {
            Ok(bytes) => bytes,
            Err(BackendError::ObjectNotFound { .. }) => {
                return Err(BlockError::NotFound {
                    tenant: tenant.to_string(),
                    block_id,
                })
            }
            Err(other) => return Err(other.into()),
        };

        let json = String::from_utf8(bytes).map_err(|_| BlockError::CorruptMeta {
            tenant: tenant.to_string(),
            block_id,
            reason: "metadata is not UTF-8".to_string(),
        })?;
        let meta = Self::from_json(&json, tenant, block_id)?;

        // The descriptor must identify the block it was read from
        if meta.tenant != tenant || meta.block_id != block_id {
            return Err(BlockError::CorruptMeta {
                tenant: tenant.to_string(),
                block_id,
                reason: format!(
                    "metadata identifies {}/{} instead",
                    meta.tenant, meta.block_id
                ),
            });
        }
        Ok(meta)
    }

    /// Write metadata to the backend
    pub fn store(&self, backend: &dyn BlockBackend, cancel: &CancelToken) -> BlockResult<()> {
        let json = self.to_json()?;
        backend.write(
            &self.tenant,
            self.block_id,
            META_OBJECT,
            json.as_bytes(),
            cancel,
        )?;
        Ok(())
    }

    /// Resolve the page compression codec named in the metadata
    pub fn codec(&self) -> BlockResult<Compression> {
        Compression::from_name(&self.compression).ok_or_else(|| BlockError::CorruptMeta {
            tenant: self.tenant.clone(),
            block_id: self.block_id,
            reason: format!("unknown compression codec \"{}\"", self.compression),
        })
    }
}

/// Compute a CRC32 checksum of the given data
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Format a checksum in the metadata form "crc32:XXXXXXXX"
pub fn format_checksum(checksum: u32) -> String {
    format!("crc32:{:08x}", checksum)
}

/// Parse a formatted checksum back to its value
pub fn parse_checksum(formatted: &str) -> Option<u32> {
    formatted
        .strip_prefix("crc32:")
        .and_then(|hex| u32::from_str_radix(hex, 16).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;

    fn sample_meta(tenant: &str, block_id: Uuid) -> BlockMeta {
        let now = Utc::now();
        BlockMeta {
            tenant: tenant.to_string(),
            block_id,
            version: crate::block::CURRENT_VERSION.to_string(),
            compression: "snappy".to_string(),
            total_records: 10,
            total_size: 2048,
            created_at: now,
            start_time: now,
            end_time: now,
            data_checksum: format_checksum(0xdeadbeef),
            index_checksum: format_checksum(0xabcd1234),
        }
    }

    #[test]
    fn test_json_roundtrip() {
        let meta = sample_meta("acme", Uuid::new_v4());
        let json = meta.to_json().unwrap();

        assert!(json.contains("\"compression\": \"snappy\""));
        assert!(json.contains("\"data_checksum\": \"crc32:deadbeef\""));

        let parsed = BlockMeta::from_json(&json, &meta.tenant, meta.block_id).unwrap();
        assert_eq!(parsed, meta);
    }

    #[test]
    fn test_store_load() {
        let backend = MemoryBackend::new();
        let cancel = CancelToken::new();
        let meta = sample_meta("acme", Uuid::new_v4());

        meta.store(&backend, &cancel).unwrap();
        let loaded = BlockMeta::load(&backend, "acme", meta.block_id, &cancel).unwrap();
        assert_eq!(loaded, meta);
    }

    #[test]
    fn test_missing_block_is_not_found() {
        let backend = MemoryBackend::new();
        let cancel = CancelToken::new();

        let result = BlockMeta::load(&backend, "acme", Uuid::new_v4(), &cancel);
        assert!(matches!(result, Err(BlockError::NotFound { .. })));
    }

    #[test]
    fn test_unparseable_metadata_is_corrupt() {
        let backend = MemoryBackend::new();
        let cancel = CancelToken::new();
        let block_id = Uuid::new_v4();

        backend
            .write("acme", block_id, META_OBJECT, b"not json at all", &cancel)
            .unwrap();
        let result = BlockMeta::load(&backend, "acme", block_id, &cancel);
        assert!(matches!(result, Err(BlockError::CorruptMeta { .. })));
    }

    #[test]
    fn test_mislocated_metadata_is_corrupt() {
        let backend = MemoryBackend::new();
        let cancel = CancelToken::new();
        let meta = sample_meta("acme", Uuid::new_v4());

        // Store the descriptor under a different block id
        let other_id = Uuid::new_v4();
        let json = meta.to_json().unwrap();
        backend
            .write("acme", other_id, META_OBJECT, json.as_bytes(), &cancel)
            .unwrap();

        let result = BlockMeta::load(&backend, "acme", other_id, &cancel);
        assert!(matches!(result, Err(BlockError::CorruptMeta { .. })));
    }

    #[test]
    fn test_codec_resolution() {
        let mut meta = sample_meta("acme", Uuid::new_v4());
        assert_eq!(meta.codec().unwrap(), Compression::Snappy);

        meta.compression = "brotli".to_string();
        assert!(matches!(meta.codec(), Err(BlockError::CorruptMeta { .. })));
    }

    #[test]
    fn test_checksum_compute() {
        assert_eq!(compute_checksum(b""), 0);
        assert_eq!(compute_checksum(b"abc"), compute_checksum(b"abc"));
        assert_ne!(compute_checksum(b"abc"), compute_checksum(b"abd"));
    }

    #[test]
    fn test_checksum_format_parse() {
        let formatted = format_checksum(0x00ab_cdef);
        assert_eq!(formatted, "crc32:00abcdef");
        assert_eq!(parse_checksum(&formatted), Some(0x00ab_cdef));

        assert_eq!(parse_checksum("md5:00abcdef"), None);
        assert_eq!(parse_checksum("crc32:xyz"), None);
    }
}
