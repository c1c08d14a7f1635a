//! # Storage Backend
//!
//! Abstract byte storage keyed by `(tenant, block id, object name)`. Block
//! readers and writers depend on this contract only; the concrete transport
//! (local disk, object store, in-process map) is injected at construction.
//! Every operation takes a [`CancelToken`] checked before I/O starts.

pub mod cancel;
pub mod errors;
pub mod local;
pub mod memory;

use uuid::Uuid;

pub use cancel::CancelToken;
pub use errors::{BackendError, BackendResult};
pub use local::LocalBackend;
pub use memory::MemoryBackend;

/// Backend trait for block object storage
///
/// Implementations are stateless from the caller's point of view and safe to
/// share across threads. A ranged read outside the object's bounds is an
/// error, never a short read.
pub trait BlockBackend: Send + Sync + std::fmt::Debug {
    /// Write a whole object
    fn write(
        &self,
        tenant: &str,
        block_id: Uuid,
        name: &str,
        data: &[u8],
        cancel: &CancelToken,
    ) -> BackendResult<()>;

    /// Read a whole object
    fn read_all(
        &self,
        tenant: &str,
        block_id: Uuid,
        name: &str,
        cancel: &CancelToken,
    ) -> BackendResult<Vec<u8>>;

    /// Read `length` bytes starting at `offset`
    fn read_range(
        &self,
        tenant: &str,
        block_id: Uuid,
        name: &str,
        offset: u64,
        length: u64,
        cancel: &CancelToken,
    ) -> BackendResult<Vec<u8>>;

    /// Check if an object exists
    fn exists(
        &self,
        tenant: &str,
        block_id: Uuid,
        name: &str,
        cancel: &CancelToken,
    ) -> BackendResult<bool>;

    /// List block ids present under a tenant, ascending
    fn list_blocks(&self, tenant: &str, cancel: &CancelToken) -> BackendResult<Vec<Uuid>>;
}
