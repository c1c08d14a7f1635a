//! # Local Filesystem Backend
//!
//! Stores each object at `<root>/<tenant>/<block id>/<name>`. Ranged reads
//! seek within the file instead of loading the whole object.

use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;

use uuid::Uuid;

use super::cancel::CancelToken;
use super::errors::{object_key, BackendError, BackendResult};
use super::BlockBackend;

/// Local filesystem block backend
#[derive(Debug)]
pub struct LocalBackend {
    root: PathBuf,
}

impl LocalBackend {
    /// Create a new local backend rooted at `root`
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn object_path(&self, tenant: &str, block_id: Uuid, name: &str) -> PathBuf {
        self.root.join(tenant).join(block_id.to_string()).join(name)
    }

    fn io_error(tenant: &str, block_id: Uuid, name: &str, err: &std::io::Error) -> BackendError {
        BackendError::Io {
            key: object_key(tenant, block_id, name),
            message: err.to_string(),
        }
    }

    fn read_error(tenant: &str, block_id: Uuid, name: &str, err: std::io::Error) -> BackendError {
        if err.kind() == std::io::ErrorKind::NotFound {
            BackendError::ObjectNotFound {
                tenant: tenant.to_string(),
                block_id,
                name: name.to_string(),
            }
        } else {
            Self::io_error(tenant, block_id, name, &err)
        }
    }
}

impl BlockBackend for LocalBackend {
    fn write(
        &self,
        tenant: &str,
        block_id: Uuid,
        name: &str,
        data: &[u8],
        cancel: &CancelToken,
    ) -> BackendResult<()> {
        cancel.check()?;
        let path = self.object_path(tenant, block_id, name);

        // Create tenant/block directories
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Self::io_error(tenant, block_id, name, &e))?;
        }

        fs::write(&path, data).map_err(|e| Self::io_error(tenant, block_id, name, &e))
    }

    fn read_all(
        &self,
        tenant: &str,
        block_id: Uuid,
        name: &str,
        cancel: &CancelToken,
    ) -> BackendResult<Vec<u8>> {
        cancel.check()?;
        let path = self.object_path(tenant, block_id, name);

        fs::read(&path).map_err(|e| Self::read_error(tenant, block_id, name, e))
    }

    fn read_range(
        &self,
        tenant: &str,
        block_id: Uuid,
        name: &str,
        offset: u64,
        length: u64,
        cancel: &CancelToken,
    ) -> BackendResult<Vec<u8>> {
        cancel.check()?;
        let path = self.object_path(tenant, block_id, name);

        let mut file =
            File::open(&path).map_err(|e| Self::read_error(tenant, block_id, name, e))?;
        let object_size = file
            .metadata()
            .map_err(|e| Self::io_error(tenant, block_id, name, &e))?
            .len();

        let out_of_bounds = BackendError::RangeOutOfBounds {
            key: object_key(tenant, block_id, name),
            offset,
            length,
            object_size,
        };
        let end = offset.checked_add(length).ok_or(out_of_bounds.clone())?;
        if end > object_size {
            return Err(out_of_bounds);
        }

        file.seek(SeekFrom::Start(offset))
            .map_err(|e| Self::io_error(tenant, block_id, name, &e))?;
        let mut buffer = vec![0u8; length as usize];
        file.read_exact(&mut buffer)
            .map_err(|e| Self::io_error(tenant, block_id, name, &e))?;
        Ok(buffer)
    }

    fn exists(
        &self,
        tenant: &str,
        block_id: Uuid,
        name: &str,
        cancel: &CancelToken,
    ) -> BackendResult<bool> {
        cancel.check()?;
        Ok(self.object_path(tenant, block_id, name).exists())
    }

    fn list_blocks(&self, tenant: &str, cancel: &CancelToken) -> BackendResult<Vec<Uuid>> {
        cancel.check()?;
        let tenant_dir = self.root.join(tenant);
        let mut block_ids = Vec::new();

        if tenant_dir.is_dir() {
            let entries = fs::read_dir(&tenant_dir).map_err(|e| BackendError::Io {
                key: tenant.to_string(),
                message: e.to_string(),
            })?;
            for entry in entries.flatten() {
                if let Some(name) = entry.file_name().to_str() {
                    // Non-UUID directories are not blocks
                    if let Ok(id) = Uuid::parse_str(name) {
                        block_ids.push(id);
                    }
                }
            }
        }

        block_ids.sort();
        Ok(block_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_read() {
        let temp = TempDir::new().unwrap();
        let backend = LocalBackend::new(temp.path().to_path_buf());
        let id = Uuid::new_v4();
        let cancel = CancelToken::new();

        backend.write("acme", id, "data", b"hello", &cancel).unwrap();
        let data = backend.read_all("acme", id, "data", &cancel).unwrap();
        assert_eq!(data, b"hello");
    }

    #[test]
    fn test_read_range() {
        let temp = TempDir::new().unwrap();
        let backend = LocalBackend::new(temp.path().to_path_buf());
        let id = Uuid::new_v4();
        let cancel = CancelToken::new();

        backend
            .write("acme", id, "data", b"0123456789", &cancel)
            .unwrap();
        let chunk = backend
            .read_range("acme", id, "data", 3, 4, &cancel)
            .unwrap();
        assert_eq!(chunk, b"3456");
    }

    #[test]
    fn test_range_out_of_bounds() {
        let temp = TempDir::new().unwrap();
        let backend = LocalBackend::new(temp.path().to_path_buf());
        let id = Uuid::new_v4();
        let cancel = CancelToken::new();

        backend
            .write("acme", id, "data", b"short", &cancel)
            .unwrap();
        let result = backend.read_range("acme", id, "data", 2, 10, &cancel);
        assert!(matches!(
            result,
            Err(BackendError::RangeOutOfBounds { object_size: 5, .. })
        ));
    }

    #[test]
    fn test_not_found() {
        let temp = TempDir::new().unwrap();
        let backend = LocalBackend::new(temp.path().to_path_buf());
        let cancel = CancelToken::new();

        let result = backend.read_all("acme", Uuid::new_v4(), "data", &cancel);
        assert!(matches!(result, Err(BackendError::ObjectNotFound { .. })));
    }

    #[test]
    fn test_exists() {
        let temp = TempDir::new().unwrap();
        let backend = LocalBackend::new(temp.path().to_path_buf());
        let id = Uuid::new_v4();
        let cancel = CancelToken::new();

        assert!(!backend.exists("acme", id, "meta.json", &cancel).unwrap());
        backend
            .write("acme", id, "meta.json", b"{}", &cancel)
            .unwrap();
        assert!(backend.exists("acme", id, "meta.json", &cancel).unwrap());
    }

    #[test]
    fn test_list_blocks_sorted() {
        let temp = TempDir::new().unwrap();
        let backend = LocalBackend::new(temp.path().to_path_buf());
        let cancel = CancelToken::new();

        let mut ids: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        for id in &ids {
            backend.write("acme", *id, "data", b"x", &cancel).unwrap();
        }
        ids.sort();

        assert_eq!(backend.list_blocks("acme", &cancel).unwrap(), ids);
        assert!(backend.list_blocks("other", &cancel).unwrap().is_empty());
    }

    #[test]
    fn test_canceled_before_io() {
        let temp = TempDir::new().unwrap();
        let backend = LocalBackend::new(temp.path().to_path_buf());
        let id = Uuid::new_v4();
        let cancel = CancelToken::new();
        cancel.cancel();

        let result = backend.read_all("acme", id, "data", &cancel);
        assert!(matches!(result, Err(BackendError::Canceled)));
    }
}
