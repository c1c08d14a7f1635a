//! # In-Memory Backend
//!
//! Backend test double holding every object in a map behind an `RwLock`.
//! Matches the contract of the filesystem backend exactly, including range
//! bounds checking, so block tests can run without touching disk.

use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

use super::cancel::CancelToken;
use super::errors::{object_key, BackendError, BackendResult};
use super::BlockBackend;

type ObjectKey = (String, Uuid, String);

/// In-memory block backend
#[derive(Debug, Default)]
pub struct MemoryBackend {
    objects: RwLock<HashMap<ObjectKey, Vec<u8>>>,
}

impl MemoryBackend {
    /// Create an empty in-memory backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects
    pub fn object_count(&self) -> usize {
        self.objects.read().unwrap().len()
    }

    /// Overwrite one object's bytes in place, for corruption tests
    pub fn tamper<F>(&self, tenant: &str, block_id: Uuid, name: &str, mutate: F) -> bool
    where
        F: FnOnce(&mut Vec<u8>),
    {
        let mut objects = self.objects.write().unwrap();
        match objects.get_mut(&(tenant.to_string(), block_id, name.to_string())) {
            Some(data) => {
                mutate(data);
                true
            }
            None => false,
        }
    }
}

impl BlockBackend for MemoryBackend {
    fn write(
        &self,
        tenant: &str,
        block_id: Uuid,
        name: &str,
        data: &[u8],
        cancel: &CancelToken,
    ) -> BackendResult<()> {
        cancel.check()?;
        self.objects.write().unwrap().insert(
            (tenant.to_string(), block_id, name.to_string()),
            data.to_vec(),
        );
        Ok(())
    }

    fn read_all(
        &self,
        tenant: &str,
        block_id: Uuid,
        name: &str,
        cancel: &CancelToken,
    ) -> BackendResult<Vec<u8>> {
        cancel.check()?;
        self.objects
            .read()
            .unwrap()
            .get(&(tenant.to_string(), block_id, name.to_string()))
            .cloned()
            .ok_or_else(|| BackendError::ObjectNotFound {
                tenant: tenant.to_string(),
                block_id,
                name: name.to_string(),
            })
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
        let objects = self.objects.read().unwrap();
        let data = objects
            .get(&(tenant.to_string(), block_id, name.to_string()))
            .ok_or_else(|| BackendError::ObjectNotFound {
                tenant: tenant.to_string(),
                block_id,
                name: name.to_string(),
            })?;

        let object_size = data.len() as u64;
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

        Ok(data[offset as usize..end as usize].to_vec())
    }

    fn exists(
        &self,
        tenant: &str,
        block_id: Uuid,
        name: &str,
        cancel: &CancelToken,
    ) -> BackendResult<bool> {
        cancel.check()?;
        Ok(self
            .objects
            .read()
            .unwrap()
            .contains_key(&(tenant.to_string(), block_id, name.to_string())))
    }

    fn list_blocks(&self, tenant: &str, cancel: &CancelToken) -> BackendResult<Vec<Uuid>> {
        cancel.check()?;
        let objects = self.objects.read().unwrap();
        let mut block_ids: Vec<Uuid> = objects
            .keys()
            .filter(|(t, _, _)| t == tenant)
            .map(|(_, id, _)| *id)
            .collect();
        block_ids.sort();
        block_ids.dedup();
        Ok(block_ids)
    }
}
