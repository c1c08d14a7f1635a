//! Linear-storage tag map for low value cardinality
//!
//! Entries live in plain vectors and every insert scans them. For the
//! common trace with a handful of keys and values this beats hashing on
//! both memory and time; past a few dozen distinct values per key the
//! hash-backed [`LargeTagValueMap`](super::LargeTagValueMap) wins.

use super::wire;
use super::TagValueMap;

/// Tag map backed by unsorted vectors
#[derive(Debug, Clone, Default)]
pub struct SmallTagValueMap {
    entries: Vec<(String, Vec<String>)>,
}

impl SmallTagValueMap {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TagValueMap for SmallTagValueMap {
    fn add(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => {
                if !values.iter().any(|v| v == value) {
                    values.push(value.to_string());
                }
            }
            None => self
                .entries
                .push((key.to_string(), vec![value.to_string()])),
        }
    }

    fn values(&self, key: &str) -> Vec<&str> {
        let mut values: Vec<&str> = self
            .entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, vs)| vs.iter().map(String::as_str).collect())
            .unwrap_or_default();
        values.sort_unstable();
        values
    }

    fn serialize_to(&self, buf: &mut Vec<u8>) -> usize {
        let mut table: Vec<(&str, Vec<&str>)> = self
            .entries
            .iter()
            .map(|(key, vs)| {
                let mut values: Vec<&str> = vs.iter().map(String::as_str).collect();
                values.sort_unstable();
                (key.as_str(), values)
            })
            .collect();
        table.sort_unstable_by_key(|(key, _)| *key);
        wire::write_table(buf, &table)
    }

    fn key_count(&self) -> usize {
        self.entries.len()
    }
}
