//! Hash-storage tag map for high value cardinality
//!
//! Constant-time insert and lookup at the cost of per-entry hashing and
//! set overhead. The right choice when a trace carries many distinct
//! values per key.

use std::collections::{HashMap, HashSet};

use super::wire;
use super::TagValueMap;

/// Tag map backed by hash sets
#[derive(Debug, Clone, Default)]
pub struct LargeTagValueMap {
    entries: HashMap<String, HashSet<String>>,
}

impl LargeTagValueMap {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TagValueMap for LargeTagValueMap {
    fn add(&mut self, key: &str, value: &str) {
        // Look up before allocating owned strings
        match self.entries.get_mut(key) {
            Some(values) => {
                if !values.contains(value) {
                    values.insert(value.to_string());
                }
            }
            None => {
                let mut values = HashSet::new();
                values.insert(value.to_string());
                self.entries.insert(key.to_string(), values);
            }
        }
    }

    fn values(&self, key: &str) -> Vec<&str> {
        let mut values: Vec<&str> = self
            .entries
            .get(key)
            .map(|vs| vs.iter().map(String::as_str).collect())
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
