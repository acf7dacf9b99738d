//! KeyDir implementation
//!
//! HashMap-based; callers get no ordering guarantee.

use std::collections::HashMap;

use super::KeyDirEntry;

/// Mapping from key bytes to the entry of its current value
#[derive(Debug, Default, Clone)]
pub struct KeyDir {
    entries: HashMap<Vec<u8>, KeyDirEntry>,
}

impl KeyDir {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry for `key`
    pub fn set(&mut self, key: Vec<u8>, entry: KeyDirEntry) {
        self.entries.insert(key, entry);
    }

    /// Remove `key`; no-op when absent
    pub fn remove(&mut self, key: &[u8]) -> Option<KeyDirEntry> {
        self.entries.remove(key)
    }

    pub fn get(&self, key: &[u8]) -> Option<&KeyDirEntry> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.entries.contains_key(key)
    }

    /// All present keys, in no particular order
    pub fn keys(&self) -> impl Iterator<Item = &[u8]> {
        self.entries.keys().map(|k| k.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
