//! Non-persistent store
//!
//! Same contract as [`crate::LogEngine`] with nothing written to disk.

use std::collections::HashMap;

use crate::error::{CaskError, Result};

/// HashMap-backed store; contents are lost on close
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: HashMap<Vec<u8>, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        self.data.get(key).cloned().ok_or(CaskError::KeyNotFound)
    }

    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.data.insert(key.to_vec(), value.to_vec()))
    }

    pub fn delete(&mut self, key: &[u8]) -> Result<Vec<u8>> {
        self.data.remove(key).ok_or(CaskError::KeyNotFound)
    }

    pub fn list_keys(&self) -> Vec<Vec<u8>> {
        self.data.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
