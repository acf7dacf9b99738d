//! Store Module
//!
//! The backend contract shared by the log engine and the in-memory store, and
//! the selection logic that picks one from an identifier.

use std::path::PathBuf;

use parking_lot::Mutex;

use crate::config::Config;
use crate::engine::LogEngine;
use crate::error::Result;
use crate::memory::MemoryStore;

/// Identifier that selects the non-persistent backend
pub const MEMORY_IDENTIFIER: &str = ":memory:";

/// Operations every backend supports
pub trait KvStore {
    /// Current value of `key`, or `KeyNotFound`
    fn get(&mut self, key: &[u8]) -> Result<Vec<u8>>;

    /// Store `value`, returning the previous value if there was one
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Remove `key`, returning its last value, or `KeyNotFound`
    fn delete(&mut self, key: &[u8]) -> Result<Vec<u8>>;

    /// Live keys in no particular order
    fn list_keys(&self) -> Vec<Vec<u8>>;

    /// Flush and release resources
    fn close(self) -> Result<()>
    where
        Self: Sized;
}

impl KvStore for LogEngine {
    fn get(&mut self, key: &[u8]) -> Result<Vec<u8>> {
        LogEngine::get(self, key)
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<Option<Vec<u8>>> {
        LogEngine::put(self, key, value)
    }

    fn delete(&mut self, key: &[u8]) -> Result<Vec<u8>> {
        LogEngine::delete(self, key)
    }

    fn list_keys(&self) -> Vec<Vec<u8>> {
        LogEngine::list_keys(self)
    }

    fn close(self) -> Result<()> {
        LogEngine::close(self)
    }
}

impl KvStore for MemoryStore {
    fn get(&mut self, key: &[u8]) -> Result<Vec<u8>> {
        MemoryStore::get(self, key)
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<Option<Vec<u8>>> {
        MemoryStore::put(self, key, value)
    }

    fn delete(&mut self, key: &[u8]) -> Result<Vec<u8>> {
        MemoryStore::delete(self, key)
    }

    fn list_keys(&self) -> Vec<Vec<u8>> {
        MemoryStore::list_keys(self)
    }

    fn close(self) -> Result<()> {
        Ok(())
    }
}

/// Which backend an identifier names
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// Non-persistent map
    Memory,

    /// Log file at the given path, created if absent
    Log(PathBuf),
}

impl Backend {
    /// `":memory:"` selects [`Backend::Memory`]; anything else is a log path.
    pub fn parse(identifier: &str) -> Self {
        if identifier == MEMORY_IDENTIFIER {
            Backend::Memory
        } else {
            Backend::Log(PathBuf::from(identifier))
        }
    }
}

/// A store resolved once at construction time
pub enum Store {
    Memory(MemoryStore),
    Log(LogEngine),
}

impl Store {
    /// Construct the selected backend
    pub fn open(backend: Backend) -> Result<Self> {
        match backend {
            Backend::Memory => {
                tracing::debug!("opening in-memory store");
                Ok(Store::Memory(MemoryStore::new()))
            }
            Backend::Log(path) => Self::open_with(Config::new(path)),
        }
    }

    /// Open a log-backed store with an explicit config
    pub fn open_with(config: Config) -> Result<Self> {
        Ok(Store::Log(LogEngine::open(config)?))
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self, Store::Log(_))
    }
}

impl KvStore for Store {
    fn get(&mut self, key: &[u8]) -> Result<Vec<u8>> {
        match self {
            Store::Memory(s) => s.get(key),
            Store::Log(s) => s.get(key),
        }
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<Option<Vec<u8>>> {
        match self {
            Store::Memory(s) => s.put(key, value),
            Store::Log(s) => s.put(key, value),
        }
    }

    fn delete(&mut self, key: &[u8]) -> Result<Vec<u8>> {
        match self {
            Store::Memory(s) => s.delete(key),
            Store::Log(s) => s.delete(key),
        }
    }

    fn list_keys(&self) -> Vec<Vec<u8>> {
        match self {
            Store::Memory(s) => s.list_keys(),
            Store::Log(s) => s.list_keys(),
        }
    }

    fn close(self) -> Result<()> {
        match self {
            Store::Memory(s) => KvStore::close(s),
            Store::Log(s) => s.close(),
        }
    }
}

/// A store behind one mutex, for callers sharing it across threads
///
/// Every operation holds the same lock for its whole duration, so the append
/// offset and key directory are never observed half-updated.
pub struct SharedStore<S: KvStore> {
    inner: Mutex<S>,
}

impl<S: KvStore> SharedStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            inner: Mutex::new(store),
        }
    }

    pub fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        self.inner.lock().get(key)
    }

    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<Option<Vec<u8>>> {
        self.inner.lock().put(key, value)
    }

    pub fn delete(&self, key: &[u8]) -> Result<Vec<u8>> {
        self.inner.lock().delete(key)
    }

    pub fn list_keys(&self) -> Vec<Vec<u8>> {
        self.inner.lock().list_keys()
    }

    /// Take the store back out, e.g. to close it
    pub fn into_inner(self) -> S {
        self.inner.into_inner()
    }

    pub fn close(self) -> Result<()> {
        self.into_inner().close()
    }
}
