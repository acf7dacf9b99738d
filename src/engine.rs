//! Engine Module
//!
//! The log-structured storage engine.
//!
//! ## Responsibilities
//! - Own the active log file, its append offset, and the key directory
//! - Replay the log on open to rebuild the key directory
//! - Serve reads with a single positioned read per lookup
//! - Append + fsync before every index mutation

use std::path::Path;

use crate::config::Config;
use crate::error::{CaskError, Result};
use crate::keydir::{KeyDir, KeyDirEntry};
use crate::log::{ActiveLog, LogRecovery, Record, RecoveryResult};

/// A Bitcask-style engine over one append-only log file
///
/// ## Consistency
///
/// The append offset and the key directory form one unit: both live here and
/// only change together, after a record has been written and synced. The engine
/// has no internal locking; every mutating method takes `&mut self`, and `get`
/// does too because it repositions the shared file cursor. Wrap it in
/// [`crate::SharedStore`] to use it from several threads.
pub struct LogEngine {
    /// Engine configuration
    config: Config,

    /// Exclusive handle on the log
    log: ActiveLog,

    /// key -> location of current value
    keydir: KeyDir,

    /// Stats from the replay performed by `open`
    recovery: RecoveryResult,
}

impl LogEngine {
    /// Open or create a log with the given config
    ///
    /// On startup:
    /// 1. Open the file (creating it if allowed and missing)
    /// 2. Replay every record to rebuild the key directory
    /// 3. Resume appending at the end of the last valid record
    ///
    /// A truncated or corrupt record anywhere in the log fails the open with
    /// `CorruptLog`.
    pub fn open(config: Config) -> Result<Self> {
        let path = config.path.as_path();

        let file = ActiveLog::open_file(path, config.create_if_missing)?;

        // Decide from the opened handle, not a prior existence check.
        let (keydir, recovery) = if file.metadata()?.len() > 0 {
            let replayed = LogRecovery::replay(&file)?;
            tracing::info!(
                path = %path.display(),
                records = replayed.1.records_replayed,
                tombstones = replayed.1.tombstones,
                live_keys = replayed.1.live_keys,
                bytes = replayed.1.bytes,
                "log replayed"
            );
            replayed
        } else {
            tracing::info!(path = %path.display(), "opened empty log");
            (KeyDir::new(), RecoveryResult::default())
        };

        let log = ActiveLog::new(path, file, recovery.bytes);

        Ok(Self {
            config,
            log,
            keydir,
            recovery,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified log path
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::new(path))
    }

    /// Get the current value of `key`
    ///
    /// Reads exactly the recorded value range; never scans.
    pub fn get(&mut self, key: &[u8]) -> Result<Vec<u8>> {
        let entry = *self.keydir.get(key).ok_or(CaskError::KeyNotFound)?;
        self.read_value(&entry)
    }

    /// Store `value` under `key`
    ///
    /// Returns the previous value, or `None` if the key was new.
    ///
    /// Steps:
    /// 1. Read the old value (if any)
    /// 2. Append a live record and fsync
    /// 3. Point the key directory at the new value
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<Option<Vec<u8>>> {
        let record = Record::live(key.to_vec(), value.to_vec());
        let encoded = record.encode()?;

        let previous = match self.keydir.get(key).copied() {
            Some(entry) => Some(self.read_value(&entry)?),
            None => None,
        };

        let start = self.log.append(&encoded)?;
        let value_position = start + encoded.len() as u64 - value.len() as u64;

        tracing::debug!(
            key_len = key.len(),
            value_len = value.len(),
            offset = start,
            "put"
        );

        self.keydir.set(
            record.key,
            KeyDirEntry {
                value_size: value.len() as u32,
                value_position,
                timestamp: record.timestamp,
            },
        );

        Ok(previous)
    }

    /// Delete `key`, returning the value it held
    ///
    /// The tombstone carries that value as a diagnostic copy; the key
    /// directory entry is removed once the tombstone is durable.
    pub fn delete(&mut self, key: &[u8]) -> Result<Vec<u8>> {
        let entry = *self.keydir.get(key).ok_or(CaskError::KeyNotFound)?;
        let value = self.read_value(&entry)?;

        let tombstone = Record::deleted(key.to_vec(), value);
        let encoded = tombstone.encode()?;
        let start = self.log.append(&encoded)?;

        tracing::debug!(key_len = key.len(), offset = start, "delete");

        self.keydir.remove(key);
        Ok(tombstone.value)
    }

    /// All live keys, unordered
    pub fn list_keys(&self) -> Vec<Vec<u8>> {
        self.keydir.keys().map(|k| k.to_vec()).collect()
    }

    /// Sync and release the log
    pub fn close(self) -> Result<()> {
        tracing::info!(
            path = %self.log.path().display(),
            bytes = self.log.position(),
            "closing log"
        );
        self.log.close()
    }

    fn read_value(&mut self, entry: &KeyDirEntry) -> Result<Vec<u8>> {
        self.log
            .read_at(entry.value_position, entry.value_size as usize)
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Path of the log file
    pub fn path(&self) -> &Path {
        self.log.path()
    }

    /// Next append offset, equal to the log's length
    pub fn position(&self) -> u64 {
        self.log.position()
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.keydir.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keydir.is_empty()
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.keydir.contains_key(key)
    }

    /// Key directory entry for `key`
    pub fn entry(&self, key: &[u8]) -> Option<KeyDirEntry> {
        self.keydir.get(key).copied()
    }

    /// Stats of the replay performed when this engine was opened
    pub fn recovery(&self) -> &RecoveryResult {
        &self.recovery
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
