//! Log Recovery
//!
//! Rebuilds the key directory by replaying the whole log from offset 0.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::Result;
use crate::keydir::{KeyDir, KeyDirEntry};

use super::reader::LogReader;

/// Replays logs into a key directory
pub struct LogRecovery;

/// Result of a recovery scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Number of records read and validated
    pub records_replayed: u64,

    /// How many of those were deletion tombstones
    pub tombstones: u64,

    /// Live keys left in the directory after replay
    pub live_keys: usize,

    /// Bytes consumed; the log's length and the next append offset
    pub bytes: u64,
}

impl LogRecovery {
    /// Replay every record of `log` in write order.
    ///
    /// Live records set the key's entry, tombstones remove it. Any truncated or
    /// corrupt record aborts the replay with `CorruptLog`; nothing is salvaged.
    pub fn replay<R: Read>(log: R) -> Result<(KeyDir, RecoveryResult)> {
        let mut keydir = KeyDir::new();
        let mut result = RecoveryResult::default();
        let mut reader = LogReader::new(log);

        for scanned in reader.by_ref() {
            let scanned = scanned?;
            result.records_replayed += 1;

            if scanned.record.is_live() {
                let entry = KeyDirEntry {
                    value_size: scanned.record.value.len() as u32,
                    value_position: scanned.value_position(),
                    timestamp: scanned.record.timestamp,
                };
                keydir.set(scanned.record.key, entry);
            } else {
                result.tombstones += 1;
                keydir.remove(&scanned.record.key);
            }
        }

        result.live_keys = keydir.len();
        result.bytes = reader.position();

        Ok((keydir, result))
    }

    /// Verify integrity of a log file without opening an engine on it
    pub fn verify(path: &Path) -> Result<RecoveryResult> {
        let file = File::open(path)?;
        let (_, result) = Self::replay(&file)?;
        Ok(result)
    }
}
