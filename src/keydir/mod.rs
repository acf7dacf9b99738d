//! Key Directory Module
//!
//! In-memory index from key to the location of its latest live value.
//!
//! ## Responsibilities
//! - One entry per live key; deleted keys have no entry at all
//! - Last write wins (the engine only sets after a durable append)
//! - Never persisted: always rebuilt by replaying the log

mod dir;

pub use dir::KeyDir;

/// Location of a key's current value in the log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyDirEntry {
    /// Length of the value in bytes
    pub value_size: u32,

    /// Offset of the value field (not the record start)
    pub value_position: u64,

    /// Unix seconds the record was written at
    pub timestamp: u32,
}
