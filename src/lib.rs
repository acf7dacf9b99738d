//! # logcask
//!
//! A log-structured key-value storage engine in the Bitcask family:
//! - Append-only record log with CRC-32 checksums
//! - In-memory key directory for O(1) lookups
//! - fsync before every index update
//! - Crash recovery by replaying the whole log
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  open(":memory:" | path)                     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ MemoryStore │          │  LogEngine  │
//!   └─────────────┘          └──────┬──────┘
//!                                   │
//!                      ┌────────────┴────────────┐
//!                      ▼                         ▼
//!               ┌─────────────┐          ┌─────────────┐
//!               │   KeyDir    │          │  ActiveLog  │
//!               │ (in memory) │          │  (append)   │
//!               └─────────────┘          └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod log;
pub mod keydir;
pub mod engine;
pub mod memory;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CaskError, Result};
pub use config::Config;
pub use engine::LogEngine;
pub use memory::MemoryStore;
pub use store::{Backend, KvStore, SharedStore, Store, MEMORY_IDENTIFIER};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of logcask
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Open a store by identifier: `":memory:"` for the in-memory backend,
/// anything else is the path of a log file (created if absent).
pub fn open(identifier: &str) -> Result<Store> {
    Store::open(Backend::parse(identifier))
}
