//! Log Module
//!
//! The single append-only data file and everything that reads or writes it.
//!
//! ## Responsibilities
//! - Encode/decode records with a CRC-32 over everything but the CRC itself
//! - Append + fsync through one exclusively owned handle
//! - Positioned reads of a single value
//! - Full forward replay on open
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Record 1                                                     │
//! │ ┌─────────┬─────────┬─────────┬─────────┬─────────┬────────┐ │
//! │ │ CRC (4) │ Tomb(1) │ Time(4) │KeyLen(4)│ValLen(4)│Key|Val │ │
//! │ └─────────┴─────────┴─────────┴─────────┴─────────┴────────┘ │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Record 2                                                     │
//! │ ...                                                          │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod file;
mod reader;
mod record;
mod recovery;

pub use file::ActiveLog;
pub use reader::{LogReader, ScannedRecord};
pub use record::{Record, RecordHeader, Tombstone, HEADER_SIZE};
pub use recovery::{LogRecovery, RecoveryResult};
