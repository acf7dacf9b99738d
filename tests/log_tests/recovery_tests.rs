//! Tests for log replay
//!
//! These tests verify:
//! - Replay of an empty log
//! - Last-write-wins and tombstone removal during replay
//! - Value positions point at the value bytes in the file
//! - Truncated tails and checksum mismatches fail with CorruptLog
//! - Verify mode (stats only)

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use logcask::log::{LogReader, LogRecovery, Record, Tombstone, HEADER_SIZE};
use logcask::CaskError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_log() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("test.log");
    (temp_dir, path)
}

fn live(key: &str, value: &str) -> Record {
    Record::new(key.as_bytes().to_vec(), value.as_bytes().to_vec(), Tombstone::Live, 10)
}

fn deleted(key: &str, value: &str) -> Record {
    Record::new(key.as_bytes().to_vec(), value.as_bytes().to_vec(), Tombstone::Deleted, 11)
}

/// Write raw encoded records directly to a file (for crafting logs)
fn write_records(path: &Path, records: &[Record]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for record in records {
        bytes.extend_from_slice(&record.encode().unwrap());
    }
    let mut file = File::create(path).unwrap();
    file.write_all(&bytes).unwrap();
    file.sync_all().unwrap();
    bytes
}

fn replay(path: &Path) -> logcask::Result<(logcask::keydir::KeyDir, logcask::log::RecoveryResult)> {
    let file = File::open(path).unwrap();
    LogRecovery::replay(&file)
}

// =============================================================================
// Clean Log Tests
// =============================================================================

#[test]
fn test_replay_empty_log() {
    let (_temp, path) = setup_temp_log();
    File::create(&path).unwrap();

    let (keydir, result) = replay(&path).unwrap();

    assert!(keydir.is_empty());
    assert_eq!(result.records_replayed, 0);
    assert_eq!(result.tombstones, 0);
    assert_eq!(result.live_keys, 0);
    assert_eq!(result.bytes, 0);
}

#[test]
fn test_replay_single_record() {
    let (_temp, path) = setup_temp_log();
    let bytes = write_records(&path, &[live("name", "John Doe")]);

    let (keydir, result) = replay(&path).unwrap();

    let entry = keydir.get(b"name").unwrap();
    assert_eq!(entry.value_size, 8);
    assert_eq!(entry.value_position, (HEADER_SIZE + 4) as u64);
    assert_eq!(entry.timestamp, 10);
    assert_eq!(result.records_replayed, 1);
    assert_eq!(result.bytes, bytes.len() as u64);
}

#[test]
fn test_replay_last_write_wins() {
    let (_temp, path) = setup_temp_log();
    let bytes = write_records(
        &path,
        &[live("name", "John Doe"), live("other", "x"), live("name", "Jane Doe")],
    );

    let (keydir, result) = replay(&path).unwrap();

    let entry = keydir.get(b"name").unwrap();
    let start = entry.value_position as usize;
    assert_eq!(&bytes[start..start + entry.value_size as usize], b"Jane Doe");
    assert_eq!(keydir.len(), 2);
    assert_eq!(result.records_replayed, 3);
    assert_eq!(result.live_keys, 2);
}

#[test]
fn test_replay_tombstone_removes_key() {
    let (_temp, path) = setup_temp_log();
    write_records(&path, &[live("a", "1"), live("b", "2"), deleted("a", "1")]);

    let (keydir, result) = replay(&path).unwrap();

    assert!(keydir.get(b"a").is_none());
    assert!(keydir.get(b"b").is_some());
    assert_eq!(result.tombstones, 1);
    assert_eq!(result.live_keys, 1);
}

#[test]
fn test_replay_put_after_delete_revives_key() {
    let (_temp, path) = setup_temp_log();
    let bytes = write_records(&path, &[live("a", "1"), deleted("a", "1"), live("a", "again")]);

    let (keydir, _) = replay(&path).unwrap();

    let entry = keydir.get(b"a").unwrap();
    let start = entry.value_position as usize;
    assert_eq!(&bytes[start..start + entry.value_size as usize], b"again");
}

#[test]
fn test_reader_reports_offsets_in_write_order() {
    let (_temp, path) = setup_temp_log();
    let records = [live("a", "1"), live("bb", "22"), deleted("a", "1")];
    write_records(&path, &records);

    let scanned: Vec<_> = LogReader::new(File::open(&path).unwrap())
        .collect::<logcask::Result<_>>()
        .unwrap();

    assert_eq!(scanned.len(), 3);
    let mut expected_offset = 0u64;
    for (scan, record) in scanned.iter().zip(records.iter()) {
        assert_eq!(scan.offset, expected_offset);
        assert_eq!(scan.len, record.encoded_len() as u64);
        assert_eq!(&scan.record, record);
        expected_offset += scan.len;
    }
}

// =============================================================================
// Corruption Tests
// =============================================================================

#[test]
fn test_replay_truncated_body_is_corrupt() {
    let (_temp, path) = setup_temp_log();
    let bytes = write_records(&path, &[live("a", "1"), live("b", "two")]);
    fs::write(&path, &bytes[..bytes.len() - 2]).unwrap();

    let first_len = live("a", "1").encoded_len() as u64;
    match replay(&path) {
        Err(CaskError::CorruptLog { offset, .. }) => assert_eq!(offset, first_len),
        other => panic!("expected CorruptLog, got {:?}", other.map(|(_, r)| r)),
    }
}

#[test]
fn test_replay_truncated_header_is_corrupt() {
    let (_temp, path) = setup_temp_log();
    let bytes = write_records(&path, &[live("a", "1"), live("b", "2")]);
    let first_len = live("a", "1").encoded_len();
    fs::write(&path, &bytes[..first_len + 5]).unwrap();

    let result = replay(&path);
    assert!(matches!(result, Err(CaskError::CorruptLog { .. })));
}

#[test]
fn test_replay_checksum_mismatch_is_corrupt() {
    let (_temp, path) = setup_temp_log();
    let mut bytes = write_records(&path, &[live("a", "1"), live("b", "2"), live("c", "3")]);
    let record_len = live("a", "1").encoded_len();
    // flip the value byte of the middle record
    bytes[2 * record_len - 1] ^= 0x01;
    fs::write(&path, &bytes).unwrap();

    match replay(&path) {
        Err(CaskError::CorruptLog { offset, reason }) => {
            assert_eq!(offset, record_len as u64);
            assert!(reason.contains("checksum"));
        }
        other => panic!("expected CorruptLog, got {:?}", other.map(|(_, r)| r)),
    }
}

#[test]
fn test_replay_garbage_length_is_corrupt() {
    let (_temp, path) = setup_temp_log();
    let mut bytes = write_records(&path, &[live("a", "1")]);
    // declare an enormous value length with nothing behind it
    bytes[13..17].copy_from_slice(&u32::MAX.to_le_bytes());
    fs::write(&path, &bytes).unwrap();

    let result = replay(&path);
    assert!(matches!(result, Err(CaskError::CorruptLog { .. })));
}

#[test]
fn test_reader_stops_after_error() {
    let (_temp, path) = setup_temp_log();
    let bytes = write_records(&path, &[live("a", "1"), live("b", "2")]);
    fs::write(&path, &bytes[..bytes.len() - 1]).unwrap();

    let mut reader = LogReader::new(File::open(&path).unwrap());

    assert!(reader.next().unwrap().is_ok());
    assert!(reader.next().unwrap().is_err());
    assert!(reader.next().is_none());
}

// =============================================================================
// Verify Tests
// =============================================================================

#[test]
fn test_verify_reports_stats() {
    let (_temp, path) = setup_temp_log();
    let bytes = write_records(
        &path,
        &[live("a", "1"), live("b", "2"), live("a", "3"), deleted("b", "2")],
    );

    let result = LogRecovery::verify(&path).unwrap();

    assert_eq!(result.records_replayed, 4);
    assert_eq!(result.tombstones, 1);
    assert_eq!(result.live_keys, 1);
    assert_eq!(result.bytes, bytes.len() as u64);
}

#[test]
fn test_verify_missing_file_is_io_error() {
    let (_temp, path) = setup_temp_log();

    let result = LogRecovery::verify(&path);
    assert!(matches!(result, Err(CaskError::Io(_))));
}

#[test]
fn test_verify_does_not_modify_corrupt_log() {
    let (_temp, path) = setup_temp_log();
    let bytes = write_records(&path, &[live("a", "1"), live("b", "2")]);
    let truncated = &bytes[..bytes.len() - 1];
    fs::write(&path, truncated).unwrap();

    assert!(LogRecovery::verify(&path).is_err());
    assert_eq!(fs::read(&path).unwrap(), truncated);
}
