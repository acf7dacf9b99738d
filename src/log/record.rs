//! Log record codec
//!
//! Encodes a (key, value, tombstone, timestamp) tuple into the fixed-header
//! on-disk record and decodes/validates it back.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{CaskError, Result};

/// Fixed header: checksum (4) + tombstone (1) + timestamp (4) + key len (4) + value len (4)
pub const HEADER_SIZE: usize = 17;

const CRC_SIZE: usize = 4;

/// Marks whether a record carries a live value or deletes its key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tombstone {
    Live = 0x7F,
    Deleted = 0xFF,
}

impl Tombstone {
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x7F => Some(Tombstone::Live),
            0xFF => Some(Tombstone::Deleted),
            _ => None,
        }
    }
}

/// Parsed fixed-size header of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub checksum: u32,
    pub tombstone: u8,
    pub timestamp: u32,
    pub key_len: u32,
    pub value_len: u32,
}

impl RecordHeader {
    pub fn parse(header: &[u8; HEADER_SIZE]) -> Self {
        Self {
            checksum: read_u32(header, 0),
            tombstone: header[4],
            timestamp: read_u32(header, 5),
            key_len: read_u32(header, 9),
            value_len: read_u32(header, 13),
        }
    }

    /// Number of bytes following the header (key + value)
    pub fn body_len(&self) -> u64 {
        self.key_len as u64 + self.value_len as u64
    }

    /// Total encoded length of the record this header starts
    pub fn record_len(&self) -> u64 {
        HEADER_SIZE as u64 + self.body_len()
    }
}

/// A single immutable record of the log
///
/// On-disk format (little-endian):
/// ```text
/// ┌──────────┬─────────┬───────────┬───────────┬───────────┬───────────┬─────────────┐
/// │ CRC (4B) │ Tomb(1B)│ Time (4B) │ KeyLen(4B)│ ValLen(4B)│ Key (var) │ Value (var) │
/// └──────────┴─────────┴───────────┴───────────┴───────────┴───────────┴─────────────┘
/// ```
///
/// The CRC-32 (IEEE) covers every byte after the CRC field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub tombstone: Tombstone,
    pub timestamp: u32,
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl Record {
    pub fn new(key: Vec<u8>, value: Vec<u8>, tombstone: Tombstone, timestamp: u32) -> Self {
        Self {
            tombstone,
            timestamp,
            key,
            value,
        }
    }

    /// A live record stamped with the current time.
    pub fn live(key: Vec<u8>, value: Vec<u8>) -> Self {
        Self::new(key, value, Tombstone::Live, unix_now())
    }

    /// A deletion record stamped with the current time. `value` is the last
    /// known value and is kept for diagnostics only.
    pub fn deleted(key: Vec<u8>, value: Vec<u8>) -> Self {
        Self::new(key, value, Tombstone::Deleted, unix_now())
    }

    pub fn is_live(&self) -> bool {
        self.tombstone == Tombstone::Live
    }

    /// Size of this record when encoded
    pub fn encoded_len(&self) -> usize {
        HEADER_SIZE + self.key.len() + self.value.len()
    }

    /// Serialize to bytes, checksum included.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let key_len = field_len("key", self.key.len())?;
        let value_len = field_len("value", self.value.len())?;

        let mut buf = Vec::with_capacity(self.encoded_len());

        // Reserve space for CRC (filled at the end)
        buf.extend_from_slice(&[0u8; CRC_SIZE]);
        buf.push(self.tombstone as u8);
        buf.extend_from_slice(&self.timestamp.to_le_bytes());
        buf.extend_from_slice(&key_len.to_le_bytes());
        buf.extend_from_slice(&value_len.to_le_bytes());
        buf.extend_from_slice(&self.key);
        buf.extend_from_slice(&self.value);

        let crc = crc32fast::hash(&buf[CRC_SIZE..]);
        buf[0..CRC_SIZE].copy_from_slice(&crc.to_le_bytes());

        Ok(buf)
    }

    /// Deserialize a record. The checksum is NOT verified here; see [`Record::validate`].
    pub fn decode(data: &[u8]) -> Result<Self> {
        Self::decode_at(data, 0)
    }

    /// Like [`Record::decode`], reporting failures against log offset `offset`.
    pub(crate) fn decode_at(data: &[u8], offset: u64) -> Result<Self> {
        let header = header_of(data)
            .ok_or_else(|| CaskError::corrupt(offset, "record shorter than header"))?;

        let tombstone = Tombstone::from_u8(header.tombstone).ok_or_else(|| {
            CaskError::corrupt(
                offset,
                format!("unknown tombstone byte {:#04x}", header.tombstone),
            )
        })?;

        let key_end = HEADER_SIZE + header.key_len as usize;
        let value_end = key_end + header.value_len as usize;
        if data.len() < value_end {
            return Err(CaskError::corrupt(
                offset,
                format!("record truncated: need {} bytes, have {}", value_end, data.len()),
            ));
        }

        Ok(Self {
            tombstone,
            timestamp: header.timestamp,
            key: data[HEADER_SIZE..key_end].to_vec(),
            value: data[key_end..value_end].to_vec(),
        })
    }

    /// Recompute the CRC over tombstone..end of value and compare with the stored one.
    pub fn validate(data: &[u8]) -> bool {
        let Some(header) = header_of(data) else {
            return false;
        };
        let end = HEADER_SIZE as u64 + header.body_len();
        if (data.len() as u64) < end {
            return false;
        }
        crc32fast::hash(&data[CRC_SIZE..end as usize]) == header.checksum
    }
}

fn header_of(data: &[u8]) -> Option<RecordHeader> {
    let header: &[u8; HEADER_SIZE] = data.get(..HEADER_SIZE)?.try_into().ok()?;
    Some(RecordHeader::parse(header))
}

fn read_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

fn field_len(field: &str, len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        CaskError::InvalidInput(format!(
            "{} length {} exceeds {} bytes",
            field,
            len,
            u32::MAX
        ))
    })
}

/// Current Unix time in seconds, saturating into 32 bits.
pub(crate) fn unix_now() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u32::try_from(d.as_secs()).unwrap_or(u32::MAX))
        .unwrap_or(0)
}
