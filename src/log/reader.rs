//! Log Reader
//!
//! Sequential forward scan of a log, validating every record.

use std::io::{self, BufReader, ErrorKind, Read};

use crate::error::{CaskError, Result};

use super::record::{Record, RecordHeader, HEADER_SIZE};

/// A validated record together with where it sits in the log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedRecord {
    /// Offset of the first header byte
    pub offset: u64,
    /// Encoded length (header + key + value)
    pub len: u64,
    pub record: Record,
}

impl ScannedRecord {
    /// Offset of the value field
    pub fn value_position(&self) -> u64 {
        self.offset + self.len - self.record.value.len() as u64
    }
}

/// Reads records from the start of a log until a clean end-of-file.
///
/// Any truncated or checksum-failing record yields `CorruptLog` and ends the scan.
pub struct LogReader<R: Read> {
    reader: BufReader<R>,
    position: u64,
    done: bool,
}

impl<R: Read> LogReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
            position: 0,
            done: false,
        }
    }

    /// Bytes consumed so far (always a record boundary after a successful read)
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Read the next record. `Ok(None)` on a clean end-of-file at a record boundary.
    pub fn next_record(&mut self) -> Result<Option<ScannedRecord>> {
        let offset = self.position;

        let mut header = [0u8; HEADER_SIZE];
        let n = read_full(&mut self.reader, &mut header)?;
        if n == 0 {
            return Ok(None);
        }
        if n < HEADER_SIZE {
            return Err(CaskError::corrupt(
                offset,
                format!("truncated header: {} of {} bytes", n, HEADER_SIZE),
            ));
        }

        let parsed = RecordHeader::parse(&header);
        let body_len = parsed.body_len();

        // Grow with the bytes actually present; a garbage length must not
        // trigger a huge up-front allocation.
        let mut data = header.to_vec();
        let n = self.reader.by_ref().take(body_len).read_to_end(&mut data)? as u64;
        if n < body_len {
            return Err(CaskError::corrupt(
                offset,
                format!("truncated record: {} of {} body bytes", n, body_len),
            ));
        }

        if !Record::validate(&data) {
            return Err(CaskError::corrupt(offset, "checksum mismatch"));
        }

        let record = Record::decode_at(&data, offset)?;
        let len = parsed.record_len();
        self.position += len;

        Ok(Some(ScannedRecord {
            offset,
            len,
            record,
        }))
    }
}

impl<R: Read> Iterator for LogReader<R> {
    type Item = Result<ScannedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Fill `buf` as far as the input allows; returns bytes read (short only at EOF).
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
