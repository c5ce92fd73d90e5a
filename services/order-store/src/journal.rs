//! Append-only order journal with checksums
//!
//! Every committed order state (creation and each transition) is
//! appended as one record. Replay on open rebuilds the live map: the
//! highest-sequence record per order wins. A corrupt or short tail
//! (a crash mid-append) is truncated at recovery so the valid prefix
//! survives; corruption is never propagated into the store.
//!
//! # Binary format (per record)
//! ```text
//! [body_len:  u32]
//! [sequence:  u64]
//! [timestamp: i64]   // Unix microseconds
//! [payload_len: u32][payload: bytes]   // bincode-serialized Order
//! [checksum: u32]    // CRC32C over sequence+timestamp+payload
//! ```

use crc32c::crc32c;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Minimum body: 8 (seq) + 8 (ts) + 4 (payload_len) + 0 + 4 (crc)
const MIN_BODY_LEN: usize = 24;
/// Records larger than this are treated as corruption, not data.
const MAX_BODY_LEN: usize = 16_000_000;

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed record: {0}")]
    Malformed(String),
}

/// One persisted order snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalRecord {
    /// Monotonic per-journal sequence number.
    pub sequence: u64,
    /// Unix microseconds at append time.
    pub timestamp: i64,
    /// Bincode-serialized order.
    pub payload: Vec<u8>,
    /// CRC32C over (sequence ++ timestamp ++ payload).
    pub checksum: u32,
}

impl JournalRecord {
    /// Create a record, computing the checksum.
    pub fn new(sequence: u64, timestamp: i64, payload: Vec<u8>) -> Self {
        let checksum = Self::compute_checksum(sequence, timestamp, &payload);
        Self {
            sequence,
            timestamp,
            payload,
            checksum,
        }
    }

    pub fn compute_checksum(sequence: u64, timestamp: i64, payload: &[u8]) -> u32 {
        let mut buf = Vec::with_capacity(16 + payload.len());
        buf.extend_from_slice(&sequence.to_le_bytes());
        buf.extend_from_slice(&timestamp.to_le_bytes());
        buf.extend_from_slice(payload);
        crc32c(&buf)
    }

    pub fn verify_checksum(&self) -> bool {
        self.checksum == Self::compute_checksum(self.sequence, self.timestamp, &self.payload)
    }

    /// Serialize to the binary format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let payload_len = self.payload.len() as u32;
        let body_len = (MIN_BODY_LEN + self.payload.len()) as u32;

        let mut buf = Vec::with_capacity(4 + body_len as usize);
        buf.extend_from_slice(&body_len.to_le_bytes());
        buf.extend_from_slice(&self.sequence.to_le_bytes());
        buf.extend_from_slice(&self.timestamp.to_le_bytes());
        buf.extend_from_slice(&payload_len.to_le_bytes());
        buf.extend_from_slice(&self.payload);
        buf.extend_from_slice(&self.checksum.to_le_bytes());
        buf
    }

    /// Deserialize one record from `data`, returning `(record, consumed)`.
    pub fn from_bytes(data: &[u8]) -> Result<(Self, usize), JournalError> {
        if data.len() < 4 {
            return Err(JournalError::Malformed("short length prefix".into()));
        }
        let body_len = u32::from_le_bytes(data[0..4].try_into().expect("4 bytes")) as usize;
        if !(MIN_BODY_LEN..=MAX_BODY_LEN).contains(&body_len) {
            return Err(JournalError::Malformed(format!(
                "implausible body length {body_len}"
            )));
        }
        let total = 4 + body_len;
        if data.len() < total {
            return Err(JournalError::Malformed(format!(
                "incomplete record: need {total} bytes, have {}",
                data.len()
            )));
        }

        let body = &data[4..total];
        let sequence = u64::from_le_bytes(body[0..8].try_into().expect("8 bytes"));
        let timestamp = i64::from_le_bytes(body[8..16].try_into().expect("8 bytes"));
        let payload_len = u32::from_le_bytes(body[16..20].try_into().expect("4 bytes")) as usize;
        if 20 + payload_len + 4 != body.len() {
            return Err(JournalError::Malformed(format!(
                "payload length {payload_len} does not fit body of {} bytes",
                body.len()
            )));
        }
        let payload = body[20..20 + payload_len].to_vec();
        let checksum =
            u32::from_le_bytes(body[20 + payload_len..].try_into().expect("4 bytes"));

        let record = Self {
            sequence,
            timestamp,
            payload,
            checksum,
        };
        if !record.verify_checksum() {
            return Err(JournalError::Malformed(format!(
                "checksum mismatch for sequence {sequence}"
            )));
        }
        Ok((record, total))
    }
}

/// Append-only journal writer over a single file.
#[derive(Debug)]
pub struct Journal {
    writer: BufWriter<File>,
    path: PathBuf,
    next_sequence: u64,
}

impl Journal {
    /// Open (or create) the journal, replaying the valid prefix.
    ///
    /// Returns the journal positioned for appends plus every valid
    /// record in order. A corrupt tail is truncated away.
    pub fn open(path: impl AsRef<Path>) -> Result<(Self, Vec<JournalRecord>), JournalError> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)?;

        let mut data = Vec::new();
        file.read_to_end(&mut data)?;

        let mut records = Vec::new();
        let mut pos = 0usize;
        while pos < data.len() {
            match JournalRecord::from_bytes(&data[pos..]) {
                Ok((record, consumed)) => {
                    records.push(record);
                    pos += consumed;
                }
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        offset = pos,
                        %err,
                        "truncating corrupt journal tail"
                    );
                    file.set_len(pos as u64)?;
                    break;
                }
            }
        }
        file.seek(SeekFrom::End(0))?;

        let next_sequence = records.last().map(|r| r.sequence + 1).unwrap_or(0);
        Ok((
            Self {
                writer: BufWriter::new(file),
                path,
                next_sequence,
            },
            records,
        ))
    }

    /// Append one payload; flushed and fsynced before returning.
    /// Returns the assigned sequence number.
    pub fn append(&mut self, timestamp: i64, payload: Vec<u8>) -> Result<u64, JournalError> {
        let sequence = self.next_sequence;
        let record = JournalRecord::new(sequence, timestamp, payload);
        self.writer.write_all(&record.to_bytes())?;
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;
        self.next_sequence += 1;
        Ok(sequence)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
