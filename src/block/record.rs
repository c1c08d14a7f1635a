//! Trace record types and frame codec
//!
//! The record frame format inside a decompressed page is:
//!
//! ```text
//! +------------------+
//! | Record Length    | (u32 LE, covers trace ID + payload)
//! +------------------+
//! | Trace ID         | (16 bytes)
//! +------------------+
//! | Payload          | (opaque serialized trace)
//! +------------------+
//! ```
//!
//! Frames are concatenated back to back; sequential parsing needs no
//! per-record index. The payload is never interpreted here.

use std::fmt;
use std::io::{self, Read};

/// Fixed-length trace identifier
///
/// Ordering is unsigned byte-wise comparison, which the derived array
/// ordering provides.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TraceId([u8; TraceId::LENGTH]);

impl TraceId {
    /// Identifier length in bytes
    pub const LENGTH: usize = 16;

    /// Create an identifier from raw bytes
    pub const fn new(bytes: [u8; TraceId::LENGTH]) -> Self {
        Self(bytes)
    }

    /// Create an identifier from a slice of exactly [`TraceId::LENGTH`] bytes
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != TraceId::LENGTH {
            return None;
        }
        let mut id = [0u8; TraceId::LENGTH];
        id.copy_from_slice(bytes);
        Some(Self(id))
    }

    /// Raw identifier bytes
    pub const fn as_bytes(&self) -> &[u8; TraceId::LENGTH] {
        &self.0
    }
}

impl From<[u8; TraceId::LENGTH]> for TraceId {
    fn from(bytes: [u8; TraceId::LENGTH]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for TraceId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TraceId({})", self)
    }
}

/// A single (identifier, payload) pair stored in a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Trace identifier, the sole sort and lookup key
    pub id: TraceId,
    /// Opaque serialized trace
    pub payload: Vec<u8>,
}

impl Record {
    /// Create a new record
    pub fn new(id: TraceId, payload: Vec<u8>) -> Self {
        Self { id, payload }
    }

    /// Serialized frame length: prefix + id + payload
    pub fn frame_len(&self) -> usize {
        4 + TraceId::LENGTH + self.payload.len()
    }

    /// Append this record's frame to `buf`
    ///
    /// Callers validate the payload size against u32 framing before any
    /// record reaches this point.
    pub fn write_frame(&self, buf: &mut Vec<u8>) {
        let body_len = (TraceId::LENGTH + self.payload.len()) as u32;
        buf.extend_from_slice(&body_len.to_le_bytes());
        buf.extend_from_slice(self.id.as_bytes());
        buf.extend_from_slice(&self.payload);
    }

    /// Parse one frame from the front of `data`
    ///
    /// Returns the record and the number of bytes consumed.
    pub fn read_frame(data: &[u8]) -> io::Result<(Self, usize)> {
        let mut cursor = io::Cursor::new(data);

        let mut len_buf = [0u8; 4];
        cursor.read_exact(&mut len_buf).map_err(|_| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "record frame truncated")
        })?;
        let body_len = u32::from_le_bytes(len_buf) as usize;

        if body_len < TraceId::LENGTH {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("record length {} shorter than identifier", body_len),
            ));
        }
        if data.len() < 4 + body_len {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "record truncated: expected {} bytes, got {}",
                    4 + body_len,
                    data.len()
                ),
            ));
        }

        let mut id = [0u8; TraceId::LENGTH];
        cursor.read_exact(&mut id)?;

        let mut payload = vec![0u8; body_len - TraceId::LENGTH];
        cursor.read_exact(&mut payload)?;

        Ok((Self::new(TraceId::new(id), payload), 4 + body_len))
    }
}
