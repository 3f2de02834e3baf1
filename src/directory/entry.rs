//! Directory entry record
//!
//! ```text
//! ┌─────────┬──────────────────┐
//! │ Id (1)  │ Size (2, LE)     │
//! └─────────┴──────────────────┘
//! ```

use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

/// Encoded size of one entry record: id (1) + size (2)
pub const ENTRY_SIZE: usize = 3;

/// Directory record pairing an object id with its payload length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entry {
    /// Caller-chosen identifier, unique within the directory
    pub id: u8,

    /// Payload length in bytes
    pub size: u16,
}

impl Entry {
    pub fn new(id: u8, size: u16) -> Self {
        Self { id, size }
    }

    /// Sentinel returned for ids that are not stored
    pub fn missing(id: u8) -> Self {
        Self { id, size: 0 }
    }

    /// Append the record to `buf`
    pub fn encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.id);
        buf.put_u16_le(self.size);
    }

    /// Decode one record, or None if fewer than ENTRY_SIZE bytes remain
    pub fn decode(buf: &mut impl Buf) -> Option<Self> {
        if buf.remaining() < ENTRY_SIZE {
            return None;
        }
        let id = buf.get_u8();
        let size = buf.get_u16_le();
        Some(Self { id, size })
    }
}
