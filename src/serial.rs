//! Serialization boundary
//!
//! Two ways to turn structured values into the flat byte blobs the store
//! keeps:
//!
//! - [`Serializable`]: the type writes and reads its own bytes. Suited to
//!   composite shapes (nested arrays, boxed records) flattened by hand.
//! - [`encode_value`] / [`decode_value`]: any serde type, encoded with
//!   bincode using fixed-width little-endian integers, so the stored format
//!   never depends on in-memory layout.

use bincode::Options;
use bytes::BytesMut;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::device::Device;
use crate::error::{Result, StoreError};
use crate::store::ObjectStore;

/// A value that flattens itself into a byte buffer
pub trait Serializable {
    /// Exact number of bytes `write_to` produces
    fn byte_len(&self) -> usize;

    /// Append the encoded value to `buf`
    fn write_to(&self, buf: &mut BytesMut);

    /// Rebuild the value from `buf`, advancing it past what was consumed
    fn read_from(&mut self, buf: &mut &[u8]) -> Result<()>;
}

fn bincode_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .reject_trailing_bytes()
}

/// Encode a serde value into bytes
pub fn encode_value<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    Ok(bincode_options().serialize(value)?)
}

/// Decode a serde value from bytes produced by [`encode_value`]
pub fn decode_value<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(bincode_options().deserialize(bytes)?)
}

impl<D: Device> ObjectStore<D> {
    /// Save a [`Serializable`] value under `id`
    pub fn save_serial<S: Serializable + ?Sized>(&mut self, id: u8, value: &S) -> Result<()> {
        let len = value.byte_len();
        let mut buf = BytesMut::with_capacity(len);
        value.write_to(&mut buf);

        if buf.len() != len {
            return Err(StoreError::Serialization(format!(
                "Object {} declared {} bytes but wrote {}",
                id,
                len,
                buf.len()
            )));
        }

        self.save(id, &buf)
    }

    /// Load the object under `id` into a [`Serializable`] value
    pub fn load_serial<S: Serializable + ?Sized>(&mut self, id: u8, value: &mut S) -> Result<()> {
        let bytes = self.load_vec(id)?;
        let mut cursor = bytes.as_slice();
        value.read_from(&mut cursor)?;

        if !cursor.is_empty() {
            debug!(id, unread = cursor.len(), "serial load left bytes unread");
        }
        Ok(())
    }

    /// Save any serde value under `id`
    pub fn save_value<T: Serialize + ?Sized>(&mut self, id: u8, value: &T) -> Result<()> {
        let bytes = encode_value(value)?;
        self.save(id, &bytes)
    }

    /// Load a serde value stored with [`ObjectStore::save_value`]
    pub fn load_value<T: DeserializeOwned>(&mut self, id: u8) -> Result<T> {
        let bytes = self.load_vec(id)?;
        decode_value(&bytes)
    }
}
