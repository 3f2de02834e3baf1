//! Device Module
//!
//! The persistence primitive the object store is built on.
//!
//! ## Responsibilities
//! - Expose a fixed-length, byte-addressable region
//! - Single-byte reads
//! - Single-byte conditional writes (write only when the value changes,
//!   sparing EEPROM write cycles)
//! - Surface physical I/O failures as errors
//!
//! ## Implementations
//! - [`MemDevice`]: RAM-backed region, counts physical writes
//! - [`FileDevice`]: flat image file, one byte per address

mod file;
mod memory;

pub use file::FileDevice;
pub use memory::MemDevice;

use crate::error::{Result, StoreError};

/// Value of a freshly erased EEPROM cell
pub const ERASED_BYTE: u8 = 0xFF;

/// A fixed-length addressable byte array
///
/// The object store treats this as its only I/O boundary.
pub trait Device {
    /// Total addressable bytes
    fn len(&self) -> usize;

    /// Read one byte
    fn read(&mut self, addr: usize) -> Result<u8>;

    /// Write one byte if it differs from the stored value
    fn update(&mut self, addr: usize, value: u8) -> Result<()>;

    /// Push buffered writes to the physical medium
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read `buf.len()` consecutive bytes starting at `addr`
    fn read_into(&mut self, addr: usize, buf: &mut [u8]) -> Result<()> {
        for (offset, byte) in buf.iter_mut().enumerate() {
            *byte = self.read(addr + offset)?;
        }
        Ok(())
    }

    /// Conditionally write consecutive bytes starting at `addr`
    fn update_from(&mut self, addr: usize, bytes: &[u8]) -> Result<()> {
        for (offset, &byte) in bytes.iter().enumerate() {
            self.update(addr + offset, byte)?;
        }
        Ok(())
    }
}

impl<D: Device + ?Sized> Device for &mut D {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn read(&mut self, addr: usize) -> Result<u8> {
        (**self).read(addr)
    }

    fn update(&mut self, addr: usize, value: u8) -> Result<()> {
        (**self).update(addr, value)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

/// Bounds check shared by the device implementations
pub(crate) fn check_bounds(addr: usize, len: usize) -> Result<()> {
    if addr >= len {
        return Err(StoreError::OutOfBounds { addr, len });
    }
    Ok(())
}
