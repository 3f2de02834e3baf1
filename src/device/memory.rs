//! In-memory device
//!
//! A RAM-backed region used for simulation, tests and benchmarks.

use crate::error::Result;

use super::{check_bounds, Device, ERASED_BYTE};

/// RAM-backed device
///
/// Tracks how many physical writes reached the cells, so callers can
/// observe the effect of write-if-changed updates.
#[derive(Debug, Clone)]
pub struct MemDevice {
    /// Cell contents
    cells: Vec<u8>,
    /// Number of writes that actually changed a cell
    writes: u64,
}

impl MemDevice {
    /// Create an erased device of `len` bytes
    pub fn new(len: usize) -> Self {
        Self::from_bytes(vec![ERASED_BYTE; len])
    }

    /// Wrap an existing image
    pub fn from_bytes(cells: Vec<u8>) -> Self {
        Self { cells, writes: 0 }
    }

    /// Raw view of the region
    pub fn as_bytes(&self) -> &[u8] {
        &self.cells
    }

    /// Consume the device, returning its image
    pub fn into_bytes(self) -> Vec<u8> {
        self.cells
    }

    /// Number of physical writes performed so far
    pub fn write_count(&self) -> u64 {
        self.writes
    }

    /// Reset the physical write counter
    pub fn reset_write_count(&mut self) {
        self.writes = 0;
    }
}

impl Device for MemDevice {
    fn len(&self) -> usize {
        self.cells.len()
    }

    fn read(&mut self, addr: usize) -> Result<u8> {
        check_bounds(addr, self.cells.len())?;
        Ok(self.cells[addr])
    }

    fn update(&mut self, addr: usize, value: u8) -> Result<()> {
        check_bounds(addr, self.cells.len())?;
        if self.cells[addr] != value {
            self.cells[addr] = value;
            self.writes += 1;
        }
        Ok(())
    }
}
