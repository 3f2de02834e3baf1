//! Directory Module
//!
//! The ordered (id, size) table persisted at the tail of the region.
//!
//! ## Responsibilities
//! - Read and validate the persisted directory
//! - Rewrite records and count after a mutation
//! - Derive payload addresses by prefix sum over insertion order
//! - Account for payload and directory overhead
//!
//! ## Layout
//! ```text
//! ┌──────────────────────┬─────────┬───────────┬─────┬─────────────┬───────────┐
//! │ Payload (packed)     │  free   │ Entry_0   │ ... │ Entry_{n-1} │ Count (1) │
//! └──────────────────────┴─────────┴───────────┴─────┴─────────────┴───────────┘
//! 0                                 cap-1-n*3                       cap-1
//! ```

mod entry;

pub use entry::{Entry, ENTRY_SIZE};

use std::collections::HashSet;

use bytes::BytesMut;
use tracing::warn;

use crate::device::Device;
use crate::error::{Result, StoreError};

/// Size of the object count stored in the last byte
pub const COUNT_SIZE: usize = 1;

/// Most entries a one-byte count can describe
pub const MAX_ENTRIES: usize = u8::MAX as usize;

/// Directory overhead (count byte + records) for `count` entries
pub fn overhead_for(count: usize) -> usize {
    COUNT_SIZE + count * ENTRY_SIZE
}

/// In-memory copy of the persisted directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    /// Entries in allocation order
    entries: Vec<Entry>,
}

impl Directory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Read only the object count from the last byte
    pub fn read_count<D: Device>(device: &mut D) -> Result<u8> {
        let capacity = device.len();
        if capacity < COUNT_SIZE {
            return Err(StoreError::Config(
                "Device too small to hold a directory".to_string(),
            ));
        }
        device.read(capacity - COUNT_SIZE)
    }

    /// Load and validate the directory from the tail of the device
    pub fn load<D: Device>(device: &mut D) -> Result<Self> {
        let capacity = device.len();
        let count = Self::read_count(device)? as usize;

        let overhead = overhead_for(count);
        if overhead > capacity {
            warn!(count, capacity, "directory count exceeds device capacity");
            return Err(StoreError::Corrupted(format!(
                "{} entries need {} bytes of directory, device holds {}",
                count, overhead, capacity
            )));
        }

        let mut raw = vec![0u8; count * ENTRY_SIZE];
        device.read_into(capacity - overhead, &mut raw)?;

        let mut buf = raw.as_slice();
        let mut entries = Vec::with_capacity(count);
        let mut seen = HashSet::with_capacity(count);
        while let Some(entry) = Entry::decode(&mut buf) {
            if !seen.insert(entry.id) {
                warn!(id = entry.id, "duplicate id in directory");
                return Err(StoreError::Corrupted(format!(
                    "Duplicate object id {}",
                    entry.id
                )));
            }
            entries.push(entry);
        }

        let directory = Self { entries };
        if directory.footprint() > capacity {
            warn!(
                payload = directory.payload_total(),
                capacity, "directory payload exceeds device capacity"
            );
            return Err(StoreError::Corrupted(format!(
                "Directory describes {} bytes, device holds {}",
                directory.footprint(),
                capacity
            )));
        }

        Ok(directory)
    }

    /// Write records then count to the tail of the device
    pub fn persist<D: Device>(&self, device: &mut D) -> Result<()> {
        let capacity = device.len();
        let overhead = self.overhead();
        if overhead > capacity {
            return Err(StoreError::CapacityExceeded {
                needed: overhead,
                capacity,
            });
        }

        let mut buf = BytesMut::with_capacity(self.entries.len() * ENTRY_SIZE);
        for entry in &self.entries {
            entry.encode(&mut buf);
        }

        device.update_from(capacity - overhead, &buf)?;
        device.update(capacity - COUNT_SIZE, self.entries.len() as u8)?;
        Ok(())
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Index of the entry with `id`
    pub fn position(&self, id: u8) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    /// Entry with `id`
    pub fn find(&self, id: u8) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Entry at `index`
    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    /// Payload address of the entry at `index` (sum of all earlier sizes)
    pub fn address_of(&self, index: usize) -> usize {
        self.entries[..index.min(self.entries.len())]
            .iter()
            .map(|e| e.size as usize)
            .sum()
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Append an entry; its payload lands after every existing entry
    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Drop the entry at `index`, shifting later entries forward
    pub fn remove(&mut self, index: usize) -> Entry {
        self.entries.remove(index)
    }

    // =========================================================================
    // Accounting
    // =========================================================================

    /// Sum of all payload sizes
    pub fn payload_total(&self) -> usize {
        self.entries.iter().map(|e| e.size as usize).sum()
    }

    /// Bytes taken by the count and records
    pub fn overhead(&self) -> usize {
        overhead_for(self.entries.len())
    }

    /// Payload plus directory overhead
    pub fn footprint(&self) -> usize {
        self.payload_total() + self.overhead()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in allocation order
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }
}

impl FromIterator<Entry> for Directory {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
