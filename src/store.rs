//! Object Store Module
//!
//! ID-addressed object storage on top of a [`Device`].
//!
//! ## Responsibilities
//! - Save, load and remove objects by id
//! - Keep the payload region packed (compaction on remove/resize)
//! - Refuse saves that would overflow the region
//! - First-boot formatting via a signature object
//!
//! Every operation re-reads the directory from the device, so the device is
//! the single source of truth and the store itself holds no cached state
//! beyond its configuration.

use std::path::Path;

use tracing::{debug, trace, warn};

use crate::config::Config;
use crate::device::{Device, FileDevice};
use crate::directory::{overhead_for, Directory, Entry, COUNT_SIZE, ENTRY_SIZE, MAX_ENTRIES};
use crate::error::{Result, StoreError};

/// Object store bound to a single device
///
/// ## Ownership
///
/// The store owns its device and every mutating operation takes `&mut self`,
/// so there is exactly one writer for the region at any time. Sharing a
/// store across threads is left to the caller.
pub struct ObjectStore<D: Device> {
    /// Persistence primitive holding payload and directory
    device: D,

    /// Total addressable bytes of the device
    capacity: u16,

    /// Whether `save` may relocate an id whose size changed
    resize_on_mismatch: bool,

    /// Id reserved for the format signature
    signature_id: u8,
}

impl ObjectStore<FileDevice> {
    /// Open a store over the image file named in `config`
    pub fn open(config: Config) -> Result<Self> {
        let device = FileDevice::open(&config.image_path, config.capacity as usize)?;
        Self::with_config(device, &config)
    }

    /// Open with a path and capacity (convenience method)
    ///
    /// Uses the default config otherwise.
    pub fn open_path(path: &Path, capacity: u16) -> Result<Self> {
        let config = Config::builder()
            .image_path(path)
            .capacity(capacity)
            .build();
        Self::open(config)
    }
}

impl<D: Device> ObjectStore<D> {
    /// Bind a store to `device` with default settings
    pub fn new(device: D) -> Result<Self> {
        Self::with_config(device, &Config::default())
    }

    /// Bind a store to `device`
    ///
    /// The capacity is taken from the device; `config.capacity` only sizes
    /// file images created by [`ObjectStore::open`].
    pub fn with_config(device: D, config: &Config) -> Result<Self> {
        let len = device.len();
        if len < COUNT_SIZE || len > u16::MAX as usize {
            return Err(StoreError::Config(format!(
                "Device capacity must be between {} and {} bytes, got {}",
                COUNT_SIZE,
                u16::MAX,
                len
            )));
        }

        Ok(Self {
            device,
            capacity: len as u16,
            resize_on_mismatch: config.resize_on_mismatch,
            signature_id: config.signature_id,
        })
    }

    // =========================================================================
    // Core Operations
    // =========================================================================

    /// Forget every stored object
    ///
    /// Only the count byte is written; payload bytes stay on the device as
    /// unreachable garbage until overwritten.
    pub fn reset(&mut self) -> Result<()> {
        self.device.update(self.capacity as usize - COUNT_SIZE, 0)?;
        self.device.flush()?;
        debug!("store reset");
        Ok(())
    }

    /// Store `data` under `id`
    ///
    /// - Existing id, same size: bytes are overwritten in place, nothing moves.
    /// - Existing id, new size: fails with `SizeMismatch` unless
    ///   resize-on-mismatch is enabled, in which case the old copy is
    ///   compacted out and the object is appended at the end.
    /// - New id: appended after every existing object.
    ///
    /// On any error the device is left as it was.
    pub fn save(&mut self, id: u8, data: &[u8]) -> Result<()> {
        let capacity = self.capacity as usize;
        let size = u16::try_from(data.len()).map_err(|_| StoreError::CapacityExceeded {
            needed: data.len() + overhead_for(1),
            capacity,
        })?;

        let mut directory = Directory::load(&mut self.device)?;

        if let Some(index) = directory.position(id) {
            let stored = directory.entries()[index].size;

            // Step 1: Same size, overwrite in place (no relocation)
            if stored == size {
                let addr = directory.address_of(index);
                self.device.update_from(addr, data)?;
                self.device.flush()?;
                debug!(id, size, addr, "overwrote object in place");
                return Ok(());
            }

            if !self.resize_on_mismatch {
                debug!(id, stored, requested = size, "refusing resize");
                return Err(StoreError::SizeMismatch {
                    id,
                    stored,
                    requested: data.len(),
                });
            }

            // Step 2: Resize, which must fit with the old copy gone
            let needed = directory.footprint() - stored as usize + data.len();
            self.check_fits(needed)?;

            self.compact_out(&directory, index)?;
            directory.remove(index);
            debug!(id, stored, requested = size, "resizing object");
        } else if directory.len() >= MAX_ENTRIES {
            return Err(StoreError::DirectoryFull { max: MAX_ENTRIES });
        }

        // Step 3: Append after every existing object
        let needed = directory.footprint() + ENTRY_SIZE + data.len();
        self.check_fits(needed)?;

        let addr = directory.payload_total();
        self.device.update_from(addr, data)?;
        directory.push(Entry::new(id, size));
        directory.persist(&mut self.device)?;
        self.device.flush()?;

        debug!(id, size, addr, count = directory.len(), "saved object");
        Ok(())
    }

    /// Copy the object stored under `id` into `dest`
    ///
    /// Returns the number of bytes copied (the stored size). `dest` is not
    /// touched when the id is missing or `dest` is too short.
    pub fn load(&mut self, id: u8, dest: &mut [u8]) -> Result<usize> {
        let directory = Directory::load(&mut self.device)?;
        let index = directory.position(id).ok_or(StoreError::NotFound { id })?;

        let size = directory.entries()[index].size as usize;
        if dest.len() < size {
            return Err(StoreError::BufferTooSmall {
                needed: size,
                provided: dest.len(),
            });
        }

        let addr = directory.address_of(index);
        self.device.read_into(addr, &mut dest[..size])?;
        Ok(size)
    }

    /// Load the object stored under `id` into a new buffer of its exact size
    pub fn load_vec(&mut self, id: u8) -> Result<Vec<u8>> {
        let directory = Directory::load(&mut self.device)?;
        let index = directory.position(id).ok_or(StoreError::NotFound { id })?;

        let mut buf = vec![0u8; directory.entries()[index].size as usize];
        self.device.read_into(directory.address_of(index), &mut buf)?;
        Ok(buf)
    }

    /// Remove the object stored under `id`
    ///
    /// Every object after it is shifted down to close the gap. Returns
    /// false (and writes nothing) if the id is not stored.
    pub fn remove(&mut self, id: u8) -> Result<bool> {
        let mut directory = Directory::load(&mut self.device)?;
        let Some(index) = directory.position(id) else {
            debug!(id, "remove of missing object ignored");
            return Ok(false);
        };

        self.compact_out(&directory, index)?;
        let removed = directory.remove(index);
        directory.persist(&mut self.device)?;
        self.device.flush()?;

        debug!(id, size = removed.size, count = directory.len(), "removed object");
        Ok(true)
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Allow or forbid `save` to resize an existing id
    pub fn set_resize_on_mismatch(&mut self, enabled: bool) {
        self.resize_on_mismatch = enabled;
    }

    pub fn resize_on_mismatch(&self) -> bool {
        self.resize_on_mismatch
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Directory entry for `id`, or `{id, size: 0}` if it is not stored
    ///
    /// A stored zero-length object looks the same as a missing one here;
    /// use [`ObjectStore::find`] to tell them apart.
    pub fn object_data(&mut self, id: u8) -> Result<Entry> {
        Ok(self.find(id)?.unwrap_or_else(|| Entry::missing(id)))
    }

    /// Directory entry for `id`, if stored
    pub fn find(&mut self, id: u8) -> Result<Option<Entry>> {
        let directory = Directory::load(&mut self.device)?;
        Ok(directory.find(id).copied())
    }

    pub fn exists(&mut self, id: u8) -> Result<bool> {
        Ok(self.find(id)?.is_some())
    }

    /// Number of stored objects (reads the count byte only)
    pub fn object_count(&mut self) -> Result<u8> {
        Directory::read_count(&mut self.device)
    }

    /// Payload address of `id`, or the capacity if it is not stored
    pub fn address(&mut self, id: u8) -> Result<u16> {
        let directory = Directory::load(&mut self.device)?;
        Ok(match directory.position(id) {
            Some(index) => directory.address_of(index) as u16,
            None => self.capacity,
        })
    }

    /// Snapshot of the directory in allocation order
    pub fn entries(&mut self) -> Result<Vec<Entry>> {
        let directory = Directory::load(&mut self.device)?;
        Ok(directory.entries().to_vec())
    }

    /// Payload bytes plus directory overhead
    pub fn used_bytes(&mut self) -> Result<usize> {
        Ok(Directory::load(&mut self.device)?.footprint())
    }

    /// Bytes still available for payload and new records
    pub fn free_bytes(&mut self) -> Result<usize> {
        Ok(self.capacity as usize - self.used_bytes()?)
    }

    /// Total addressable bytes of the device
    pub fn capacity(&self) -> u16 {
        self.capacity
    }

    // =========================================================================
    // Formatting
    // =========================================================================

    /// Id under which the format signature is stored
    pub fn signature_id(&self) -> u8 {
        self.signature_id
    }

    /// True if the region carries `signature`
    pub fn is_formatted(&mut self, signature: u16) -> Result<bool> {
        let id = self.signature_id;
        match self.find(id)? {
            Some(entry) if entry.size as usize == std::mem::size_of::<u16>() => {
                let mut buf = [0u8; 2];
                self.load(id, &mut buf)?;
                Ok(u16::from_le_bytes(buf) == signature)
            }
            _ => Ok(false),
        }
    }

    /// Store `signature` under the signature id
    pub fn write_signature(&mut self, signature: u16) -> Result<()> {
        let id = self.signature_id;
        self.save(id, &signature.to_le_bytes())
    }

    /// Reset the region and write `signature` unless it is already present
    ///
    /// Returns true if the region was (re)formatted. A directory that fails
    /// validation counts as unformatted.
    pub fn format_if_needed(&mut self, signature: u16) -> Result<bool> {
        match self.is_formatted(signature) {
            Ok(true) => return Ok(false),
            Ok(false) => {}
            Err(StoreError::Corrupted(reason)) => {
                warn!(%reason, "formatting over corrupted directory");
            }
            Err(e) => return Err(e),
        }

        self.reset()?;
        self.write_signature(signature)?;
        debug!(signature, "formatted region");
        Ok(true)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the underlying device
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Get the underlying device mutably
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Release the device
    pub fn into_device(self) -> D {
        self.device
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn check_fits(&self, needed: usize) -> Result<()> {
        let capacity = self.capacity as usize;
        if needed > capacity {
            debug!(needed, capacity, "not enough space");
            return Err(StoreError::CapacityExceeded { needed, capacity });
        }
        Ok(())
    }

    /// Shift the payload of every entry after `index` down over entry `index`
    ///
    /// Leaves the directory itself untouched.
    fn compact_out(&mut self, directory: &Directory, index: usize) -> Result<()> {
        let gap = directory.entries()[index].size as usize;
        let start = directory.address_of(index + 1);
        let end = directory.payload_total();

        if gap == 0 || start == end {
            return Ok(());
        }

        // Moving down, so ascending order never reads a byte already overwritten
        for src in start..end {
            let byte = self.device.read(src)?;
            self.device.update(src - gap, byte)?;
        }

        trace!(from = start, to = start - gap, len = end - start, "compacted payload");
        Ok(())
    }
}
