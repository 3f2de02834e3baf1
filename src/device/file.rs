//! File-backed device
//!
//! Stores the region as a flat image file, one byte per address. The whole
//! image is mirrored in memory for reads; writes go through to the file.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, StoreError};

use super::{check_bounds, Device, ERASED_BYTE};

/// Image file standing in for an EEPROM chip
pub struct FileDevice {
    /// Image file path
    path: PathBuf,
    /// Open handle (read + write)
    file: File,
    /// In-memory mirror of the image
    cells: Vec<u8>,
    /// Writes since the last flush
    dirty: bool,
}

impl FileDevice {
    /// Open an image of `len` bytes, creating an erased one if missing
    ///
    /// Fails with `StoreError::Config` if an existing image has a
    /// different length.
    pub fn open(path: &Path, len: usize) -> Result<Self> {
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)?;

        let file_len = file.metadata()?.len() as usize;

        let cells = if file_len == 0 {
            // Fresh image: fill with erased cells
            let cells = vec![ERASED_BYTE; len];
            file.write_all(&cells)?;
            file.sync_all()?;
            debug!(path = %path.display(), len, "created erased image");
            cells
        } else if file_len != len {
            return Err(StoreError::Config(format!(
                "Image {} holds {} bytes, expected {}",
                path.display(),
                file_len,
                len
            )));
        } else {
            let mut cells = vec![0u8; len];
            file.seek(SeekFrom::Start(0))?;
            file.read_exact(&mut cells)?;
            cells
        };

        Ok(Self {
            path: path.to_path_buf(),
            file,
            cells,
            dirty: false,
        })
    }

    /// Get the image path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Device for FileDevice {
    fn len(&self) -> usize {
        self.cells.len()
    }

    fn read(&mut self, addr: usize) -> Result<u8> {
        check_bounds(addr, self.cells.len())?;
        Ok(self.cells[addr])
    }

    fn update(&mut self, addr: usize, value: u8) -> Result<()> {
        check_bounds(addr, self.cells.len())?;
        if self.cells[addr] == value {
            return Ok(());
        }

        self.file.seek(SeekFrom::Start(addr as u64))?;
        self.file.write_all(&[value])?;
        self.cells[addr] = value;
        self.dirty = true;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.dirty {
            self.file.sync_data()?;
            self.dirty = false;
        }
        Ok(())
    }
}
