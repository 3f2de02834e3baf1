//! Configuration for nvstore
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Id reserved for the format signature object unless configured otherwise
pub const DEFAULT_SIGNATURE_ID: u8 = 255;

/// Main configuration for an object store instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Device Configuration
    // -------------------------------------------------------------------------
    /// Path of the image file backing a file device
    pub image_path: PathBuf,

    /// Total addressable bytes of the storage region (1..=65535)
    pub capacity: u16,

    // -------------------------------------------------------------------------
    // Store Behaviour
    // -------------------------------------------------------------------------
    /// Allow `save` to relocate an existing id whose size changed
    pub resize_on_mismatch: bool,

    /// Id under which the format signature is stored
    pub signature_id: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image_path: PathBuf::from("./nvstore.img"),
            capacity: 1024, // 1 KB, a typical on-chip EEPROM
            resize_on_mismatch: false,
            signature_id: DEFAULT_SIGNATURE_ID,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the image file path
    pub fn image_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.image_path = path.into();
        self
    }

    /// Set the region capacity (in bytes)
    pub fn capacity(mut self, capacity: u16) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// Enable or disable resize-on-mismatch
    pub fn resize_on_mismatch(mut self, enabled: bool) -> Self {
        self.config.resize_on_mismatch = enabled;
        self
    }

    /// Set the id reserved for the format signature
    pub fn signature_id(mut self, id: u8) -> Self {
        self.config.signature_id = id;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
