//! Error types for nvstore
//!
//! Provides a unified error type for all store and device operations.

use thiserror::Error;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Unified error type for nvstore operations
#[derive(Debug, Error)]
pub enum StoreError {
    // -------------------------------------------------------------------------
    // Device Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Address {addr} out of bounds for device of {len} bytes")]
    OutOfBounds { addr: usize, len: usize },

    // -------------------------------------------------------------------------
    // Directory Errors
    // -------------------------------------------------------------------------
    #[error("Object {id} not found")]
    NotFound { id: u8 },

    #[error("Directory corrupted: {0}")]
    Corrupted(String),

    #[error("Directory full: at most {max} objects can be stored")]
    DirectoryFull { max: usize },

    // -------------------------------------------------------------------------
    // Save/Load Errors
    // -------------------------------------------------------------------------
    #[error("Capacity exceeded: need {needed} bytes, device holds {capacity}")]
    CapacityExceeded { needed: usize, capacity: usize },

    #[error("Object {id} is stored with {stored} bytes, refusing to resize to {requested}")]
    SizeMismatch { id: u8, stored: u16, requested: usize },

    #[error("Destination buffer too small: need {needed} bytes, got {provided}")]
    BufferTooSmall { needed: usize, provided: usize },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<bincode::Error> for StoreError {
    fn from(err: bincode::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
