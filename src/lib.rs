//! # nvstore
//!
//! ID-addressed object storage over a fixed-size non-volatile byte array
//! (EEPROM-style persistent memory):
//! - Objects are saved and loaded by a one-byte id instead of an address
//! - A small (id, size) directory lives at the tail of the region
//! - Payloads stay packed from address 0; removals compact the gap
//! - Byte writes only happen when a cell actually changes
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       ObjectStore                           │
//! │        save / load / remove / resize / format               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Directory  │          │   Payload   │
//!   │   (tail)    │          │  (packed)   │
//!   └──────┬──────┘          └──────┬──────┘
//!          └────────────┬───────────┘
//!                       ▼
//!               ┌───────────────┐
//!               │    Device     │
//!               │ (Mem / File)  │
//!               └───────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use nvstore::{MemDevice, ObjectStore};
//!
//! let mut store = ObjectStore::new(MemDevice::new(64)).unwrap();
//! store.reset().unwrap();
//! store.save(1, &[0xAA, 0xBB]).unwrap();
//!
//! let mut buf = [0u8; 2];
//! store.load(1, &mut buf).unwrap();
//! assert_eq!(buf, [0xAA, 0xBB]);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod device;
pub mod directory;
pub mod serial;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{StoreError, Result};
pub use config::Config;
pub use device::{Device, FileDevice, MemDevice};
pub use directory::Entry;
pub use serial::Serializable;
pub use store::ObjectStore;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of nvstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
