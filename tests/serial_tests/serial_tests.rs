//! Tests for the serialization boundary
//!
//! These tests verify:
//! - Serializable save/load through the store
//! - Length declaration mismatches
//! - bincode value encoding (fixed little-endian layout)
//! - serde values through the store

use bytes::{Buf, BufMut, BytesMut};
use nvstore::device::MemDevice;
use nvstore::serial::{decode_value, encode_value};
use nvstore::{ObjectStore, Serializable, StoreError};
use serde::{Deserialize, Serialize};

// =============================================================================
// Helper Types
// =============================================================================

fn setup_store(capacity: usize) -> ObjectStore<MemDevice> {
    let mut store = ObjectStore::new(MemDevice::new(capacity)).unwrap();
    store.reset().unwrap();
    store
}

/// A reading as stored on the device: one tag byte, two samples
#[derive(Debug, Default, Clone, PartialEq)]
struct Reading {
    tag: u8,
    samples: [i16; 2],
}

/// A variable-length list of boxed readings, flattened with a count prefix
#[derive(Debug, Default, PartialEq)]
struct Log {
    readings: Vec<Box<Reading>>,
}

const READING_LEN: usize = 5;

impl Serializable for Reading {
    fn byte_len(&self) -> usize {
        READING_LEN
    }

    fn write_to(&self, buf: &mut BytesMut) {
        buf.put_u8(self.tag);
        for sample in self.samples {
            buf.put_i16_le(sample);
        }
    }

    fn read_from(&mut self, buf: &mut &[u8]) -> nvstore::Result<()> {
        if buf.remaining() < READING_LEN {
            return Err(StoreError::Serialization("truncated reading".to_string()));
        }
        self.tag = buf.get_u8();
        for sample in self.samples.iter_mut() {
            *sample = buf.get_i16_le();
        }
        Ok(())
    }
}

impl Serializable for Log {
    fn byte_len(&self) -> usize {
        1 + self.readings.iter().map(|r| r.byte_len()).sum::<usize>()
    }

    fn write_to(&self, buf: &mut BytesMut) {
        buf.put_u8(self.readings.len() as u8);
        for reading in &self.readings {
            reading.write_to(buf);
        }
    }

    fn read_from(&mut self, buf: &mut &[u8]) -> nvstore::Result<()> {
        if !buf.has_remaining() {
            return Err(StoreError::Serialization("missing count".to_string()));
        }
        let count = buf.get_u8();
        self.readings.clear();
        for _ in 0..count {
            let mut reading = Box::<Reading>::default();
            reading.read_from(buf)?;
            self.readings.push(reading);
        }
        Ok(())
    }
}

/// Declares more bytes than it writes
struct Liar;

impl Serializable for Liar {
    fn byte_len(&self) -> usize {
        4
    }

    fn write_to(&self, buf: &mut BytesMut) {
        buf.put_u8(1);
    }

    fn read_from(&mut self, _buf: &mut &[u8]) -> nvstore::Result<()> {
        Ok(())
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Settings {
    brightness: u8,
    offset: i32,
    name: String,
}

// =============================================================================
// Serializable Tests
// =============================================================================

#[test]
fn test_save_load_serial() {
    let mut store = setup_store(64);
    let reading = Reading { tag: 3, samples: [-100, 2500] };

    store.save_serial(1, &reading).unwrap();

    let mut loaded = Reading::default();
    store.load_serial(1, &mut loaded).unwrap();
    assert_eq!(loaded, reading);
    assert_eq!(store.object_data(1).unwrap().size as usize, READING_LEN);
}

#[test]
fn test_serial_byte_layout() {
    let mut store = setup_store(32);

    store.save_serial(1, &Reading { tag: 0xAA, samples: [1, -1] }).unwrap();

    assert_eq!(store.load_vec(1).unwrap(), vec![0xAA, 0x01, 0x00, 0xFF, 0xFF]);
}

#[test]
fn test_save_load_composite_serial() {
    let mut store = setup_store(128);
    let log = Log {
        readings: vec![
            Box::new(Reading { tag: 1, samples: [10, 20] }),
            Box::new(Reading { tag: 2, samples: [30, 40] }),
            Box::new(Reading { tag: 3, samples: [50, 60] }),
        ],
    };

    store.save_serial(7, &log).unwrap();

    let mut loaded = Log::default();
    store.load_serial(7, &mut loaded).unwrap();
    assert_eq!(loaded, log);
}

#[test]
fn test_load_serial_missing() {
    let mut store = setup_store(32);

    let mut reading = Reading { tag: 9, samples: [9, 9] };
    let result = store.load_serial(1, &mut reading);

    assert!(matches!(result, Err(StoreError::NotFound { id: 1 })));
    assert_eq!(reading.tag, 9);
}

#[test]
fn test_load_serial_truncated() {
    let mut store = setup_store(32);
    store.save(1, &[1, 2]).unwrap();

    let mut reading = Reading::default();
    let result = store.load_serial(1, &mut reading);

    assert!(matches!(result, Err(StoreError::Serialization(_))));
}

#[test]
fn test_save_serial_length_mismatch() {
    let mut store = setup_store(32);

    let result = store.save_serial(1, &Liar);

    assert!(matches!(result, Err(StoreError::Serialization(_))));
    assert!(!store.exists(1).unwrap());
}

// =============================================================================
// serde Value Tests
// =============================================================================

#[test]
fn test_encode_value_little_endian() {
    let bytes = encode_value(&0x01020304u32).unwrap();

    assert_eq!(bytes, vec![0x04, 0x03, 0x02, 0x01]);
}

#[test]
fn test_decode_value_rejects_trailing_bytes() {
    let result = decode_value::<u16>(&[1, 2, 3]);

    assert!(matches!(result, Err(StoreError::Serialization(_))));
}

#[test]
fn test_save_load_value() {
    let mut store = setup_store(128);
    let settings = Settings {
        brightness: 200,
        offset: -42,
        name: "porch".to_string(),
    };

    store.save_value(2, &settings).unwrap();
    let loaded: Settings = store.load_value(2).unwrap();

    assert_eq!(loaded, settings);
}

#[test]
fn test_save_value_array() {
    let mut store = setup_store(64);
    let grid = [[1u16, 2, 3], [4, 5, 6]];

    store.save_value(1, &grid).unwrap();

    assert_eq!(store.object_data(1).unwrap().size, 12);
    let loaded: [[u16; 3]; 2] = store.load_value(1).unwrap();
    assert_eq!(loaded, grid);
}

#[test]
fn test_load_value_missing() {
    let mut store = setup_store(32);

    let result = store.load_value::<u32>(4);

    assert!(matches!(result, Err(StoreError::NotFound { id: 4 })));
}
