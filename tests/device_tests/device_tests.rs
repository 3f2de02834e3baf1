//! Tests for Devices
//!
//! These tests verify:
//! - Erased initial state
//! - Bounds checking
//! - Write-if-changed semantics
//! - File image creation, reopening and length validation

use std::fs;
use std::path::PathBuf;

use nvstore::device::{Device, FileDevice, MemDevice, ERASED_BYTE};
use nvstore::StoreError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_image() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("test.img");
    (temp_dir, path)
}

// =============================================================================
// MemDevice Tests
// =============================================================================

#[test]
fn test_mem_device_starts_erased() {
    let mut device = MemDevice::new(16);

    assert_eq!(device.len(), 16);
    for addr in 0..16 {
        assert_eq!(device.read(addr).unwrap(), ERASED_BYTE);
    }
}

#[test]
fn test_mem_device_read_write() {
    let mut device = MemDevice::new(8);

    device.update(3, 0x42).unwrap();

    assert_eq!(device.read(3).unwrap(), 0x42);
    assert_eq!(device.as_bytes()[3], 0x42);
}

#[test]
fn test_mem_device_skips_unchanged_writes() {
    let mut device = MemDevice::new(8);

    device.update(0, ERASED_BYTE).unwrap();
    assert_eq!(device.write_count(), 0);

    device.update(0, 0x01).unwrap();
    device.update(0, 0x01).unwrap();
    assert_eq!(device.write_count(), 1);
}

#[test]
fn test_mem_device_out_of_bounds() {
    let mut device = MemDevice::new(4);

    let read = device.read(4);
    assert!(matches!(read, Err(StoreError::OutOfBounds { addr: 4, len: 4 })));

    let write = device.update(10, 0);
    assert!(matches!(write, Err(StoreError::OutOfBounds { addr: 10, len: 4 })));
}

#[test]
fn test_mem_device_bulk_helpers() {
    let mut device = MemDevice::new(8);

    device.update_from(2, &[1, 2, 3]).unwrap();

    let mut buf = [0u8; 3];
    device.read_into(2, &mut buf).unwrap();
    assert_eq!(buf, [1, 2, 3]);
}

#[test]
fn test_mem_device_from_bytes() {
    let device = MemDevice::from_bytes(vec![1, 2, 3]);

    assert_eq!(device.len(), 3);
    assert_eq!(device.into_bytes(), vec![1, 2, 3]);
}

fn poke<D: Device>(mut device: D, addr: usize, value: u8) -> usize {
    device.update(addr, value).unwrap();
    device.len()
}

#[test]
fn test_device_through_mut_reference() {
    let mut device = MemDevice::new(4);

    let len = poke(&mut device, 1, 7);

    assert_eq!(len, 4);
    assert_eq!(device.as_bytes()[1], 7);
}

// =============================================================================
// FileDevice Tests
// =============================================================================

#[test]
fn test_file_device_creates_erased_image() {
    let (_temp, path) = setup_temp_image();

    let device = FileDevice::open(&path, 32).unwrap();

    assert_eq!(device.len(), 32);
    let contents = fs::read(&path).unwrap();
    assert_eq!(contents, vec![ERASED_BYTE; 32]);
}

#[test]
fn test_file_device_writes_through() {
    let (_temp, path) = setup_temp_image();

    let mut device = FileDevice::open(&path, 16).unwrap();
    device.update(5, 0xAB).unwrap();
    device.flush().unwrap();

    let contents = fs::read(&path).unwrap();
    assert_eq!(contents[5], 0xAB);
}

#[test]
fn test_file_device_reopen_preserves_contents() {
    let (_temp, path) = setup_temp_image();

    {
        let mut device = FileDevice::open(&path, 16).unwrap();
        device.update_from(0, b"hello").unwrap();
        device.flush().unwrap();
    }

    let mut device = FileDevice::open(&path, 16).unwrap();
    let mut buf = [0u8; 5];
    device.read_into(0, &mut buf).unwrap();
    assert_eq!(&buf, b"hello");
}

#[test]
fn test_file_device_rejects_length_mismatch() {
    let (_temp, path) = setup_temp_image();

    FileDevice::open(&path, 16).unwrap();
    let result = FileDevice::open(&path, 32);

    assert!(matches!(result, Err(StoreError::Config(_))));
}

#[test]
fn test_file_device_out_of_bounds() {
    let (_temp, path) = setup_temp_image();

    let mut device = FileDevice::open(&path, 8).unwrap();

    assert!(matches!(
        device.read(8),
        Err(StoreError::OutOfBounds { addr: 8, len: 8 })
    ));
}
