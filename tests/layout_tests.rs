//! Tests for the on-disk file layout
//!
//! These tests verify:
//! - Header write/read roundtrip
//! - Version validation before the pointer is trusted
//! - The commit-point pointer overwrite

use std::io::Cursor;

use blobfile::layout::{self, FileHeader, FORMAT_VERSION, HEADER_SIZE, INDEX_PTR_OFFSET};
use blobfile::BlobFileError;

#[test]
fn test_initial_header() {
    let header = FileHeader::initial();

    assert_eq!(header.version, FORMAT_VERSION);
    assert_eq!(header.index_ptr, HEADER_SIZE);
}

#[test]
fn test_header_roundtrip() {
    let header = FileHeader {
        version: FORMAT_VERSION,
        index_ptr: 4096,
    };

    let mut buf = Vec::new();
    header.write_to(&mut buf).unwrap();
    assert_eq!(buf.len(), HEADER_SIZE as usize);

    let restored = FileHeader::read_from(&mut Cursor::new(buf)).unwrap();
    assert_eq!(restored, header);
}

#[test]
fn test_header_rejects_unknown_version() {
    let mut buf = Vec::new();
    buf.extend_from_slice(&7i32.to_le_bytes());
    buf.extend_from_slice(&HEADER_SIZE.to_le_bytes());

    let result = FileHeader::read_from(&mut Cursor::new(buf));
    assert!(matches!(result, Err(BlobFileError::UnsupportedVersion(7))));
}

#[test]
fn test_header_rejects_truncated_input() {
    let result = FileHeader::read_from(&mut Cursor::new(vec![1, 0, 0]));
    assert!(matches!(result, Err(BlobFileError::Io(_))));
}

#[test]
fn test_write_index_ptr_overwrites_pointer_field() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("layout.dat");

    {
        let mut file = std::fs::File::create(&path).unwrap();
        FileHeader::initial().write_to(&mut file).unwrap();
    }

    let mut file = std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .open(&path)
        .unwrap();
    layout::write_index_ptr(&mut file, 777).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), HEADER_SIZE as usize);

    // Version untouched, pointer replaced
    let version = i32::from_le_bytes(bytes[0..4].try_into().unwrap());
    assert_eq!(version, FORMAT_VERSION);

    let ptr_start = INDEX_PTR_OFFSET as usize;
    let ptr = u64::from_le_bytes(bytes[ptr_start..ptr_start + 8].try_into().unwrap());
    assert_eq!(ptr, 777);
}
