//! Tests for malformed and corrupted bank handling.
//!
//! These tests verify that bnkedit correctly detects and reports errors
//! when opening banks that are truncated, mislabelled or internally
//! inconsistent, and that a failed open never yields an editor.

mod common;

use std::io::{self, Cursor, Read};

use bnkedit::format::MAX_ADDRESSABLE;
use bnkedit::{BankEditor, Endian, Error, Selector, Tag};

use common::{BankBuilder, bank_file, open_bytes};

/// Offset of the index length field with the builder's default 8-byte header.
const INDEX_LENGTH_OFFSET: usize = 8 + 8 + 4;

fn valid_bank() -> Vec<u8> {
    BankBuilder::new()
        .entry(1, b"alpha")
        .entry(2, b"beta")
        .build()
}

// ============================================================================
// Tag errors
// ============================================================================

#[test]
fn test_not_a_bank() {
    let mut bytes = valid_bank();
    bytes[..4].copy_from_slice(b"RIFF");

    match open_bytes(&bytes, Endian::Little) {
        Err(Error::MalformedHeader {
            offset,
            expected,
            found,
        }) => {
            assert_eq!(offset, 0);
            assert_eq!(expected, Tag::BKHD);
            assert_eq!(found, Tag(*b"RIFF"));
        }
        other => panic!("expected MalformedHeader, got {:?}", other.err()),
    }
}

#[test]
fn test_missing_index_chunk() {
    let mut bytes = valid_bank();
    bytes[16..20].copy_from_slice(b"HIRC");

    let err = open_bytes(&bytes, Endian::Little).unwrap_err();
    assert!(matches!(
        err,
        Error::MalformedHeader {
            offset: 16,
            expected: Tag::DIDX,
            ..
        }
    ));
    assert!(err.is_corruption());
}

#[test]
fn test_wrong_endianness() {
    // A little-endian header length read as big-endian claims far more bytes
    // than the file holds.
    let bytes = valid_bank();
    let err = open_bytes(&bytes, Endian::Big).unwrap_err();
    assert!(err.is_corruption(), "{:?}", err);
}

// ============================================================================
// Index errors
// ============================================================================

#[test]
fn test_index_length_not_record_aligned() {
    let mut bytes = valid_bank();
    let field = INDEX_LENGTH_OFFSET;
    bytes[field..field + 4].copy_from_slice(&25u32.to_le_bytes());

    match open_bytes(&bytes, Endian::Little) {
        Err(Error::CorruptSection {
            section, reason, ..
        }) => {
            assert_eq!(section, Tag::DIDX);
            assert!(reason.contains("25"), "{}", reason);
        }
        other => panic!("expected CorruptSection, got {:?}", other.err()),
    }
}

#[test]
fn test_offsets_go_backwards() {
    let bytes = BankBuilder::new()
        .entry_at(1, 0, &[1; 10])
        .entry_at(2, 50, &[2; 10])
        .entry_at(3, 30, &[3; 10])
        .build();

    let err = open_bytes(&bytes, Endian::Little).unwrap_err();
    match &err {
        Error::CorruptSection {
            section, reason, ..
        } => {
            assert_eq!(*section, Tag::DIDX);
            assert!(reason.contains("entry 2"), "{}", reason);
        }
        other => panic!("expected CorruptSection, got {:?}", other),
    }
    assert!(err.is_corruption());
}

#[test]
fn test_equal_offsets_are_accepted() {
    let bytes = BankBuilder::new()
        .entry_at(1, 0, b"ab")
        .entry_at(2, 0, b"ab")
        .pad_data_to(4)
        .build();
    let mut editor = open_bytes(&bytes, Endian::Little).unwrap();
    assert_eq!(editor.entry_bytes(Selector::Index(1)).unwrap(), b"ab");
}

#[test]
fn test_truncated_index() {
    let bytes = valid_bank();
    let truncated = &bytes[..INDEX_LENGTH_OFFSET + 4 + 14];
    assert!(matches!(
        open_bytes(truncated, Endian::Little),
        Err(Error::InsufficientData { .. })
    ));
}

// ============================================================================
// Data section errors
// ============================================================================

#[test]
fn test_declared_data_length_smaller_than_entries() {
    let bytes = BankBuilder::new()
        .entry(1, &[0; 100])
        .entry(2, &[0; 100])
        .declared_data_length(150)
        .build();

    match open_bytes(&bytes, Endian::Little) {
        Err(Error::CorruptSection {
            section, reason, ..
        }) => {
            assert_eq!(section, Tag::DATA);
            assert!(reason.contains("200"), "{}", reason);
        }
        other => panic!("expected CorruptSection, got {:?}", other.err()),
    }
}

#[test]
fn test_entry_outside_data_section() {
    let bytes = BankBuilder::new()
        .entry(1, b"abc")
        .record(2, 4, 4)
        .pad_data_to(7)
        .declared_data_length(7)
        .build();
    assert!(matches!(
        open_bytes(&bytes, Endian::Little),
        Err(Error::CorruptSection {
            section: Tag::DATA,
            ..
        })
    ));

    let bytes = BankBuilder::new()
        .entry(1, b"abc")
        .record(2, 5, 4)
        .pad_data_to(8)
        .build();
    assert!(matches!(
        open_bytes(&bytes, Endian::Little),
        Err(Error::CorruptSection {
            section: Tag::DATA,
            ..
        })
    ));
}

#[test]
fn test_data_section_longer_than_file() {
    let bytes = BankBuilder::new()
        .entry(1, b"abc")
        .declared_data_length(64)
        .build();
    assert!(matches!(
        open_bytes(&bytes, Endian::Little),
        Err(Error::CorruptSection {
            section: Tag::DATA,
            ..
        })
    ));
}

#[test]
fn test_truncated_file_on_disk() {
    let bytes = valid_bank();
    let (_dir, path) = bank_file(&bytes[..10]);
    let err = BankEditor::open(&path, Endian::Little).unwrap_err();
    assert!(matches!(err, Error::InsufficientData { .. }));
}

// ============================================================================
// Capacity errors
// ============================================================================

/// A reader that produces an endless stream of zeros.
#[derive(Debug)]
struct Zeros;

impl Read for Zeros {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        buf.fill(0);
        Ok(buf.len())
    }
}

#[test]
fn test_oversized_input() {
    match BankEditor::from_reader(Zeros, MAX_ADDRESSABLE + 1, Endian::Little) {
        Err(Error::CapacityExceeded { what, size, max }) => {
            assert_eq!(what, "input");
            assert_eq!(size, MAX_ADDRESSABLE + 1);
            assert_eq!(max, u64::from(u32::MAX));
        }
        other => panic!("expected CapacityExceeded, got {:?}", other.err()),
    }
}

#[test]
fn test_input_at_addressable_limit_is_parsed() {
    // Exactly at the limit is allowed; the all-zero input then fails on its tag.
    let err = BankEditor::from_reader(Zeros, MAX_ADDRESSABLE, Endian::Little).unwrap_err();
    assert!(matches!(
        err,
        Error::MalformedHeader {
            expected: Tag::BKHD,
            ..
        }
    ));
}

#[test]
fn test_reader_shorter_than_declared_length() {
    let bytes = valid_bank();
    let reader = Cursor::new(bytes[..20].to_vec());
    let err = BankEditor::from_reader(reader, bytes.len() as u64, Endian::Little).unwrap_err();
    assert!(err.is_io(), "{:?}", err);
}

// ============================================================================
// Reader errors
// ============================================================================

/// A reader over `data` that fails exactly once, after `fail_at` bytes.
#[derive(Debug)]
struct FailOnce {
    data: Cursor<Vec<u8>>,
    fail_at: u64,
    failed: bool,
}

impl Read for FailOnce {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let position = self.data.position();
        if !self.failed && position >= self.fail_at {
            self.failed = true;
            return Err(io::Error::other("transient"));
        }
        let limit = if self.failed {
            buf.len()
        } else {
            buf.len().min((self.fail_at - position) as usize)
        };
        self.data.read(&mut buf[..limit])
    }
}

#[test]
fn test_read_error_is_not_retried_with_shifted_bytes() {
    let bytes = BankBuilder::new()
        .entry(1, b"AAAAAAAA")
        .entry(2, b"BBBBBBBB")
        .build();
    let data_start = (bytes.len() - 16) as u64;
    let reader = FailOnce {
        data: Cursor::new(bytes.clone()),
        fail_at: data_start + 4,
        failed: false,
    };
    let mut editor = BankEditor::from_reader(reader, bytes.len() as u64, Endian::Little).unwrap();

    let err = editor.entry_bytes(Selector::Index(0)).unwrap_err();
    assert!(err.is_io(), "{:?}", err);

    // Part of entry 0 was consumed by the failed read; every retry must fail.
    assert!(editor.entry_bytes(Selector::Index(0)).unwrap_err().is_io());
    assert!(editor.entry_bytes(Selector::Index(1)).unwrap_err().is_io());
    assert!(!editor.entries()[0].is_cached());
    assert!(editor.write_to(Vec::new(), Endian::Little).is_err());
}
