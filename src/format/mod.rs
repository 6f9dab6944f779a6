//! SoundBank format constants, definitions, and low-level stream utilities.
//!
//! A SoundBank is a sequence of chunks, each introduced by a four-byte ASCII
//! tag and a 32-bit length:
//!
//! | Chunk | Tag | Payload |
//! |-------|-----|---------|
//! | Header | `BKHD` | opaque bytes, preserved verbatim |
//! | Index | `DIDX` | `length / 12` records of `{id, offset, length}` |
//! | Data | `DATA` | concatenated entry contents |
//!
//! Anything after the data chunk is carried along as opaque trailing bytes.
//! All integers use the endianness the bank was opened with.

pub mod detect;
pub mod parser;
pub mod sink;
pub mod source;

pub use detect::detect_endian;
pub use sink::ByteSink;
pub use source::ByteSource;

use std::fmt;

/// Size of one index record in bytes (id, offset and length, 32 bits each).
pub const RECORD_SIZE: u32 = 12;

/// Size of a chunk preamble in bytes (tag and 32-bit length).
pub const CHUNK_PREAMBLE_SIZE: u64 = 8;

/// Largest size addressable by the 32-bit offset and length fields.
///
/// Inputs, replacements and rewritten data sections above this size are
/// rejected with [`Error::CapacityExceeded`](crate::Error::CapacityExceeded).
pub const MAX_ADDRESSABLE: u64 = u32::MAX as u64;

/// Converts a size to a 32-bit format field, failing with `CapacityExceeded`.
pub(crate) fn checked_u32(what: &'static str, size: u64) -> crate::Result<u32> {
    u32::try_from(size).map_err(|_| crate::Error::CapacityExceeded {
        what,
        size,
        max: MAX_ADDRESSABLE,
    })
}

/// A four-byte chunk tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    /// Bank header chunk.
    pub const BKHD: Tag = Tag(*b"BKHD");
    /// Data index chunk.
    pub const DIDX: Tag = Tag(*b"DIDX");
    /// Data chunk.
    pub const DATA: Tag = Tag(*b"DATA");

    /// Returns the raw tag bytes.
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", self)
    }
}

/// Byte order of the integer fields in a bank.
///
/// Fixed when a [`ByteSource`] or [`ByteSink`] is created; it cannot be
/// changed mid-stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Endian {
    /// Least significant byte first. Used by PC banks.
    #[default]
    Little,
    /// Most significant byte first.
    Big,
}

impl Endian {
    /// Guesses the byte order from the first eight bytes of a bank.
    ///
    /// See [`detect_endian`].
    pub fn detect(prefix: &[u8], total_len: u64) -> Option<Endian> {
        detect_endian(prefix, total_len)
    }

    /// Assembles a `u32` from bytes in this byte order.
    pub fn u32_from(self, bytes: [u8; 4]) -> u32 {
        match self {
            Endian::Little => u32::from_le_bytes(bytes),
            Endian::Big => u32::from_be_bytes(bytes),
        }
    }

    /// Assembles a `u64` from bytes in this byte order.
    pub fn u64_from(self, bytes: [u8; 8]) -> u64 {
        match self {
            Endian::Little => u64::from_le_bytes(bytes),
            Endian::Big => u64::from_be_bytes(bytes),
        }
    }

    /// Splits a `u32` into bytes in this byte order.
    pub fn u32_to(self, value: u32) -> [u8; 4] {
        match self {
            Endian::Little => value.to_le_bytes(),
            Endian::Big => value.to_be_bytes(),
        }
    }

    /// Splits a `u64` into bytes in this byte order.
    pub fn u64_to(self, value: u64) -> [u8; 8] {
        match self {
            Endian::Little => value.to_le_bytes(),
            Endian::Big => value.to_be_bytes(),
        }
    }
}

impl fmt::Display for Endian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endian::Little => write!(f, "little-endian"),
            Endian::Big => write!(f, "big-endian"),
        }
    }
}
