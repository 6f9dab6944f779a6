//! Error types for SoundBank operations.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes when opening, editing and rewriting SoundBank containers,
//! along with a convenient [`Result<T>`] type alias.
//!
//! # Error Handling
//!
//! All fallible operations in this crate return `Result<T, Error>`. Structural
//! errors raised while opening a bank abort the whole open, so no editor is
//! ever handed out in a half-parsed state. Lookup errors only affect the call
//! that raised them.
//!
//! ```rust,no_run
//! use bnkedit::{BankEditor, Endian, Error};
//!
//! fn open_bank(path: &str) -> bnkedit::Result<()> {
//!     match BankEditor::open(path, Endian::Little) {
//!         Ok(editor) => {
//!             println!("{} entries", editor.len());
//!             Ok(())
//!         }
//!         Err(Error::MalformedHeader { expected, found, .. }) => {
//!             eprintln!("not a SoundBank: expected {expected}, found {found}");
//!             Err(Error::MalformedHeader { offset: 0, expected, found })
//!         }
//!         Err(e) if e.is_corruption() => {
//!             eprintln!("damaged SoundBank: {e}");
//!             Err(e)
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! ```

use std::io;
use std::path::PathBuf;

use crate::edit::Selector;
use crate::format::Tag;

/// The main error type for SoundBank operations.
///
/// # Error Categories
///
/// | Category | Variants | Typical Cause |
/// |----------|----------|---------------|
/// | I/O | [`Io`][Self::Io], [`StaleReplacementSource`][Self::StaleReplacementSource] | File system operations |
/// | Format | [`MalformedHeader`][Self::MalformedHeader], [`CorruptSection`][Self::CorruptSection] | Invalid bank data |
/// | Stream | [`OutOfRange`][Self::OutOfRange], [`InsufficientData`][Self::InsufficientData] | Truncated input, forward-only violations |
/// | Limits | [`CapacityExceeded`][Self::CapacityExceeded] | 32-bit size fields overflow |
/// | Lookup | [`LookupFailure`][Self::LookupFailure] | Unknown entry id or position |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred on the bank, an output file or an exported entry.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A chunk tag did not match the tag the format requires at this point.
    ///
    /// Usually means the file is not a SoundBank at all, or was opened with
    /// the wrong endianness and an earlier length field sent the parser
    /// astray.
    #[error("Malformed header at offset {offset:#x}: expected {expected} chunk, found {found}")]
    MalformedHeader {
        /// Absolute offset of the tag in the input.
        offset: u64,
        /// The tag the parser required.
        expected: Tag,
        /// The tag actually present.
        found: Tag,
    },

    /// A chunk is structurally inconsistent.
    ///
    /// Raised for an index length that is not a whole number of records,
    /// entry offsets that go backwards, a declared data length smaller than
    /// the entries it must contain, and entry data that can no longer be
    /// recovered from the forward-only input.
    #[error("Corrupt {section} section at offset {offset:#x}: {reason}")]
    CorruptSection {
        /// The chunk the inconsistency was found in.
        section: Tag,
        /// Absolute offset in the input closest to the problem.
        offset: u64,
        /// Description of the inconsistency.
        reason: String,
    },

    /// A size does not fit the 32-bit offset/length fields of the format.
    #[error("{what} is {size} bytes, which exceeds the addressable maximum of {max} bytes")]
    CapacityExceeded {
        /// What was measured ("input", "replacement", "data section").
        what: &'static str,
        /// The offending size in bytes.
        size: u64,
        /// The largest size the format can address.
        max: u64,
    },

    /// A selector matched no entry.
    #[error("No entry matches {selector}")]
    LookupFailure {
        /// The selector that failed to resolve.
        selector: Selector,
    },

    /// A replacement file disappeared or changed size between being
    /// registered and the bank being written.
    ///
    /// This is an I/O failure reported separately so callers can tell the
    /// user which replacement to fix.
    #[error("Replacement for entry {index} is no longer usable: {}", path.display())]
    StaleReplacementSource {
        /// Position of the entry the replacement belongs to.
        index: usize,
        /// Path of the replacement file.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: io::Error,
    },

    /// A forward-only seek targeted a position already passed or past the end.
    #[error("Position {target:#x} is out of range (current position {position:#x}, length {len:#x})")]
    OutOfRange {
        /// Position of the source when the seek was requested.
        position: u64,
        /// The requested target position.
        target: u64,
        /// Total length of the source.
        len: u64,
    },

    /// A read requested more bytes than the source has left.
    #[error(
        "Insufficient data at offset {position:#x}: requested {requested} bytes, {remaining} remaining"
    )]
    InsufficientData {
        /// Position of the source when the read was requested.
        position: u64,
        /// Number of bytes requested.
        requested: u64,
        /// Number of bytes left in the source.
        remaining: u64,
    },
}

impl Error {
    /// Returns `true` if this error indicates damaged or non-SoundBank input.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bnkedit::Error;
    /// use bnkedit::format::Tag;
    ///
    /// let err = Error::CorruptSection {
    ///     section: Tag::DIDX,
    ///     offset: 0x20,
    ///     reason: "length 13 is not a multiple of 12".into(),
    /// };
    /// assert!(err.is_corruption());
    /// ```
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Error::MalformedHeader { .. }
                | Error::CorruptSection { .. }
                | Error::InsufficientData { .. }
        )
    }

    /// Returns `true` if this error came from the underlying file system.
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io(_) | Error::StaleReplacementSource { .. })
    }

    /// Returns the entry index this error refers to, if any.
    pub fn entry_index(&self) -> Option<usize> {
        match self {
            Error::StaleReplacementSource { index, .. } => Some(*index),
            Error::LookupFailure {
                selector: Selector::Index(index),
            } => Some(*index),
            _ => None,
        }
    }
}

/// A specialized Result type for SoundBank operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_from() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.is_io());
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_malformed_header() {
        let err = Error::MalformedHeader {
            offset: 0,
            expected: Tag::BKHD,
            found: Tag(*b"RIFF"),
        };
        assert_eq!(
            err.to_string(),
            "Malformed header at offset 0x0: expected BKHD chunk, found RIFF"
        );
        assert!(err.is_corruption());
    }

    #[test]
    fn test_corrupt_section() {
        let err = Error::CorruptSection {
            section: Tag::DATA,
            offset: 0x1234,
            reason: "declared length 10 is smaller than 20".into(),
        };
        assert!(err.to_string().contains("0x1234"));
        assert!(err.to_string().contains("DATA"));
        assert!(!err.is_io());
    }

    #[test]
    fn test_capacity_exceeded() {
        let err = Error::CapacityExceeded {
            what: "input",
            size: 1 << 33,
            max: u32::MAX as u64,
        };
        assert!(err.to_string().starts_with("input is 8589934592 bytes"));
        assert!(!err.is_corruption());
    }

    #[test]
    fn test_lookup_failure() {
        let err = Error::LookupFailure {
            selector: Selector::Id(42),
        };
        assert_eq!(err.to_string(), "No entry matches id 42");
        assert_eq!(err.entry_index(), None);

        let err = Error::LookupFailure {
            selector: Selector::Index(7),
        };
        assert_eq!(err.entry_index(), Some(7));
    }

    #[test]
    fn test_stale_replacement_source() {
        let err = Error::StaleReplacementSource {
            index: 3,
            path: PathBuf::from("gone.wem"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.is_io());
        assert_eq!(err.entry_index(), Some(3));
        assert!(err.to_string().contains("gone.wem"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_stream_errors() {
        let err = Error::OutOfRange {
            position: 16,
            target: 8,
            len: 32,
        };
        assert!(err.to_string().contains("0x8"));

        let err = Error::InsufficientData {
            position: 4,
            requested: 8,
            remaining: 2,
        };
        assert!(err.is_corruption());
        assert!(err.to_string().contains("requested 8 bytes"));
    }
}
