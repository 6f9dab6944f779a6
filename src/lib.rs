//! # bnkedit
//!
//! A pure-Rust library for inspecting and patching Wwise SoundBank (`.bnk`)
//! files.
//!
//! A SoundBank packs a header chunk, an index of embedded audio entries, and
//! the entries' raw bytes into one file. This crate lists the entries, exports
//! them, and rewrites the bank with some entries replaced by new files of any
//! size. Everything outside the index and data section is carried over
//! byte-for-byte.
//!
//! ## Quick Start
//!
//! ### Listing and Exporting Entries
//!
//! ```rust,no_run
//! use bnkedit::{BankEditor, Endian, Result, Selector};
//!
//! fn main() -> Result<()> {
//!     let mut editor = BankEditor::open("Init.bnk", Endian::Little)?;
//!
//!     for (position, entry) in editor.entries().iter().enumerate() {
//!         println!("{}: id {} ({} bytes)", position, entry.id(), entry.original_length());
//!     }
//!
//!     editor.export_entry(Selector::Id(412722781), "theme.wem")?;
//!     editor.export_all("./wems")?;
//!     Ok(())
//! }
//! ```
//!
//! ### Replacing Entries
//!
//! ```rust,no_run
//! use bnkedit::{BankEditor, Endian, Result, Selector};
//!
//! fn main() -> Result<()> {
//!     let mut editor = BankEditor::open("Music.bnk", Endian::Little)?;
//!     editor.set_replacement(Selector::Index(0), "intro_remix.wem")?;
//!
//!     let result = editor.write("Music.bnk", Endian::Little)?;
//!     println!("Wrote {} bytes", result.total_bytes);
//!     Ok(())
//! }
//! ```
//!
//! ### Detecting Byte Order
//!
//! Console banks may be big-endian. [`format::detect::detect_endian_path`]
//! guesses the byte order from the first chunk:
//!
//! ```rust,no_run
//! use bnkedit::format::detect::detect_endian_path;
//! use bnkedit::{BankEditor, Endian};
//!
//! let endian = detect_endian_path("Voices.bnk")?.unwrap_or(Endian::Little);
//! let editor = BankEditor::open("Voices.bnk", endian)?;
//! # Ok::<(), bnkedit::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli` | No | Builds the `bnkedit` command-line tool |
//!
//! ## Limits
//!
//! Offsets and lengths in a bank are 32-bit. Inputs, replacement files and
//! rewritten data sections larger than [`format::MAX_ADDRESSABLE`] bytes are
//! rejected with [`Error::CapacityExceeded`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod bank;
pub mod edit;
pub mod error;
pub mod format;

pub use error::{Error, Result};

// Re-export the model at crate root for convenience
pub use bank::{BankInfo, Entry, IndexRecord, OutputLayout, Replacement, ReplacementSource, SoundBank};

// Re-export edit API
pub use edit::{BankEditor, Selector, WriteOptions, WriteResult};

pub use format::{Endian, Tag};
