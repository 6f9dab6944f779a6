//! Bank editing.
//!
//! [`BankEditor`] opens a bank, lets entries be exported or marked for
//! replacement, and writes the result back out with a rebuilt index.
//!
//! # Example
//!
//! ```rust,no_run
//! use bnkedit::{BankEditor, Endian, Selector, WriteOptions};
//!
//! let mut editor = BankEditor::open("SFX.bnk", Endian::Little)?;
//!
//! // Replace the third entry and the entry with id 1034.
//! editor.set_replacement(Selector::Index(2), "footstep.wem")?;
//! editor.set_replacement(Selector::Id(1034), "door.wem")?;
//!
//! // Changed our mind about the door.
//! editor.clear_replacement(Selector::Id(1034))?;
//!
//! let result = editor.write_with_options("SFX.bnk", &WriteOptions::new())?;
//! println!(
//!     "kept {} entries, replaced {}",
//!     result.entries_kept(),
//!     result.entries_replaced
//! );
//! # Ok::<(), bnkedit::Error>(())
//! ```
//!
//! # Implementation Notes
//!
//! Bank files are read strictly front to back. The editor:
//! 1. Parses the header and index chunks up front
//! 2. Reads entry contents on demand, caching every entry it passes
//! 3. Records replacements without touching the replacement files
//! 4. On write, emits a fresh index with packed offsets, then streams cached
//!    originals and replacement files in index order

mod editor;
mod options;
mod selector;

pub use editor::{BankEditor, WriteResult};
pub use options::WriteOptions;
pub use selector::Selector;
