//! Options for writing an edited bank to disk.

use crate::format::Endian;

/// Options controlling how [`BankEditor::write_with_options`] emits a bank.
///
/// [`BankEditor::write_with_options`]: super::BankEditor::write_with_options
///
/// # Example
///
/// ```rust
/// use bnkedit::{Endian, WriteOptions};
///
/// let options = WriteOptions::new().endian(Endian::Big).atomic(false);
/// assert_eq!(options.endian_value(), Endian::Big);
/// assert!(!options.is_atomic());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    endian: Endian,
    atomic: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            endian: Endian::Little,
            atomic: true,
        }
    }
}

impl WriteOptions {
    /// Creates options with defaults: little-endian, atomic replace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the byte order of the output.
    pub fn endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    /// Sets whether the output is written to a temporary sibling file and
    /// renamed into place only once it is complete.
    ///
    /// With atomic writes disabled a failed write leaves a partial file at
    /// the destination.
    pub fn atomic(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }

    /// Returns the configured byte order.
    pub fn endian_value(&self) -> Endian {
        self.endian
    }

    /// Returns whether atomic replacement is enabled.
    pub fn is_atomic(&self) -> bool {
        self.atomic
    }
}
