//! Entry selectors.

use std::fmt;

/// Identifies one entry of a bank.
///
/// Entry ids are not unique in every bank. Selecting by id always picks the
/// first matching entry in file order; use [`Selector::Index`] to reach
/// later duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Zero-based position in the index chunk.
    Index(usize),
    /// Entry id.
    Id(u32),
}

impl Selector {
    /// Builds a selector from a raw value, interpreting it as an id when
    /// `by_id` is set and as a position otherwise.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bnkedit::Selector;
    ///
    /// assert_eq!(Selector::new(3, false), Selector::Index(3));
    /// assert_eq!(Selector::new(3, true), Selector::Id(3));
    /// ```
    pub fn new(value: u32, by_id: bool) -> Self {
        if by_id {
            Selector::Id(value)
        } else {
            Selector::Index(value as usize)
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Index(index) => write!(f, "position {}", index),
            Selector::Id(id) => write!(f, "id {}", id),
        }
    }
}
