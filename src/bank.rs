//! In-memory model of one SoundBank.
//!
//! A [`SoundBank`] is built once by the parser and then owned by a
//! [`BankEditor`](crate::BankEditor) for the rest of the session. The set of
//! entries never changes; only three things about an [`Entry`] do: its cached
//! original bytes (filled in at most once), its replacement, and therefore its
//! current length.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::format::{Endian, checked_u32};
use crate::Result;

/// Where the new content of a replaced entry comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplacementSource {
    /// A file that is opened and streamed when the bank is written.
    File(PathBuf),
    /// Bytes held in memory.
    Memory(Vec<u8>),
}

impl ReplacementSource {
    /// Returns the file path, if this source is a file.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ReplacementSource::File(path) => Some(path),
            ReplacementSource::Memory(_) => None,
        }
    }
}

impl fmt::Display for ReplacementSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplacementSource::File(path) => write!(f, "{}", path.display()),
            ReplacementSource::Memory(data) => write!(f, "<memory: {} bytes>", data.len()),
        }
    }
}

/// An active replacement: its source and the length it will occupy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    source: ReplacementSource,
    length: u32,
}

impl Replacement {
    pub(crate) fn new(source: ReplacementSource, length: u32) -> Self {
        Self { source, length }
    }

    /// Returns the replacement source.
    pub fn source(&self) -> &ReplacementSource {
        &self.source
    }

    /// Returns the length measured when the replacement was set.
    pub fn length(&self) -> u32 {
        self.length
    }
}

/// One embedded audio resource.
#[derive(Debug, Clone)]
pub struct Entry {
    id: u32,
    original_offset: u32,
    original_length: u32,
    cached: Option<Vec<u8>>,
    replacement: Option<Replacement>,
}

impl Entry {
    pub(crate) fn new(id: u32, original_offset: u32, original_length: u32) -> Self {
        Self {
            id,
            original_offset,
            original_length,
            cached: None,
            replacement: None,
        }
    }

    /// Returns the entry id. Ids are not guaranteed to be unique.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns the offset of the entry relative to the start of the data section.
    pub fn original_offset(&self) -> u32 {
        self.original_offset
    }

    /// Returns the length of the entry in the input.
    pub fn original_length(&self) -> u32 {
        self.original_length
    }

    /// Returns the length the entry will have when the bank is written.
    pub fn current_length(&self) -> u32 {
        self.replacement
            .as_ref()
            .map_or(self.original_length, Replacement::length)
    }

    /// Returns `true` if the original bytes have been read from the input.
    pub fn is_cached(&self) -> bool {
        self.cached.is_some()
    }

    /// Returns the original bytes, if they have been read.
    pub fn cached_bytes(&self) -> Option<&[u8]> {
        self.cached.as_deref()
    }

    /// Returns the active replacement, if any.
    pub fn replacement(&self) -> Option<&Replacement> {
        self.replacement.as_ref()
    }

    /// Returns `true` if a replacement is active.
    pub fn is_replaced(&self) -> bool {
        self.replacement.is_some()
    }

    pub(crate) fn cache(&mut self, bytes: Vec<u8>) {
        debug_assert!(self.cached.is_none(), "entry {} cached twice", self.id);
        debug_assert_eq!(bytes.len() as u64, u64::from(self.original_length));
        self.cached = Some(bytes);
    }

    pub(crate) fn set_replacement(&mut self, replacement: Replacement) {
        self.replacement = Some(replacement);
    }

    pub(crate) fn clear_replacement(&mut self) -> Option<Replacement> {
        self.replacement.take()
    }

    /// Byte range of the entry relative to the data section.
    fn original_range(&self) -> (u64, u64) {
        let start = u64::from(self.original_offset);
        (start, start + u64::from(self.original_length))
    }
}

/// One record of the index chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRecord {
    /// Entry id.
    pub id: u32,
    /// Offset relative to the start of the data section.
    pub offset: u32,
    /// Length in bytes.
    pub length: u32,
}

/// The index and data-section length a rewrite will produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    /// Index records in file order, offsets packed back to back from zero.
    pub records: Vec<IndexRecord>,
    /// Length of the rewritten data section.
    pub data_length: u32,
}

/// A parsed SoundBank.
#[derive(Debug, Clone)]
pub struct SoundBank {
    header: Vec<u8>,
    entries: Vec<Entry>,
    data_section_start: u64,
    declared_data_length: u32,
    trailing: Option<Vec<u8>>,
    first_by_id: HashMap<u32, usize>,
}

impl SoundBank {
    pub(crate) fn new(
        header: Vec<u8>,
        entries: Vec<Entry>,
        data_section_start: u64,
        declared_data_length: u32,
    ) -> Self {
        let mut first_by_id = HashMap::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            first_by_id.entry(entry.id).or_insert(index);
        }

        Self {
            header,
            entries,
            data_section_start,
            declared_data_length,
            trailing: None,
            first_by_id,
        }
    }

    /// Returns the opaque header chunk payload.
    pub fn header(&self) -> &[u8] {
        &self.header
    }

    /// Returns all entries in file order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Returns the entry at `index`.
    pub fn entry(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub(crate) fn entry_mut(&mut self, index: usize) -> Option<&mut Entry> {
        self.entries.get_mut(index)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the bank has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the absolute offset of the data section payload in the input.
    pub fn data_section_start(&self) -> u64 {
        self.data_section_start
    }

    /// Returns the data-section length declared in the input.
    pub fn declared_data_length(&self) -> u32 {
        self.declared_data_length
    }

    /// Returns the sum of all original entry lengths.
    pub fn original_data_length(&self) -> u64 {
        self.entries
            .iter()
            .map(|e| u64::from(e.original_length))
            .sum()
    }

    /// Returns the sum of all current entry lengths.
    pub fn current_data_length(&self) -> u64 {
        self.entries
            .iter()
            .map(|e| u64::from(e.current_length()))
            .sum()
    }

    /// Returns the bytes that followed the data section, once they have been read.
    pub fn trailing(&self) -> Option<&[u8]> {
        self.trailing.as_deref()
    }

    pub(crate) fn set_trailing(&mut self, trailing: Vec<u8>) {
        self.trailing = Some(trailing);
    }

    /// Returns the position of the first entry (in file order) with `id`.
    pub fn position_of_id(&self, id: u32) -> Option<usize> {
        self.first_by_id.get(&id).copied()
    }

    /// Returns the number of entries with an active replacement.
    pub fn replacement_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_replaced()).count()
    }

    /// Computes the index a rewrite will emit.
    ///
    /// Offsets are a running sum of current lengths starting at zero, so any
    /// padding between entries in the input is not reproduced.
    pub fn output_layout(&self) -> Result<OutputLayout> {
        let mut offset = 0u64;
        let mut records = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let length = entry.current_length();
            records.push(IndexRecord {
                id: entry.id,
                offset: checked_u32("data section", offset)?,
                length,
            });
            offset += u64::from(length);
        }

        Ok(OutputLayout {
            records,
            data_length: checked_u32("data section", offset)?,
        })
    }

    /// Copies `[start, end)` of the data section out of an earlier entry's
    /// cached bytes.
    ///
    /// Entries may overlap because the format only requires offsets to be
    /// non-decreasing; once the input has moved past a shared region, the
    /// earlier entry's copy is the only one left.
    pub(crate) fn recover_range(&self, before: usize, start: u64, end: u64) -> Option<Vec<u8>> {
        if start >= end {
            return Some(Vec::new());
        }
        self.entries[..before].iter().rev().find_map(|entry| {
            let (entry_start, entry_end) = entry.original_range();
            let bytes = entry.cached.as_deref()?;
            if entry_start <= start && end <= entry_end {
                let from = (start - entry_start) as usize;
                let to = (end - entry_start) as usize;
                Some(bytes[from..to].to_vec())
            } else {
                None
            }
        })
    }
}

/// Summary of an open bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankInfo {
    /// Total length of the input in bytes.
    pub input_length: u64,
    /// Byte order the bank was opened with.
    pub endian: Endian,
    /// Number of entries.
    pub entry_count: usize,
    /// Length of the header chunk payload.
    pub header_length: u64,
    /// Absolute offset of the data section payload.
    pub data_section_start: u64,
    /// Data-section length declared in the input.
    pub declared_data_length: u32,
    /// Sum of original entry lengths.
    pub original_data_length: u64,
    /// Sum of current entry lengths.
    pub current_data_length: u64,
    /// Number of entries with an active replacement.
    pub replacement_count: usize,
}

impl BankInfo {
    /// Bytes in the declared data section not covered by any entry length.
    ///
    /// Wwise aligns entries, so this is usually alignment padding.
    pub fn unused_data_bytes(&self) -> u64 {
        u64::from(self.declared_data_length).saturating_sub(self.original_data_length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank(lengths: &[u32]) -> SoundBank {
        let mut offset = 0;
        let entries = lengths
            .iter()
            .enumerate()
            .map(|(i, &len)| {
                let entry = Entry::new(100 + i as u32, offset, len);
                offset += len;
                entry
            })
            .collect();
        SoundBank::new(Vec::new(), entries, 0, offset)
    }

    #[test]
    fn test_current_length_follows_replacement() {
        let mut entry = Entry::new(1, 0, 100);
        assert_eq!(entry.current_length(), 100);

        entry.set_replacement(Replacement::new(ReplacementSource::Memory(vec![0; 7]), 7));
        assert_eq!(entry.current_length(), 7);
        assert!(entry.is_replaced());

        assert!(entry.clear_replacement().is_some());
        assert_eq!(entry.current_length(), 100);
        assert!(entry.clear_replacement().is_none());
    }

    #[test]
    fn test_output_layout_running_sum() {
        let mut bank = bank(&[100, 200, 150]);
        bank.entry_mut(1).unwrap().set_replacement(Replacement::new(
            ReplacementSource::File(PathBuf::from("short.wem")),
            50,
        ));

        let layout = bank.output_layout().unwrap();
        let offsets: Vec<_> = layout.records.iter().map(|r| r.offset).collect();
        assert_eq!(offsets, vec![0, 100, 150]);
        assert_eq!(layout.data_length, 300);
        assert_eq!(layout.records[1].length, 50);
    }

    #[test]
    fn test_output_layout_overflow() {
        let mut bank = bank(&[10, 10]);
        for i in 0..2 {
            bank.entry_mut(i).unwrap().set_replacement(Replacement::new(
                ReplacementSource::Memory(Vec::new()),
                u32::MAX,
            ));
        }
        assert!(matches!(
            bank.output_layout(),
            Err(crate::Error::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn test_position_of_id_returns_first_match() {
        let entries = vec![Entry::new(5, 0, 1), Entry::new(9, 1, 1), Entry::new(5, 2, 1)];
        let bank = SoundBank::new(Vec::new(), entries, 0, 3);
        assert_eq!(bank.position_of_id(5), Some(0));
        assert_eq!(bank.position_of_id(9), Some(1));
        assert_eq!(bank.position_of_id(6), None);
    }

    #[test]
    fn test_recover_range_from_earlier_entry() {
        let entries = vec![Entry::new(1, 0, 8), Entry::new(2, 2, 4)];
        let mut bank = SoundBank::new(Vec::new(), entries, 0, 8);
        assert_eq!(bank.recover_range(1, 2, 6), None);

        bank.entry_mut(0).unwrap().cache((0u8..8).collect());
        assert_eq!(bank.recover_range(1, 2, 6), Some(vec![2, 3, 4, 5]));
        assert_eq!(bank.recover_range(1, 6, 10), None);
        assert_eq!(bank.recover_range(1, 4, 4), Some(Vec::new()));
    }

    #[test]
    fn test_replacement_source_display() {
        assert_eq!(
            ReplacementSource::File(PathBuf::from("a.wem")).to_string(),
            "a.wem"
        );
        assert_eq!(
            ReplacementSource::Memory(vec![1, 2, 3]).to_string(),
            "<memory: 3 bytes>"
        );
    }

    #[test]
    fn test_unused_data_bytes() {
        let info = BankInfo {
            input_length: 0,
            endian: Endian::Little,
            entry_count: 0,
            header_length: 0,
            data_section_start: 0,
            declared_data_length: 64,
            original_data_length: 60,
            current_data_length: 60,
            replacement_count: 0,
        };
        assert_eq!(info.unused_data_bytes(), 4);
    }
}
