//! Chunk parser for SoundBank containers.
//!
//! Parsing reads the header chunk, the index chunk and the data chunk's
//! preamble, and stops at the first byte of entry data. Entry contents are
//! left in the input for the editor to pull forward lazily.

use std::io::Read;

use super::{ByteSource, MAX_ADDRESSABLE, RECORD_SIZE, Tag};
use crate::bank::{Entry, SoundBank};
use crate::{Error, Result};

/// Parses the chunk structure of a bank.
///
/// On success the source is positioned at the start of the data section
/// payload, which is recorded as [`SoundBank::data_section_start`].
///
/// # Errors
///
/// - [`Error::CapacityExceeded`] if the input is larger than the format can
///   address. Nothing is read in that case.
/// - [`Error::MalformedHeader`] if a chunk tag is not the expected one.
/// - [`Error::CorruptSection`] for a misaligned index, offsets that go
///   backwards, entries outside the data section, or a data section that is
///   shorter than its entries or runs past the end of the input.
/// - [`Error::InsufficientData`] or [`Error::Io`] if the input is truncated
///   or cannot be read.
pub fn parse_bank<R: Read>(source: &mut ByteSource<R>) -> Result<SoundBank> {
    if source.len() > MAX_ADDRESSABLE {
        return Err(Error::CapacityExceeded {
            what: "input",
            size: source.len(),
            max: MAX_ADDRESSABLE,
        });
    }

    expect_tag(source, Tag::BKHD)?;
    let header_length = source.read_u32()?;
    let header = source.read_bytes(header_length as usize)?;

    let entries = read_index(source)?;

    expect_tag(source, Tag::DATA)?;
    let length_offset = source.position();
    let declared_data_length = source.read_u32()?;
    let data_section_start = source.position();
    check_data_section(
        &entries,
        declared_data_length,
        length_offset,
        source.remaining(),
    )?;

    log::debug!(
        "parsed bank: {} entries, {} header bytes, data section at {:#x} ({} bytes)",
        entries.len(),
        header.len(),
        data_section_start,
        declared_data_length
    );

    Ok(SoundBank::new(
        header,
        entries,
        data_section_start,
        declared_data_length,
    ))
}

fn expect_tag<R: Read>(source: &mut ByteSource<R>, expected: Tag) -> Result<()> {
    let offset = source.position();
    let found = source.read_tag()?;
    if found != expected {
        return Err(Error::MalformedHeader {
            offset,
            expected,
            found,
        });
    }
    Ok(())
}

fn read_index<R: Read>(source: &mut ByteSource<R>) -> Result<Vec<Entry>> {
    expect_tag(source, Tag::DIDX)?;
    let length_offset = source.position();
    let length = source.read_u32()?;
    if length % RECORD_SIZE != 0 {
        return Err(Error::CorruptSection {
            section: Tag::DIDX,
            offset: length_offset,
            reason: format!(
                "length {} is not a multiple of the {}-byte record size",
                length, RECORD_SIZE
            ),
        });
    }

    let count = (length / RECORD_SIZE) as usize;
    // Bound the allocation by what the input can actually hold.
    let capacity = count.min((source.remaining() / u64::from(RECORD_SIZE)) as usize);
    let mut entries: Vec<Entry> = Vec::with_capacity(capacity);

    for index in 0..count {
        let record_offset = source.position();
        let id = source.read_u32()?;
        let offset = source.read_u32()?;
        let entry_length = source.read_u32()?;

        if let Some(previous) = entries.last() {
            if offset < previous.original_offset() {
                return Err(Error::CorruptSection {
                    section: Tag::DIDX,
                    offset: record_offset,
                    reason: format!(
                        "entry {} (id {}) starts at offset {}, before entry {} (id {}) at offset {}",
                        index,
                        id,
                        offset,
                        index - 1,
                        previous.id(),
                        previous.original_offset()
                    ),
                });
            }
        }

        entries.push(Entry::new(id, offset, entry_length));
    }

    Ok(entries)
}

fn check_data_section(
    entries: &[Entry],
    declared_length: u32,
    length_offset: u64,
    available: u64,
) -> Result<()> {
    let corrupt = |reason: String| Error::CorruptSection {
        section: Tag::DATA,
        offset: length_offset,
        reason,
    };

    let computed: u64 = entries.iter().map(|e| u64::from(e.original_length())).sum();
    if computed > u64::from(declared_length) {
        return Err(corrupt(format!(
            "declared length {} is smaller than the {} bytes of entries it contains",
            declared_length, computed
        )));
    }

    if u64::from(declared_length) > available {
        return Err(corrupt(format!(
            "declared length {} runs past the end of the input ({} bytes remain)",
            declared_length, available
        )));
    }

    for (index, entry) in entries.iter().enumerate() {
        let end = u64::from(entry.original_offset()) + u64::from(entry.original_length());
        if end > u64::from(declared_length) {
            return Err(corrupt(format!(
                "entry {} (id {}) ends at offset {}, past the declared length {}",
                index,
                entry.id(),
                end,
                declared_length
            )));
        }
    }

    Ok(())
}
