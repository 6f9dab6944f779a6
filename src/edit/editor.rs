//! Bank editor: lazy entry access, replacement bookkeeping and rewriting.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::bank::{BankInfo, Entry, Replacement, ReplacementSource, SoundBank};
use crate::format::parser::parse_bank;
use crate::format::{ByteSink, ByteSource, Endian, RECORD_SIZE, Tag, checked_u32};
use crate::{Error, Result};

use super::options::WriteOptions;
use super::selector::Selector;

/// Result of writing a bank.
#[must_use = "write result should be checked to verify the bank was written as expected"]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteResult {
    /// Number of entries written.
    pub entries_written: usize,
    /// Number of entries whose content came from a replacement.
    pub entries_replaced: usize,
    /// Length of the written data section.
    pub data_length: u64,
    /// Number of trailing bytes carried over after the data section.
    pub trailing_bytes: u64,
    /// Total bytes written.
    pub total_bytes: u64,
}

impl WriteResult {
    /// Returns the number of entries written with their original content.
    pub fn entries_kept(&self) -> usize {
        self.entries_written - self.entries_replaced
    }
}

/// An editor for one SoundBank.
///
/// The editor owns a forward-only [`ByteSource`] over the original bank.
/// Entry contents are read from it on first use and cached, always in file
/// order: asking for entry 5 first reads (and caches) entries 0 to 4 on the
/// way. Replacements only touch the in-memory model; replacement files are
/// opened when the bank is written and not before.
///
/// The editor is not meant to be shared between threads. Every method that
/// reads entry data takes `&mut self`.
///
/// # Example
///
/// ```rust,no_run
/// use bnkedit::{BankEditor, Endian, Selector};
///
/// let mut editor = BankEditor::open("Music.bnk", Endian::Little)?;
/// for id in editor.ids() {
///     println!("{id}");
/// }
///
/// editor.export_entry(Selector::Index(0), "first.wem")?;
/// editor.set_replacement(Selector::Id(412722781), "new_theme.wem")?;
///
/// let result = editor.write("Music_patched.bnk", Endian::Little)?;
/// println!("{} entries replaced", result.entries_replaced);
/// # Ok::<(), bnkedit::Error>(())
/// ```
#[derive(Debug)]
pub struct BankEditor<R> {
    source: ByteSource<R>,
    bank: SoundBank,
}

impl BankEditor<BufReader<File>> {
    /// Opens and parses the bank at `path`.
    ///
    /// Files larger than the format can address are rejected with
    /// [`Error::CapacityExceeded`] before any chunk is read.
    pub fn open(path: impl AsRef<Path>, endian: Endian) -> Result<Self> {
        let path = path.as_ref();
        let source = ByteSource::open_path(path, endian)?;
        log::debug!("opening bank '{}' ({})", path.display(), endian);
        Self::from_source(source)
    }
}

impl<R: Read> BankEditor<R> {
    /// Parses a bank of `len` bytes read from `reader`.
    pub fn from_reader(reader: R, len: u64, endian: Endian) -> Result<Self> {
        Self::from_source(ByteSource::new(reader, len, endian))
    }

    /// Parses a bank from a fresh byte source.
    pub fn from_source(mut source: ByteSource<R>) -> Result<Self> {
        let bank = parse_bank(&mut source)?;
        Ok(Self { source, bank })
    }

    /// Returns the bank model.
    pub fn bank(&self) -> &SoundBank {
        &self.bank
    }

    /// Returns the byte order the bank was opened with.
    pub fn endian(&self) -> Endian {
        self.source.endian()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.bank.len()
    }

    /// Returns `true` if the bank has no entries.
    pub fn is_empty(&self) -> bool {
        self.bank.is_empty()
    }

    /// Returns all entries in file order.
    pub fn entries(&self) -> &[Entry] {
        self.bank.entries()
    }

    /// Returns entry ids in file order.
    pub fn ids(&self) -> Vec<u32> {
        self.bank.entries().iter().map(Entry::id).collect()
    }

    /// Returns a summary of the bank.
    pub fn info(&self) -> BankInfo {
        BankInfo {
            input_length: self.source.len(),
            endian: self.source.endian(),
            entry_count: self.bank.len(),
            header_length: self.bank.header().len() as u64,
            data_section_start: self.bank.data_section_start(),
            declared_data_length: self.bank.declared_data_length(),
            original_data_length: self.bank.original_data_length(),
            current_data_length: self.bank.current_data_length(),
            replacement_count: self.bank.replacement_count(),
        }
    }

    /// Resolves a selector to an entry position.
    ///
    /// Selecting by id returns the first entry in file order with that id.
    ///
    /// # Errors
    ///
    /// [`Error::LookupFailure`] if the position is out of bounds or no entry
    /// has the id.
    pub fn resolve(&self, selector: Selector) -> Result<usize> {
        let position = match selector {
            Selector::Index(index) if index < self.bank.len() => Some(index),
            Selector::Index(_) => None,
            Selector::Id(id) => self.bank.position_of_id(id),
        };
        position.ok_or(Error::LookupFailure { selector })
    }

    /// Returns the original bytes of an entry, reading forward as needed.
    ///
    /// Replacements are ignored: this is always the content from the input.
    pub fn entry_bytes(&mut self, selector: Selector) -> Result<&[u8]> {
        let index = self.resolve(selector)?;
        self.ensure_cached(index)?;
        Ok(self.cached(index))
    }

    /// Writes the original bytes of an entry to `writer`.
    ///
    /// Returns the number of bytes written.
    pub fn export_entry_to<W: Write + ?Sized>(
        &mut self,
        selector: Selector,
        writer: &mut W,
    ) -> Result<u64> {
        let bytes = self.entry_bytes(selector)?;
        writer.write_all(bytes)?;
        Ok(bytes.len() as u64)
    }

    /// Writes the original bytes of an entry to a new file at `path`.
    ///
    /// The file is only created once the entry has been resolved and read, so
    /// a failed lookup leaves nothing behind.
    pub fn export_entry(&mut self, selector: Selector, path: impl AsRef<Path>) -> Result<u64> {
        let bytes = self.entry_bytes(selector)?;
        let mut file = BufWriter::new(File::create(path.as_ref())?);
        file.write_all(bytes)?;
        file.flush()?;
        Ok(bytes.len() as u64)
    }

    /// Exports every entry into `dir` as `<position>_<id>.wem`.
    ///
    /// Positions are one-based. The directory is created if missing. Returns
    /// the paths written, in file order.
    pub fn export_all(&mut self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let mut written = Vec::with_capacity(self.bank.len());
        for index in 0..self.bank.len() {
            let id = self.bank.entries()[index].id();
            let path = dir.join(format!("{}_{}.wem", index + 1, id));
            self.export_entry(Selector::Index(index), &path)?;
            written.push(path);
        }

        log::debug!("exported {} entries to '{}'", written.len(), dir.display());
        Ok(written)
    }

    /// Marks an entry to be replaced by the file at `path`.
    ///
    /// Only the file's size is looked at now; its content is read when the
    /// bank is written. Setting a replacement again overrides the previous one.
    ///
    /// # Errors
    ///
    /// - [`Error::LookupFailure`] if the selector matches no entry.
    /// - [`Error::Io`] if the file's metadata cannot be read.
    /// - [`Error::CapacityExceeded`] if the file is larger than an entry can be.
    pub fn set_replacement(&mut self, selector: Selector, path: impl AsRef<Path>) -> Result<()> {
        let index = self.resolve(selector)?;
        let path = path.as_ref();
        let size = fs::metadata(path)?.len();
        let length = check_replacement_size(size)?;

        self.replace(index, ReplacementSource::File(path.to_path_buf()), length);
        Ok(())
    }

    /// Marks an entry to be replaced by in-memory bytes.
    pub fn set_replacement_bytes(
        &mut self,
        selector: Selector,
        data: impl Into<Vec<u8>>,
    ) -> Result<()> {
        let index = self.resolve(selector)?;
        let data = data.into();
        let length = check_replacement_size(data.len() as u64)?;

        self.replace(index, ReplacementSource::Memory(data), length);
        Ok(())
    }

    /// Cancels the replacement of an entry. Does nothing if none is active.
    pub fn clear_replacement(&mut self, selector: Selector) -> Result<()> {
        let index = self.resolve(selector)?;
        if let Some(entry) = self.bank.entry_mut(index) {
            if let Some(previous) = entry.clear_replacement() {
                log::debug!(
                    "cleared replacement of entry {} (id {}) by {}",
                    index,
                    entry.id(),
                    previous.source()
                );
            }
        }
        Ok(())
    }

    /// Cancels every active replacement.
    pub fn clear_all_replacements(&mut self) {
        for index in 0..self.bank.len() {
            if let Some(entry) = self.bank.entry_mut(index) {
                entry.clear_replacement();
            }
        }
    }

    /// Returns the replacement source of each entry in file order, `None`
    /// where the original content will be kept.
    pub fn pending_replacements(&self) -> Vec<Option<&ReplacementSource>> {
        self.bank
            .entries()
            .iter()
            .map(|e| e.replacement().map(Replacement::source))
            .collect()
    }

    /// Writes the edited bank to `path` in the given byte order.
    ///
    /// Uses [`WriteOptions`] defaults otherwise, so the destination is only
    /// replaced once the new bank is complete.
    pub fn write(&mut self, path: impl AsRef<Path>, endian: Endian) -> Result<WriteResult> {
        self.write_with_options(path, &WriteOptions::new().endian(endian))
    }

    /// Writes the edited bank to `path`.
    ///
    /// With [`WriteOptions::atomic`] enabled (the default) the bank is written
    /// to a uniquely named temporary file next to `path`, synced, and renamed
    /// over `path`. On any failure, including the rename, the temporary file
    /// is removed and `path` is left untouched.
    ///
    /// The input is read to the end before any output file is created, so
    /// `path` may be the file the bank was opened from.
    pub fn write_with_options(
        &mut self,
        path: impl AsRef<Path>,
        options: &WriteOptions,
    ) -> Result<WriteResult> {
        let path = path.as_ref();
        // Drain the input first so `path` may be the bank being edited.
        self.load_all()?;

        if !options.is_atomic() {
            let file = File::create(path)?;
            return self.write_synced(&file, options.endian_value());
        }

        let temp = NamedTempFile::new_in(temp_dir_for(path))?;
        let result = self.write_synced(temp.as_file(), options.endian_value())?;
        temp.persist(path).map_err(|e| Error::Io(e.error))?;
        log::debug!(
            "wrote {} bytes to '{}'",
            result.total_bytes,
            path.display()
        );
        Ok(result)
    }

    /// Writes the edited bank to `writer` and returns it once flushed.
    ///
    /// Chunks are emitted in order: header chunk verbatim, an index with
    /// offsets packed back to back, the data chunk, then any trailing bytes
    /// of the input. Each entry's original bytes are cached on the way, even
    /// when replaced, so the bank can be written again after further edits.
    ///
    /// # Errors
    ///
    /// - [`Error::CapacityExceeded`] if the new data section would not fit
    ///   the 32-bit length field. Nothing is written in that case.
    /// - [`Error::StaleReplacementSource`] if a replacement file is missing
    ///   or no longer has the size it had when it was set.
    /// - [`Error::Io`] for any other read or write failure. The writer may
    ///   have received a partial bank.
    pub fn write_to<W: Write>(&mut self, writer: W, endian: Endian) -> Result<(WriteResult, W)> {
        let layout = self.bank.output_layout()?;
        let header_length = checked_u32("header", self.bank.header().len() as u64)?;
        let index_length = checked_u32(
            "index",
            layout.records.len() as u64 * u64::from(RECORD_SIZE),
        )?;

        let mut sink = ByteSink::new(writer, endian);

        sink.write_tag(Tag::BKHD)?;
        sink.write_u32(header_length)?;
        sink.write_bytes(self.bank.header())?;

        sink.write_tag(Tag::DIDX)?;
        sink.write_u32(index_length)?;
        for record in &layout.records {
            sink.write_u32(record.id)?;
            sink.write_u32(record.offset)?;
            sink.write_u32(record.length)?;
        }

        sink.write_tag(Tag::DATA)?;
        sink.write_u32(layout.data_length)?;

        let mut result = WriteResult::default();
        for index in 0..self.bank.len() {
            self.ensure_cached(index)?;
            let entry = &self.bank.entries()[index];
            match entry.replacement() {
                Some(replacement) => {
                    match replacement.source() {
                        ReplacementSource::File(path) => {
                            stream_replacement(index, path, replacement.length(), &mut sink)?
                        }
                        ReplacementSource::Memory(data) => sink.write_bytes(data)?,
                    }
                    result.entries_replaced += 1;
                }
                None => sink.write_bytes(self.cached(index))?,
            }
            result.entries_written += 1;
        }

        let unused = u64::from(self.bank.declared_data_length())
            .saturating_sub(self.bank.original_data_length());
        if unused > 0 {
            log::warn!("dropping {} unused bytes from the data section", unused);
        }

        self.ensure_trailing()?;
        let trailing = self.bank.trailing().unwrap_or_default();
        sink.write_bytes(trailing)?;

        result.data_length = u64::from(layout.data_length);
        result.trailing_bytes = trailing.len() as u64;
        result.total_bytes = sink.bytes_written();

        let writer = sink.finish()?;
        Ok((result, writer))
    }

    fn write_synced(&mut self, file: &File, endian: Endian) -> Result<WriteResult> {
        let (result, writer) = self.write_to(BufWriter::new(file), endian)?;
        writer.into_inner().map_err(|e| Error::Io(e.into_error()))?;
        file.sync_all()?;
        Ok(result)
    }

    fn replace(&mut self, index: usize, source: ReplacementSource, length: u32) {
        if let Some(entry) = self.bank.entry_mut(index) {
            log::debug!(
                "replacing entry {} (id {}, {} bytes) with {} ({} bytes)",
                index,
                entry.id(),
                entry.original_length(),
                source,
                length
            );
            entry.set_replacement(Replacement::new(source, length));
        }
    }

    fn cached(&self, index: usize) -> &[u8] {
        self.bank.entries()[index]
            .cached_bytes()
            .unwrap_or_default()
    }

    /// Caches every entry and the trailing bytes.
    fn load_all(&mut self) -> Result<()> {
        if let Some(last) = self.bank.len().checked_sub(1) {
            self.ensure_cached(last)?;
        }
        self.ensure_trailing()
    }

    /// Caches entries `0..=index` that are not cached yet, in file order.
    fn ensure_cached(&mut self, index: usize) -> Result<()> {
        for i in 0..=index {
            if self.bank.entries()[i].is_cached() {
                continue;
            }
            let bytes = self.read_original(i)?;
            if let Some(entry) = self.bank.entry_mut(i) {
                log::trace!(
                    "cached entry {} (id {}, {} bytes)",
                    i,
                    entry.id(),
                    bytes.len()
                );
                entry.cache(bytes);
            }
        }
        Ok(())
    }

    /// Reads the original bytes of entry `index` from the source.
    ///
    /// The part of the entry the source has already moved past is recovered
    /// from an earlier overlapping entry.
    fn read_original(&mut self, index: usize) -> Result<Vec<u8>> {
        let entry = &self.bank.entries()[index];
        let id = entry.id();
        let data_start = self.bank.data_section_start();
        let start = data_start + u64::from(entry.original_offset());
        let end = start + u64::from(entry.original_length());
        let position = self.source.position();

        if position <= start {
            self.source.skip_until(start)?;
            return self.source.read_bytes_until(end);
        }

        let consumed_end = end.min(position);
        let mut bytes = self
            .bank
            .recover_range(index, start - data_start, consumed_end - data_start)
            .ok_or_else(|| Error::CorruptSection {
                section: Tag::DATA,
                offset: start,
                reason: format!(
                    "entry {} (id {}) overlaps data that has already been consumed",
                    index, id
                ),
            })?;
        if end > position {
            bytes.extend(self.source.read_bytes_until(end)?);
        }
        Ok(bytes)
    }

    /// Reads and stores everything after the declared data section.
    ///
    /// Must run after every entry has been cached; it moves the source to the
    /// end of the input.
    fn ensure_trailing(&mut self) -> Result<()> {
        if self.bank.trailing().is_some() {
            return Ok(());
        }
        let data_end =
            self.bank.data_section_start() + u64::from(self.bank.declared_data_length());
        if self.source.position() < data_end {
            self.source.skip_until(data_end)?;
        }
        let trailing = self.source.read_remaining()?;
        if !trailing.is_empty() {
            log::debug!("carrying over {} trailing bytes", trailing.len());
        }
        self.bank.set_trailing(trailing);
        Ok(())
    }
}

fn check_replacement_size(size: u64) -> Result<u32> {
    checked_u32("replacement", size)
}

fn stale_replacement(index: usize, path: &Path, source: io::Error) -> Error {
    Error::StaleReplacementSource {
        index,
        path: path.to_path_buf(),
        source,
    }
}

/// Streams a replacement file into the sink, checking it still has the
/// length recorded in the index.
fn stream_replacement<W: Write>(
    index: usize,
    path: &Path,
    expected: u32,
    sink: &mut ByteSink<W>,
) -> Result<()> {
    let expected = u64::from(expected);
    let file = File::open(path).map_err(|e| stale_replacement(index, path, e))?;
    let actual = file
        .metadata()
        .map_err(|e| stale_replacement(index, path, e))?
        .len();
    if actual != expected {
        return Err(stale_replacement(
            index,
            path,
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("size changed from {} to {} bytes", expected, actual),
            ),
        ));
    }

    let copied = sink.copy_from(&mut BufReader::new(file).take(expected))?;
    if copied != expected {
        return Err(stale_replacement(
            index,
            path,
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("ended after {} of {} bytes", copied, expected),
            ),
        ));
    }
    Ok(())
}

/// Returns the directory temporary output for `path` is created in.
fn temp_dir_for(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
