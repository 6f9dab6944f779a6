//! Append-only, endian-aware writer.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use super::{Endian, Tag};
use crate::Result;

/// Sequential binary writer.
///
/// Bytes are appended in call order; there is no way to go back and patch a
/// field, so callers must know every length before they emit it. Call
/// [`finish`](Self::finish) to flush and get the destination back.
///
/// # Example
///
/// ```rust
/// use bnkedit::format::{ByteSink, Endian, Tag};
///
/// let mut sink = ByteSink::new(Vec::new(), Endian::Big);
/// sink.write_tag(Tag::DATA)?;
/// sink.write_u32(2)?;
/// sink.write_bytes(&[0xAA, 0xBB])?;
/// assert_eq!(sink.bytes_written(), 10);
///
/// let bytes = sink.finish()?;
/// assert_eq!(bytes, b"DATA\x00\x00\x00\x02\xAA\xBB");
/// # Ok::<(), bnkedit::Error>(())
/// ```
#[derive(Debug)]
pub struct ByteSink<W: Write> {
    inner: W,
    endian: Endian,
    bytes_written: u64,
}

impl ByteSink<BufWriter<File>> {
    /// Creates (or truncates) a file and writes to it.
    pub fn create_path(path: impl AsRef<Path>, endian: Endian) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        Ok(Self::new(BufWriter::new(file), endian))
    }
}

impl<W: Write> ByteSink<W> {
    /// Creates a sink over `inner`.
    pub fn new(inner: W, endian: Endian) -> Self {
        Self {
            inner,
            endian,
            bytes_written: 0,
        }
    }

    /// Returns the byte order integers are written with.
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Returns the number of bytes written so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Writes a four-byte chunk tag.
    pub fn write_tag(&mut self, tag: Tag) -> Result<()> {
        self.write_bytes(tag.as_bytes())
    }

    /// Writes a 32-bit unsigned integer.
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        let bytes = self.endian.u32_to(value);
        self.write_bytes(&bytes)
    }

    /// Writes a 64-bit unsigned integer.
    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        let bytes = self.endian.u64_to(value);
        self.write_bytes(&bytes)
    }

    /// Writes raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        self.bytes_written += bytes.len() as u64;
        Ok(())
    }

    /// Streams everything `reader` yields into the sink.
    ///
    /// Returns the number of bytes copied.
    pub fn copy_from<R: Read + ?Sized>(&mut self, reader: &mut R) -> io::Result<u64> {
        let copied = io::copy(reader, &mut self.inner)?;
        self.bytes_written += copied;
        Ok(copied)
    }

    /// Flushes buffered output and returns the destination.
    pub fn finish(mut self) -> Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}
