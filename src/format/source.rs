//! Forward-only, endian-aware reader over a fixed-length input.
//!
//! [`ByteSource`] never moves backwards. Every read advances the position,
//! and the underlying reader is dropped as soon as the last byte has been
//! consumed, so an exhausted bank file does not keep its handle open for the
//! rest of an editing session.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use super::{Endian, Tag};
use crate::{Error, Result};

/// Sequential binary reader over an input of known length.
///
/// # Example
///
/// ```rust
/// use bnkedit::format::{ByteSource, Endian, Tag};
/// use std::io::Cursor;
///
/// let data = b"BKHD\x04\x00\x00\x00abcd";
/// let mut source = ByteSource::new(Cursor::new(&data[..]), data.len() as u64, Endian::Little);
///
/// assert_eq!(source.read_tag()?, Tag::BKHD);
/// assert_eq!(source.read_u32()?, 4);
/// assert_eq!(source.read_remaining()?, b"abcd");
/// assert!(source.is_released());
/// # Ok::<(), bnkedit::Error>(())
/// ```
#[derive(Debug)]
pub struct ByteSource<R> {
    inner: Option<R>,
    endian: Endian,
    len: u64,
    position: u64,
}

impl ByteSource<BufReader<File>> {
    /// Opens a file as a byte source. The length is taken from file metadata.
    pub fn open_path(path: impl AsRef<Path>, endian: Endian) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let len = file.metadata()?.len();
        Ok(Self::new(BufReader::new(file), len, endian))
    }
}

impl<R: Read> ByteSource<R> {
    /// Creates a byte source reading `len` bytes from `reader`.
    ///
    /// `len` is trusted: if the reader ends early, reads fail with an I/O
    /// error of kind [`UnexpectedEof`](io::ErrorKind::UnexpectedEof).
    pub fn new(reader: R, len: u64, endian: Endian) -> Self {
        let mut source = Self {
            inner: Some(reader),
            endian,
            len,
            position: 0,
        };
        source.release_if_exhausted();
        source
    }

    /// Returns the byte order integers are read with.
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Returns the total length of the input.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Returns `true` if the input has no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the position of the next byte to be read.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Returns the number of bytes not yet read.
    pub fn remaining(&self) -> u64 {
        self.len - self.position
    }

    /// Returns `true` once the underlying reader has been dropped.
    pub fn is_released(&self) -> bool {
        self.inner.is_none()
    }

    /// Drops the underlying reader.
    ///
    /// After this any read of one byte or more fails, even if the input was
    /// not exhausted.
    pub fn release(&mut self) {
        if self.inner.take().is_some() {
            log::trace!(
                "released byte source at {:#x} of {:#x}",
                self.position,
                self.len
            );
        }
    }

    /// Reads a four-byte chunk tag.
    pub fn read_tag(&mut self) -> Result<Tag> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf)?;
        Ok(Tag(buf))
    }

    /// Reads a 32-bit unsigned integer.
    pub fn read_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf)?;
        Ok(self.endian.u32_from(buf))
    }

    /// Reads a 64-bit unsigned integer.
    pub fn read_u64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.fill(&mut buf)?;
        Ok(self.endian.u64_from(buf))
    }

    /// Reads exactly `count` bytes.
    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        // Check before allocating so a bogus length cannot trigger a huge allocation.
        self.ensure_available(count as u64)?;
        let mut buf = vec![0u8; count];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    /// Reads from the current position up to (excluding) `target`.
    pub fn read_bytes_until(&mut self, target: u64) -> Result<Vec<u8>> {
        self.check_target(target)?;
        let count = usize::try_from(target - self.position).map_err(|_| {
            Error::CapacityExceeded {
                what: "read",
                size: target - self.position,
                max: usize::MAX as u64,
            }
        })?;
        self.read_bytes(count)
    }

    /// Reads everything that is left.
    pub fn read_remaining(&mut self) -> Result<Vec<u8>> {
        self.read_bytes_until(self.len)
    }

    /// Discards bytes up to (excluding) `target`.
    pub fn skip_until(&mut self, target: u64) -> Result<()> {
        self.check_target(target)?;
        let count = target - self.position;
        if count == 0 {
            return Ok(());
        }

        let reader = self.reader()?;
        let skipped = match io::copy(&mut reader.by_ref().take(count), &mut io::sink()) {
            Ok(skipped) => skipped,
            Err(e) => return Err(self.fail(e)),
        };
        if skipped < count {
            return Err(self.fail(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("input ended after skipping {skipped} of {count} bytes"),
            )));
        }
        self.advance(count);
        Ok(())
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        self.ensure_available(buf.len() as u64)?;
        if buf.is_empty() {
            return Ok(());
        }
        if let Err(e) = self.reader()?.read_exact(buf) {
            return Err(self.fail(e));
        }
        self.advance(buf.len() as u64);
        Ok(())
    }

    /// Releases the reader after a failed read.
    ///
    /// The reader may have consumed part of the request, so the position no
    /// longer matches it and every later read must fail.
    fn fail(&mut self, err: io::Error) -> Error {
        log::debug!("read failed at {:#x}: {}", self.position, err);
        self.release();
        Error::Io(err)
    }

    fn reader(&mut self) -> Result<&mut R> {
        let position = self.position;
        self.inner.as_mut().ok_or_else(|| {
            Error::Io(io::Error::other(format!(
                "byte source was released at offset {position:#x}"
            )))
        })
    }

    fn ensure_available(&self, requested: u64) -> Result<()> {
        if requested > self.remaining() {
            return Err(Error::InsufficientData {
                position: self.position,
                requested,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    fn check_target(&self, target: u64) -> Result<()> {
        if target < self.position || target > self.len {
            return Err(Error::OutOfRange {
                position: self.position,
                target,
                len: self.len,
            });
        }
        Ok(())
    }

    fn advance(&mut self, count: u64) {
        self.position += count;
        self.release_if_exhausted();
    }

    fn release_if_exhausted(&mut self) {
        if self.position == self.len {
            self.release();
        }
    }
}
