//! Endianness detection for SoundBank files.
//!
//! Wwise writes banks in the byte order of the target platform, and nothing
//! in the file states which one was used. The first chunk is always the
//! header chunk, so its length field is the only evidence available: under
//! the wrong byte order it almost always claims more bytes than the file has.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::{CHUNK_PREAMBLE_SIZE, Endian, Tag};
use crate::Result;

/// Detects the byte order of a bank from its first eight bytes.
///
/// Returns `None` if `prefix` does not start with a `BKHD` tag or if the
/// header length does not fit in `total_len` under either byte order.
/// Little-endian wins when both interpretations fit.
///
/// # Example
///
/// ```rust
/// use bnkedit::format::{Endian, detect_endian};
///
/// let prefix = [b'B', b'K', b'H', b'D', 0, 0, 0, 8];
/// assert_eq!(detect_endian(&prefix, 64), Some(Endian::Big));
/// ```
pub fn detect_endian(prefix: &[u8], total_len: u64) -> Option<Endian> {
    if prefix.len() < CHUNK_PREAMBLE_SIZE as usize || prefix[..4] != Tag::BKHD.0 {
        return None;
    }
    let length = [prefix[4], prefix[5], prefix[6], prefix[7]];
    let available = total_len.saturating_sub(CHUNK_PREAMBLE_SIZE);

    [Endian::Little, Endian::Big]
        .into_iter()
        .find(|endian| u64::from(endian.u32_from(length)) <= available)
}

/// Detects the byte order of the bank at `path`.
///
/// Reads only the first eight bytes of the file.
pub fn detect_endian_path(path: impl AsRef<Path>) -> Result<Option<Endian>> {
    let mut file = File::open(path.as_ref())?;
    let total_len = file.metadata()?.len();

    let mut prefix = [0u8; CHUNK_PREAMBLE_SIZE as usize];
    let mut filled = 0;
    while filled < prefix.len() {
        let n = file.read(&mut prefix[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }

    Ok(detect_endian(&prefix[..filled], total_len))
}
