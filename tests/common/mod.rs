//! Shared test utilities for integration tests.
//!
//! This module provides a small builder for synthetic SoundBanks so each test
//! can describe exactly the chunk layout it needs.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::{Path, PathBuf};

use bnkedit::{BankEditor, Endian};
use tempfile::TempDir;

/// Builds raw SoundBank bytes.
///
/// Entries are laid out in the order they are added. By default each entry
/// starts where the previous one ended; [`BankBuilder::entry_at`] places an
/// entry at an explicit offset instead (padding with zeros as needed).
#[derive(Debug, Clone)]
pub struct BankBuilder {
    endian: Endian,
    header: Vec<u8>,
    records: Vec<(u32, u32, u32)>,
    data: Vec<u8>,
    declared_data_length: Option<u32>,
    trailing: Vec<u8>,
}

impl Default for BankBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BankBuilder {
    pub fn new() -> Self {
        Self {
            endian: Endian::Little,
            header: b"\x8c\x00\x00\x00\x2a\x00\x00\x00".to_vec(),
            records: Vec::new(),
            data: Vec::new(),
            declared_data_length: None,
            trailing: Vec::new(),
        }
    }

    pub fn endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    pub fn header(mut self, header: &[u8]) -> Self {
        self.header = header.to_vec();
        self
    }

    /// Appends an entry right after the previous one.
    pub fn entry(self, id: u32, content: &[u8]) -> Self {
        let offset = self.data.len() as u32;
        self.entry_at(id, offset, content)
    }

    /// Appends an entry at `offset` within the data section.
    pub fn entry_at(mut self, id: u32, offset: u32, content: &[u8]) -> Self {
        let start = offset as usize;
        let end = start + content.len();
        if self.data.len() < end {
            self.data.resize(end, 0);
        }
        self.data[start..end].copy_from_slice(content);
        self.records.push((id, offset, content.len() as u32));
        self
    }

    /// Adds a raw index record without touching the data section.
    pub fn record(mut self, id: u32, offset: u32, length: u32) -> Self {
        self.records.push((id, offset, length));
        self
    }

    /// Pads the data section with zeros up to `len` bytes.
    pub fn pad_data_to(mut self, len: usize) -> Self {
        if self.data.len() < len {
            self.data.resize(len, 0);
        }
        self
    }

    pub fn declared_data_length(mut self, length: u32) -> Self {
        self.declared_data_length = Some(length);
        self
    }

    pub fn trailing(mut self, trailing: &[u8]) -> Self {
        self.trailing = trailing.to_vec();
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let e = self.endian;
        let mut out = Vec::new();

        out.extend_from_slice(b"BKHD");
        out.extend_from_slice(&e.u32_to(self.header.len() as u32));
        out.extend_from_slice(&self.header);

        out.extend_from_slice(b"DIDX");
        out.extend_from_slice(&e.u32_to(self.records.len() as u32 * 12));
        for &(id, offset, length) in &self.records {
            out.extend_from_slice(&e.u32_to(id));
            out.extend_from_slice(&e.u32_to(offset));
            out.extend_from_slice(&e.u32_to(length));
        }

        out.extend_from_slice(b"DATA");
        let declared = self
            .declared_data_length
            .unwrap_or(self.data.len() as u32);
        out.extend_from_slice(&e.u32_to(declared));
        out.extend_from_slice(&self.data);

        out.extend_from_slice(&self.trailing);
        out
    }
}

/// Opens an in-memory bank.
pub fn open_bytes(bytes: &[u8], endian: Endian) -> bnkedit::Result<BankEditor<Cursor<Vec<u8>>>> {
    BankEditor::from_reader(Cursor::new(bytes.to_vec()), bytes.len() as u64, endian)
}

/// Writes `bytes` into a fresh temporary directory and returns both.
pub fn bank_file(bytes: &[u8]) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("test.bnk");
    std::fs::write(&path, bytes).expect("Failed to write bank");
    (dir, path)
}

/// Writes a replacement file next to the bank.
pub fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("Failed to write file");
    path
}

/// Returns the sorted file names in `dir`.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read dir")
        .map(|entry| {
            entry
                .expect("Failed to read dir entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}

/// Writes the edited bank to memory.
pub fn write_to_vec<R: std::io::Read>(
    editor: &mut BankEditor<R>,
    endian: Endian,
) -> bnkedit::Result<Vec<u8>> {
    let (_, bytes) = editor.write_to(Vec::new(), endian)?;
    Ok(bytes)
}

/// Reads the index records of a bank.
pub fn index_records(bytes: &[u8], endian: Endian) -> Vec<(u32, u32, u32)> {
    let read = |pos: usize| endian.u32_from([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]]);
    let header_len = read(4) as usize;
    let didx = 8 + header_len;
    assert_eq!(&bytes[didx..didx + 4], b"DIDX");
    let count = read(didx + 4) as usize / 12;
    (0..count)
        .map(|i| {
            let at = didx + 8 + i * 12;
            (read(at), read(at + 4), read(at + 8))
        })
        .collect()
}

/// Returns the declared data length and payload of a bank.
pub fn data_section(bytes: &[u8], endian: Endian) -> (u32, &[u8]) {
    let read = |pos: usize| endian.u32_from([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]]);
    let header_len = read(4) as usize;
    let didx = 8 + header_len;
    let index_len = read(didx + 4) as usize;
    let data = didx + 8 + index_len;
    assert_eq!(&bytes[data..data + 4], b"DATA");
    let length = read(data + 4);
    (length, &bytes[data + 8..])
}
