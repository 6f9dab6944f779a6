//! Fuzz target for opening and rewriting arbitrary bytes as a SoundBank.
//!
//! Exercises chunk parsing, lazy entry caching and the rewriter with
//! malformed or adversarial input. Any panic or hang is a bug; errors are
//! expected.
//!
//! Run with: cargo +nightly fuzz run bank_open

#![no_main]

use bnkedit::{BankEditor, Endian, Selector};
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    for endian in [Endian::Little, Endian::Big] {
        let cursor = Cursor::new(data);
        let Ok(mut editor) = BankEditor::from_reader(cursor, data.len() as u64, endian) else {
            continue;
        };

        // Read the last entry first so every earlier one is cached on the way.
        if let Some(last) = editor.len().checked_sub(1) {
            let _ = editor.entry_bytes(Selector::Index(last));
        }
        if !editor.is_empty() {
            let _ = editor.set_replacement_bytes(Selector::Index(0), data.to_vec());
        }

        // A well-formed bank must survive a rewrite.
        let _ = editor.write_to(Vec::new(), endian);
    }
});
