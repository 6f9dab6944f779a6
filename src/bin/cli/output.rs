//! Output formatting for CLI operations.

use std::path::{Path, PathBuf};

use bnkedit::{BankInfo, Entry, WriteResult};
use serde_json::json;

/// Trait for output formatting
pub trait OutputFormatter {
    /// Formats a list of entries
    fn format_list(&self, entries: &[Entry]) -> String;

    /// Formats bank information
    fn format_info(&self, info: &BankInfo) -> String;

    /// Formats the files written by an export
    fn format_export(&self, files: &[(PathBuf, u64)]) -> String;

    /// Formats the result of writing a patched bank
    fn format_write_result(&self, path: &Path, result: &WriteResult) -> String;
}

/// Human-readable output formatter
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn format_list(&self, entries: &[Entry]) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{:>6} {:>12} {:>12} {:>12}\n",
            "Pos", "Id", "Offset", "Size"
        ));
        output.push_str(&"-".repeat(45));
        output.push('\n');

        let mut total_size: u64 = 0;
        for (position, entry) in entries.iter().enumerate() {
            total_size += u64::from(entry.original_length());
            output.push_str(&format!(
                "{:>6} {:>12} {:>12} {:>12}\n",
                position,
                entry.id(),
                format!("{:#x}", entry.original_offset()),
                humanize_bytes(u64::from(entry.original_length()))
            ));
        }

        output.push_str(&"-".repeat(45));
        output.push('\n');
        output.push_str(&format!(
            "{} entries, {} total\n",
            entries.len(),
            humanize_bytes(total_size)
        ));

        output
    }

    fn format_info(&self, info: &BankInfo) -> String {
        let mut output = String::new();

        output.push_str("Bank Information:\n");
        output.push_str(&"-".repeat(40));
        output.push('\n');
        output.push_str(&format!(
            "  Size:           {}\n",
            humanize_bytes(info.input_length)
        ));
        output.push_str(&format!("  Byte order:     {}\n", info.endian));
        output.push_str(&format!("  Entries:        {}\n", info.entry_count));
        output.push_str(&format!("  Header:         {} bytes\n", info.header_length));
        output.push_str(&format!(
            "  Data section:   {} at {:#x}\n",
            humanize_bytes(u64::from(info.declared_data_length)),
            info.data_section_start
        ));
        output.push_str(&format!(
            "  Entry data:     {}\n",
            humanize_bytes(info.original_data_length)
        ));

        if info.unused_data_bytes() > 0 {
            output.push_str(&format!(
                "  Padding:        {} bytes\n",
                info.unused_data_bytes()
            ));
        }

        output
    }

    fn format_export(&self, files: &[(PathBuf, u64)]) -> String {
        let mut output = String::new();
        let mut total: u64 = 0;

        for (path, size) in files {
            total += size;
            output.push_str(&format!("{:>12}  {}\n", humanize_bytes(*size), path.display()));
        }
        output.push_str(&format!(
            "Exported {} entries ({})\n",
            files.len(),
            humanize_bytes(total)
        ));

        output
    }

    fn format_write_result(&self, path: &Path, result: &WriteResult) -> String {
        format!(
            "Wrote {} ({}): {} entries replaced, {} kept\n",
            path.display(),
            humanize_bytes(result.total_bytes),
            result.entries_replaced,
            result.entries_kept()
        )
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_list(&self, entries: &[Entry]) -> String {
        let items: Vec<_> = entries
            .iter()
            .enumerate()
            .map(|(position, e)| {
                json!({
                    "position": position,
                    "id": e.id(),
                    "offset": e.original_offset(),
                    "size": e.original_length(),
                })
            })
            .collect();

        serde_json::to_string_pretty(&items).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_info(&self, info: &BankInfo) -> String {
        let obj = json!({
            "size": info.input_length,
            "endian": match info.endian {
                bnkedit::Endian::Little => "little",
                bnkedit::Endian::Big => "big",
            },
            "entry_count": info.entry_count,
            "header_length": info.header_length,
            "data_section_start": info.data_section_start,
            "declared_data_length": info.declared_data_length,
            "entry_data_length": info.original_data_length,
            "unused_data_bytes": info.unused_data_bytes(),
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_export(&self, files: &[(PathBuf, u64)]) -> String {
        let items: Vec<_> = files
            .iter()
            .map(|(path, size)| json!({"path": path.display().to_string(), "size": size}))
            .collect();

        serde_json::to_string_pretty(&items).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_write_result(&self, path: &Path, result: &WriteResult) -> String {
        let obj = json!({
            "path": path.display().to_string(),
            "entries_written": result.entries_written,
            "entries_replaced": result.entries_replaced,
            "data_length": result.data_length,
            "trailing_bytes": result.trailing_bytes,
            "total_bytes": result.total_bytes,
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Creates the appropriate formatter based on output format
pub fn create_formatter(format: super::OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        super::OutputFormat::Human => Box::new(HumanFormatter),
        super::OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Converts bytes to a human-readable string
pub fn humanize_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
