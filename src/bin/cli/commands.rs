//! Command implementations for the CLI tool.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use bnkedit::format::detect::detect_endian_path;
use bnkedit::{BankEditor, Endian, Selector, WriteOptions};

use crate::exit_codes::{ExitCode, error_to_exit_code};
use crate::output::create_formatter;
use crate::{EndianArg, OutputFormat};

/// Configuration for the export command.
pub struct ExportConfig<'a> {
    pub bank_path: &'a Path,
    pub entry: u32,
    pub by_id: bool,
    pub output: Option<&'a Path>,
    pub endian: EndianArg,
    pub format: OutputFormat,
}

/// Configuration for the replace command.
pub struct ReplaceConfig<'a> {
    pub bank_path: &'a Path,
    pub assignments: &'a [String],
    pub output: Option<&'a Path>,
    pub by_id: bool,
    pub endian: EndianArg,
    pub output_endian: Option<Endian>,
    pub atomic: bool,
    pub format: OutputFormat,
}

/// List command implementation
pub fn list(bank_path: &Path, endian: EndianArg, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);

    let editor = match open_bank(bank_path, endian) {
        Ok(e) => e,
        Err(code) => return code,
    };

    print!("{}", formatter.format_list(editor.entries()));

    ExitCode::Success
}

/// Info command implementation
pub fn info(bank_path: &Path, endian: EndianArg, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);

    let editor = match open_bank(bank_path, endian) {
        Ok(e) => e,
        Err(code) => return code,
    };

    print!("{}", formatter.format_info(&editor.info()));

    ExitCode::Success
}

/// Export command implementation
pub fn export(config: &ExportConfig<'_>) -> ExitCode {
    let formatter = create_formatter(config.format);

    let mut editor = match open_bank(config.bank_path, config.endian) {
        Ok(e) => e,
        Err(code) => return code,
    };

    let selector = Selector::new(config.entry, config.by_id);
    let index = match editor.resolve(selector) {
        Ok(i) => i,
        Err(e) => return report("Error", &e),
    };

    let output = match config.output {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(format!("{}.wem", editor.entries()[index].id())),
    };

    match editor.export_entry(Selector::Index(index), &output) {
        Ok(size) => {
            print!("{}", formatter.format_export(&[(output, size)]));
            ExitCode::Success
        }
        Err(e) => report("Error exporting entry", &e),
    }
}

/// Export-all command implementation
pub fn export_all(
    bank_path: &Path,
    output_dir: &Path,
    endian: EndianArg,
    format: OutputFormat,
) -> ExitCode {
    let formatter = create_formatter(format);

    let mut editor = match open_bank(bank_path, endian) {
        Ok(e) => e,
        Err(code) => return code,
    };

    let paths = match editor.export_all(output_dir) {
        Ok(p) => p,
        Err(e) => return report("Error exporting entries", &e),
    };

    let files: Vec<_> = paths
        .into_iter()
        .zip(editor.entries())
        .map(|(path, entry)| (path, u64::from(entry.original_length())))
        .collect();
    print!("{}", formatter.format_export(&files));

    ExitCode::Success
}

/// Replace command implementation
pub fn replace(config: &ReplaceConfig<'_>) -> ExitCode {
    let formatter = create_formatter(config.format);

    let assignments = match config
        .assignments
        .iter()
        .map(|a| parse_assignment(a))
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::BadArgs;
        }
    };

    let mut editor = match open_bank(config.bank_path, config.endian) {
        Ok(e) => e,
        Err(code) => return code,
    };

    for (entry, path) in &assignments {
        let selector = Selector::new(*entry, config.by_id);
        if let Err(e) = editor.set_replacement(selector, path) {
            return report(&format!("Error replacing {}", selector), &e);
        }
    }

    let output = config.output.unwrap_or(config.bank_path);
    let options = WriteOptions::new()
        .endian(config.output_endian.unwrap_or(editor.endian()))
        .atomic(config.atomic);

    match editor.write_with_options(output, &options) {
        Ok(result) => {
            print!("{}", formatter.format_write_result(output, &result));
            ExitCode::Success
        }
        Err(e) => report("Error writing bank", &e),
    }
}

fn open_bank(path: &Path, endian: EndianArg) -> Result<BankEditor<BufReader<File>>, ExitCode> {
    let endian = match endian {
        EndianArg::Little => Endian::Little,
        EndianArg::Big => Endian::Big,
        EndianArg::Auto => match detect_endian_path(path) {
            Ok(Some(detected)) => {
                log::info!("detected {} bank", detected);
                detected
            }
            Ok(None) => {
                log::warn!(
                    "could not detect byte order of '{}', assuming little-endian",
                    path.display()
                );
                Endian::Little
            }
            Err(e) => return Err(report("Error opening bank", &e)),
        },
    };

    BankEditor::open(path, endian).map_err(|e| report("Error opening bank", &e))
}

fn report(context: &str, error: &bnkedit::Error) -> ExitCode {
    eprintln!("{}: {}", context, error);
    error_to_exit_code(error)
}

/// Parses `ENTRY=FILE`.
fn parse_assignment(value: &str) -> Result<(u32, PathBuf), String> {
    let (entry, path) = value
        .split_once('=')
        .ok_or_else(|| format!("invalid replacement '{}': expected ENTRY=FILE", value))?;
    let entry = entry
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid entry '{}': {}", entry, e))?;
    if path.is_empty() {
        return Err(format!("invalid replacement '{}': missing file", value));
    }
    Ok((entry, PathBuf::from(path)))
}
