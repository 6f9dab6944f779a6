//! CLI tool for SoundBank inspection and patching.

mod commands;
mod exit_codes;
mod output;

use clap::{ArgAction, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use std::path::PathBuf;

use exit_codes::ExitCode;

/// Wwise SoundBank editor
#[derive(Parser)]
#[command(name = "bnkedit")]
#[command(author, version, about = "Wwise SoundBank editor", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "human", global = true)]
    format: OutputFormat,

    /// Byte order of the bank
    #[arg(long, short = 'e', value_enum, default_value = "auto", global = true)]
    endian: EndianArg,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List embedded entries (alias: l)
    #[command(alias = "l")]
    List {
        /// Bank file to list
        bank: PathBuf,
    },

    /// Show bank information (alias: i)
    #[command(alias = "i")]
    Info {
        /// Bank file to inspect
        bank: PathBuf,
    },

    /// Export one entry (alias: x)
    #[command(alias = "x")]
    Export {
        /// Bank file to read
        bank: PathBuf,

        /// Entry id, or position with --index
        entry: u32,

        /// Output file (defaults to <id>.wem)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Select the entry by zero-based position instead of id
        #[arg(long)]
        index: bool,
    },

    /// Export every entry as <position>_<id>.wem
    ExportAll {
        /// Bank file to read
        bank: PathBuf,

        /// Output directory
        #[arg(short = 'o', long, default_value = ".")]
        output: PathBuf,
    },

    /// Replace entries and write the bank (alias: r)
    #[command(alias = "r")]
    Replace {
        /// Bank file to patch
        bank: PathBuf,

        /// Replacement as ENTRY=FILE (repeatable)
        #[arg(short = 's', long = "set", value_name = "ENTRY=FILE", required = true)]
        assignments: Vec<String>,

        /// Output file (defaults to overwriting the input bank)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Interpret ENTRY as zero-based position instead of id
        #[arg(long)]
        index: bool,

        /// Byte order of the written bank (defaults to the input's)
        #[arg(long, value_enum)]
        output_endian: Option<EndianValue>,

        /// Write directly to the output instead of through a temporary file
        #[arg(long)]
        no_atomic: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum EndianArg {
    Auto,
    Little,
    Big,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum EndianValue {
    Little,
    Big,
}

impl From<EndianValue> for bnkedit::Endian {
    fn from(value: EndianValue) -> Self {
        match value {
            EndianValue::Little => bnkedit::Endian::Little,
            EndianValue::Big => bnkedit::Endian::Big,
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match cli.command {
        Commands::List { bank } => commands::list(&bank, cli.endian, cli.format),

        Commands::Info { bank } => commands::info(&bank, cli.endian, cli.format),

        Commands::Export {
            bank,
            entry,
            output,
            index,
        } => commands::export(&commands::ExportConfig {
            bank_path: &bank,
            entry,
            by_id: !index,
            output: output.as_deref(),
            endian: cli.endian,
            format: cli.format,
        }),

        Commands::ExportAll { bank, output } => {
            commands::export_all(&bank, &output, cli.endian, cli.format)
        }

        Commands::Replace {
            bank,
            assignments,
            output,
            index,
            output_endian,
            no_atomic,
        } => commands::replace(&commands::ReplaceConfig {
            bank_path: &bank,
            assignments: &assignments,
            output: output.as_deref(),
            by_id: !index,
            endian: cli.endian,
            output_endian: output_endian.map(Into::into),
            atomic: !no_atomic,
            format: cli.format,
        }),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
            ExitCode::Success
        }
    };

    std::process::exit(exit_code.code());
}
