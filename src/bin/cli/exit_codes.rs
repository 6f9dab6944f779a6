//! Exit codes for the CLI tool.

use bnkedit::Error;

/// Exit code constants
pub const SUCCESS: i32 = 0;
/// Fatal error occurred
pub const FATAL_ERROR: i32 = 2;
/// Bank format error
pub const BAD_BANK: i32 = 3;
/// Requested entry does not exist
pub const NOT_FOUND: i32 = 4;
/// I/O error
pub const IO_ERROR: i32 = 5;
/// Invalid command line arguments
pub const BAD_ARGS: i32 = 255;

/// Exit code enum for structured handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    FatalError,
    BadBank,
    NotFound,
    IoError,
    BadArgs,
}

impl ExitCode {
    /// Returns the numeric exit code
    pub fn code(self) -> i32 {
        match self {
            Self::Success => SUCCESS,
            Self::FatalError => FATAL_ERROR,
            Self::BadBank => BAD_BANK,
            Self::NotFound => NOT_FOUND,
            Self::IoError => IO_ERROR,
            Self::BadArgs => BAD_ARGS,
        }
    }
}

/// Converts a bnkedit error to an exit code
pub fn error_to_exit_code(error: &Error) -> ExitCode {
    match error {
        Error::Io(_) | Error::StaleReplacementSource { .. } => ExitCode::IoError,
        Error::MalformedHeader { .. } | Error::CorruptSection { .. } => ExitCode::BadBank,
        Error::InsufficientData { .. } | Error::OutOfRange { .. } => ExitCode::BadBank,
        Error::LookupFailure { .. } => ExitCode::NotFound,
        Error::CapacityExceeded { .. } => ExitCode::FatalError,
        // Future error variants - required by #[non_exhaustive]
        _ => ExitCode::FatalError,
    }
}
