//! Exit codes for the CLI tool.

use zipvfs::Error;

/// Exit code constants
pub const SUCCESS: i32 = 0;
/// The queried file does not exist
pub const NOT_FOUND: i32 = 1;
/// Fatal error occurred
pub const FATAL_ERROR: i32 = 2;
/// Container or compressed data is unreadable
pub const BAD_ARCHIVE: i32 = 3;
/// Operation not supported by the source
pub const UNSUPPORTED: i32 = 4;
/// I/O error
pub const IO_ERROR: i32 = 5;
/// Malformed path or pattern
pub const BAD_ARGS: i32 = 255;

/// Exit code enum for structured handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    NotFound,
    FatalError,
    BadArchive,
    Unsupported,
    IoError,
    BadArgs,
}

impl ExitCode {
    /// Returns the numeric exit code
    pub fn code(self) -> i32 {
        match self {
            Self::Success => SUCCESS,
            Self::NotFound => NOT_FOUND,
            Self::FatalError => FATAL_ERROR,
            Self::BadArchive => BAD_ARCHIVE,
            Self::Unsupported => UNSUPPORTED,
            Self::IoError => IO_ERROR,
            Self::BadArgs => BAD_ARGS,
        }
    }
}

/// Converts a zipvfs error to an exit code
pub fn error_to_exit_code(error: &Error) -> ExitCode {
    if error.is_not_found() {
        return ExitCode::NotFound;
    }
    match error {
        Error::Io(_) => ExitCode::IoError,
        Error::MalformedPath { .. } | Error::InvalidGlob(_) => ExitCode::BadArgs,
        Error::Unsupported(_) | Error::NotSeekable { .. } => ExitCode::Unsupported,
        Error::ContainerInit { .. } | Error::ShortRead { .. } | Error::Decode { .. } => {
            ExitCode::BadArchive
        }
        // Future error variants - required by #[non_exhaustive]
        _ => ExitCode::FatalError,
    }
}
