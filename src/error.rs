//! Error types for virtual archive filesystem operations.
//!
//! This module provides the [`Error`] enum which represents every failure
//! mode of opening, globbing and reading files inside containers, along with
//! a convenient [`Result<T>`] type alias.
//!
//! # Error Handling
//!
//! All fallible operations in this crate return `Result<T, Error>`:
//!
//! ```rust,no_run
//! use zipvfs::{Error, OpenFlags, VirtualFileSystem};
//!
//! fn read_report(vfs: &VirtualFileSystem) -> zipvfs::Result<Vec<u8>> {
//!     let mut handle = match vfs.open_file("archive://data.zip/report.csv", OpenFlags::READ) {
//!         Ok(handle) => handle,
//!         Err(Error::EntryNotFound { entry, .. }) => {
//!             eprintln!("no entry named {entry}");
//!             return Ok(Vec::new());
//!         }
//!         Err(e) => return Err(e),
//!     };
//!     let mut buf = vec![0u8; handle.size()? as usize];
//!     handle.read(&mut buf)?;
//!     Ok(buf)
//! }
//! ```
//!
//! ## Existence Checks
//!
//! `file_exists` is deliberately not symmetric with `open_file`: a missing
//! entry, an unreadable container or a container that fails to initialize
//! all degrade to `Ok(false)`, while a malformed composite path is still an
//! error.

use std::io;

/// The main error type for virtual archive filesystem operations.
///
/// | Category | Variants | Typical Cause |
/// |----------|----------|---------------|
/// | Path | [`MalformedPath`][Self::MalformedPath] | No container marker in a composite path |
/// | Capability | [`Unsupported`][Self::Unsupported], [`NotSeekable`][Self::NotSeekable] | Write access, missing timestamps, streaming-only sources |
/// | Container | [`ContainerInit`][Self::ContainerInit] | Unrecognized or damaged container |
/// | Lookup | [`EntryNotFound`][Self::EntryNotFound] | Inner path not present |
/// | Integrity | [`ShortRead`][Self::ShortRead], [`Decode`][Self::Decode] | Truncated or corrupt data |
/// | Pattern | [`InvalidGlob`][Self::InvalidGlob] | Unsupported glob shapes |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred in the underlying filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The composite path has no recognizable container marker, or the
    /// marker is followed by something other than a path separator.
    #[error("Malformed archive path '{path}': {reason}")]
    MalformedPath {
        /// The composite path as given by the caller.
        path: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The operation is not supported by this handle or filesystem.
    ///
    /// Returned for write access and for last-modified queries on sources
    /// that do not record a timestamp. Callers must not treat this as a
    /// zero timestamp.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// The underlying source cannot seek, so no container reader is built.
    #[error("Cannot seek in '{path}'")]
    NotSeekable {
        /// The container locator.
        path: String,
    },

    /// The container reader or decoder failed to initialize.
    #[error("Failed to initialize container reader ({stage}): {message}")]
    ContainerInit {
        /// Which step of initialization failed.
        stage: &'static str,
        /// The library's own diagnostic.
        message: String,
    },

    /// No entry with the requested inner path exists in the container.
    #[error("Failed to find file '{entry}' in '{container}'")]
    EntryNotFound {
        /// The container locator.
        container: String,
        /// The inner path that was looked up.
        entry: String,
    },

    /// An entry declared a size up front but fewer bytes were decoded.
    #[error("Failed to read '{entry}': expected {expected} bytes, got {actual}")]
    ShortRead {
        /// The inner path being read.
        entry: String,
        /// The declared size.
        expected: u64,
        /// The number of bytes actually produced.
        actual: u64,
    },

    /// A stream decoder reported an error.
    #[error("{codec} decompression error: {reason} (error {code})")]
    Decode {
        /// Codec name, e.g. `"xz"`.
        codec: &'static str,
        /// The decoder's numeric return code.
        code: i32,
        /// Human-readable classification of the code.
        reason: &'static str,
    },

    /// The glob pattern has a shape this filesystem does not support.
    #[error("Invalid glob pattern: {0}")]
    InvalidGlob(String),
}

impl Error {
    /// Returns `true` if this error means the requested entry does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::EntryNotFound { .. } => true,
            Error::Io(e) => e.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Returns `true` if this error reports an unsupported operation.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Error::Unsupported(_) | Error::NotSeekable { .. })
    }

    /// Returns `true` if this is a data corruption or truncation error.
    pub fn is_corruption(&self) -> bool {
        matches!(self, Error::ShortRead { .. } | Error::Decode { .. })
    }

    /// Creates a MalformedPath error.
    pub fn malformed_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a ContainerInit error from a library diagnostic.
    pub fn container_init(stage: &'static str, message: impl ToString) -> Self {
        Error::ContainerInit {
            stage,
            message: message.to_string(),
        }
    }

    /// Creates an EntryNotFound error.
    pub fn entry_not_found(container: impl Into<String>, entry: impl Into<String>) -> Self {
        Error::EntryNotFound {
            container: container.into(),
            entry: entry.into(),
        }
    }
}

/// A specialized Result type for virtual archive filesystem operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_from() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("I/O error"));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_malformed_path() {
        let err = Error::malformed_path("data/file.csv", "no '.zip' archive found");
        assert_eq!(
            err.to_string(),
            "Malformed archive path 'data/file.csv': no '.zip' archive found"
        );
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_entry_not_found() {
        let err = Error::entry_not_found("a.zip", "missing.csv");
        assert_eq!(err.to_string(), "Failed to find file 'missing.csv' in 'a.zip'");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_container_init_keeps_diagnostic() {
        let err = Error::container_init("format", "unrecognized archive format");
        let msg = err.to_string();
        assert!(msg.contains("format"));
        assert!(msg.contains("unrecognized archive format"));
    }

    #[test]
    fn test_decode_error() {
        let err = Error::Decode {
            codec: "xz",
            code: 9,
            reason: "compressed data is corrupt",
        };
        assert_eq!(
            err.to_string(),
            "xz decompression error: compressed data is corrupt (error 9)"
        );
        assert!(err.is_corruption());
    }

    #[test]
    fn test_short_read() {
        let err = Error::ShortRead {
            entry: "a.txt".into(),
            expected: 10,
            actual: 4,
        };
        assert!(err.is_corruption());
        assert!(err.to_string().contains("expected 10 bytes, got 4"));
    }

    #[test]
    fn test_is_unsupported() {
        assert!(Error::Unsupported("write".into()).is_unsupported());
        assert!(Error::NotSeekable { path: "x".into() }.is_unsupported());
        assert!(!Error::InvalidGlob("x".into()).is_unsupported());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
