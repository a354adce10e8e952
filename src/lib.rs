//! # zipvfs
//!
//! A read-only virtual filesystem that reaches inside containers.
//!
//! Composite paths name a file inside a ZIP or TAR archive, or the
//! decompressed contents of a single compressed file. The container itself
//! is located through any [`FileSystem`], so archives on local disk, in
//! memory or behind a caller-supplied remote layer are read the same way.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use zipvfs::{OpenFlags, Result, VirtualFileSystem};
//!
//! fn main() -> Result<()> {
//!     let vfs = VirtualFileSystem::new();
//!
//!     // An entry inside a ZIP archive on local disk.
//!     let mut handle = vfs.open_file("archive://data/sales.zip/2024/q1.csv", OpenFlags::READ)?;
//!     let mut csv = vec![0u8; handle.size()? as usize];
//!     handle.read(&mut csv)?;
//!
//!     // Every file in every matching archive.
//!     for path in vfs.glob("archive://data/*.zip/**")? {
//!         println!("{path}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Path Schemes
//!
//! | Scheme | Reads |
//! |--------|-------|
//! | `archive://<locator><split>/<entry>` | an entry of a ZIP or TAR archive, optionally gzip/bzip2/xz/zstd filtered |
//! | `zip://<locator>.zip/<entry>` | an entry of a ZIP archive |
//! | `compressed://<locator>` | a whole compressed file |
//! | `bz2://<locator>`, `bzip2://<locator>` | a bzip2 file, concatenated streams included |
//! | `xz://<locator>`, `lzma://<locator>` | an xz file, concatenated streams included |
//!
//! For `archive://`, the boundary between locator and entry is set by the
//! session [`ArchiveConfig`]: an explicit split token, or a container suffix
//! (`.zip` by default).
//!
//! ```rust
//! use zipvfs::ArchiveConfig;
//! use zipvfs::archive_path::split_archive_path;
//!
//! let config = ArchiveConfig::default().split("!");
//! let split = split_archive_path("s3://bucket/logs.tar.gz!/app/1.log", &config.separator())?;
//! assert_eq!(split.locator, "s3://bucket/logs.tar.gz");
//! assert_eq!(split.inner, "app/1.log");
//! # Ok::<(), zipvfs::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `parallel` | Yes | Multi-threaded xz decoding for large inputs |
//! | `sysinfo` | Yes | Physical memory detection for the xz threading memory limit |
//! | `zstd` | No | Zstandard-filtered TAR archives and raw files |
//! | `cli` | No | Command-line interface tool |
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`]. Existence checks are lenient: only a
//! malformed composite path is an error, any other failure reads as "does
//! not exist".
//!
//! ```rust,no_run
//! use zipvfs::{Error, OpenFlags, VirtualFileSystem};
//!
//! let vfs = VirtualFileSystem::new();
//! match vfs.open_file("archive://a.zip/missing.txt", OpenFlags::READ) {
//!     Ok(_) => {}
//!     Err(e) if e.is_not_found() => eprintln!("not there"),
//!     Err(Error::MalformedPath { reason, .. }) => eprintln!("bad path: {reason}"),
//!     Err(e) => eprintln!("{e}"),
//! }
//! ```
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! This crate requires **Rust 1.85** or later.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod adapter;
pub mod archive_path;
pub mod codec;
pub mod config;
pub mod error;
pub mod format;
pub mod fs;
pub mod glob;
pub mod handle;
pub mod locate;
pub mod pipeline;
pub mod vfs;

pub use adapter::{HandleAdapter, Whence};
pub use archive_path::{Separator, SplitPath, split_archive_path};
pub use codec::StreamCodec;
pub use config::ArchiveConfig;
pub use error::{Error, Result};
pub use fs::{ArchiveFileSystem, RawArchiveFileSystem, StreamFileSystem, ZipFileSystem};
pub use handle::{MetadataSource, ResolvedFileHandle};
pub use vfs::{
    Context, FileHandle, FileSystem, FileType, LocalFileSystem, MemoryFile, MemoryFileSystem,
    OpenFlags, VirtualFileSystem,
};
