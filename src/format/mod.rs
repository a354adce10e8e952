//! Container format detection and the format-detecting entry reader.
//!
//! Containers are recognized by their magic bytes, never by extension. A
//! container may sit behind a compression filter (gzip, bzip2, xz, zstd);
//! the filter is peeled first and the decoded head is sniffed again, so a
//! `.tar.gz` is read as a TAR archive.

mod central;
pub mod detect;
pub mod reader;

pub use detect::{Container, Filter};
pub use reader::ContainerReader;

/// Which container formats a [`ContainerReader`] will accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatSupport {
    /// Multi-entry archives (ZIP, TAR), with any filter.
    All,
    /// A single filtered (or unfiltered) stream exposed as one entry named
    /// [`RAW_ENTRY_NAME`].
    Raw,
}

/// Name of the only entry a raw container yields.
pub const RAW_ENTRY_NAME: &str = "data";

/// Header of one entry, as listed by the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryHeader {
    /// Entry path with `/` separators, exactly as stored.
    pub name: String,
    /// Uncompressed size, when the format declares it up front.
    pub size: Option<u64>,
    /// True for directory entries.
    pub is_dir: bool,
    /// True if the entry data is encrypted.
    pub encrypted: bool,
}

impl EntryHeader {
    /// Returns true if this entry can be listed by glob: not a directory and
    /// not encrypted.
    pub fn is_listable(&self) -> bool {
        !self.is_dir && !self.encrypted
    }
}
