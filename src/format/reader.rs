//! Format-detecting reader over a container handle.
//!
//! [`ContainerReader`] is the Rust face of "open an archive reader with all
//! filters and all formats, then walk its headers". It owns the container
//! handle through a [`HandleAdapter`]; dropping the reader releases every
//! library resource, whichever path the caller leaves by.

use std::io::{Cursor, Read};
use std::ops::ControlFlow;

use zip::ZipArchive;

use super::central::{CentralEntry, read_central_directory};
use super::detect::{Container, Filter, read_head};
use super::{EntryHeader, FormatSupport, RAW_ENTRY_NAME};
use crate::adapter::{HandleAdapter, Whence};
use crate::vfs::FileHandle;
use crate::{Error, Result};

type DynRead = Box<dyn Read + Send>;

enum Backend {
    Zip(ZipArchive<HandleAdapter>),
    // ZIP with repeated entry names, read record by record.
    ZipOrdered {
        adapter: HandleAdapter,
        entries: Vec<CentralEntry>,
    },
    Tar(tar::Archive<DynRead>),
    Raw(Option<DynRead>),
}

/// Reader over the entries of one container.
pub struct ContainerReader {
    locator: String,
    filter: Filter,
    backend: Backend,
}

impl ContainerReader {
    /// Detects the container format behind `handle` and prepares to list it.
    ///
    /// # Errors
    ///
    /// - [`Error::NotSeekable`] if the handle cannot seek.
    /// - [`Error::ContainerInit`] if the data is not a supported container
    ///   (or, for [`FormatSupport::Raw`], the filter cannot be initialized).
    pub fn open(handle: Box<dyn FileHandle>, support: FormatSupport) -> Result<Self> {
        let locator = handle.path().to_string();
        let mut adapter = HandleAdapter::new(handle)?;
        adapter.open()?;

        let head = read_head(&mut adapter)?;
        adapter.seek(0, Whence::Start)?;
        let filter = Filter::detect(&head);

        let backend = match support {
            FormatSupport::All => Self::open_archive(adapter, &head, filter, &locator)?,
            FormatSupport::Raw => Backend::Raw(Some(filter.wrap(adapter)?)),
        };

        log::debug!(
            "opened '{}' as {} (filter {})",
            locator,
            backend_name(&backend),
            filter
        );
        Ok(Self {
            locator,
            filter,
            backend,
        })
    }

    /// Opens `handle` as a ZIP archive without sniffing.
    pub fn open_zip(handle: Box<dyn FileHandle>) -> Result<Self> {
        let locator = handle.path().to_string();
        let adapter = HandleAdapter::new(handle)?;
        let backend = open_zip_backend(adapter)?;
        log::debug!("opened '{}' as zip", locator);
        Ok(Self {
            locator,
            filter: Filter::None,
            backend,
        })
    }

    fn open_archive(
        adapter: HandleAdapter,
        head: &[u8],
        filter: Filter,
        locator: &str,
    ) -> Result<Backend> {
        if filter == Filter::None {
            return match Container::detect(head) {
                Some(Container::Zip) => open_zip_backend(adapter),
                Some(Container::Tar) => Ok(Backend::Tar(tar::Archive::new(Box::new(adapter)))),
                None => Err(unrecognized(locator)),
            };
        }

        // Peek through the filter, then replay the peeked bytes ahead of the
        // rest of the decoded stream.
        let mut decoded = filter.wrap(adapter)?;
        let inner_head = read_head(&mut decoded).map_err(|e| Error::container_init("filter", e))?;
        match Container::detect(&inner_head) {
            Some(Container::Tar) => {
                let replay: DynRead = Box::new(Cursor::new(inner_head).chain(decoded));
                Ok(Backend::Tar(tar::Archive::new(replay)))
            }
            // ZIP needs random access, which a filtered stream cannot give.
            Some(Container::Zip) | None => Err(unrecognized(locator)),
        }
    }

    /// Releases the container handle, if the format reads it directly.
    ///
    /// Only ZIP keeps the handle reachable; filtered and sequential formats
    /// consume it inside their decoder chain.
    pub fn into_handle(self) -> Option<Box<dyn FileHandle>> {
        match self.backend {
            Backend::Zip(archive) => Some(archive.into_inner().into_inner()),
            Backend::ZipOrdered { adapter, .. } => Some(adapter.into_inner()),
            Backend::Tar(_) | Backend::Raw(_) => None,
        }
    }

    /// Returns the container locator.
    pub fn locator(&self) -> &str {
        &self.locator
    }

    /// Returns the detected filter.
    pub fn filter(&self) -> Filter {
        self.filter
    }

    /// Walks entry headers in container order until `visit` breaks.
    pub fn for_each_entry<F>(&mut self, mut visit: F) -> Result<()>
    where
        F: FnMut(&EntryHeader) -> Result<ControlFlow<()>>,
    {
        match &mut self.backend {
            Backend::Zip(archive) => {
                for index in 0..archive.len() {
                    let header = zip_header(archive, index)?;
                    if visit(&header)?.is_break() {
                        break;
                    }
                }
            }
            Backend::ZipOrdered { entries, .. } => {
                for entry in entries.iter() {
                    if visit(&entry.header)?.is_break() {
                        break;
                    }
                }
            }
            Backend::Tar(archive) => {
                let entries = archive
                    .entries()
                    .map_err(|e| Error::container_init("tar", e))?;
                for entry in entries {
                    let entry = entry?;
                    if visit(&tar_header(&entry))?.is_break() {
                        break;
                    }
                }
            }
            Backend::Raw(reader) => {
                if reader.is_some() {
                    let _ = visit(&raw_header())?;
                }
            }
        }
        Ok(())
    }

    /// Finds the first entry accepted by `select` and hands its data to
    /// `read`.
    ///
    /// Returns `Ok(None)` if no entry is accepted. Entries are visited at
    /// most once; a TAR or raw reader cannot be rewound.
    pub fn find_entry<P, R, T>(&mut self, mut select: P, read: R) -> Result<Option<T>>
    where
        P: FnMut(&EntryHeader) -> bool,
        R: FnOnce(&EntryHeader, &mut dyn Read) -> Result<T>,
    {
        match &mut self.backend {
            Backend::Zip(archive) => {
                for index in 0..archive.len() {
                    let header = zip_header(archive, index)?;
                    if select(&header) {
                        let mut file = archive
                            .by_index(index)
                            .map_err(|e| Error::container_init("zip entry", e))?;
                        return read(&header, &mut file).map(Some);
                    }
                }
                Ok(None)
            }
            Backend::ZipOrdered { adapter, entries } => {
                for entry in entries.iter() {
                    if select(&entry.header) {
                        let mut data = entry.open(adapter)?;
                        return read(&entry.header, &mut data).map(Some);
                    }
                }
                Ok(None)
            }
            Backend::Tar(archive) => {
                let entries = archive
                    .entries()
                    .map_err(|e| Error::container_init("tar", e))?;
                for entry in entries {
                    let mut entry = entry?;
                    let header = tar_header(&entry);
                    if select(&header) {
                        return read(&header, &mut entry).map(Some);
                    }
                }
                Ok(None)
            }
            Backend::Raw(slot) => {
                let header = raw_header();
                if !select(&header) {
                    return Ok(None);
                }
                match slot.take() {
                    Some(mut reader) => read(&header, &mut reader).map(Some),
                    None => Ok(None),
                }
            }
        }
    }
}

impl ContainerReader {
    /// Finds the entry named exactly `name` and hands its data to `read`.
    ///
    /// Directory and encrypted entries never match. The first entry with the
    /// name wins. ZIP archives without repeated names resolve it through the
    /// central directory index; everything else scans headers in order.
    pub fn find_named<R, T>(&mut self, name: &str, read: R) -> Result<Option<T>>
    where
        R: FnOnce(&EntryHeader, &mut dyn Read) -> Result<T>,
    {
        let Backend::Zip(archive) = &mut self.backend else {
            return self.find_entry(|h| h.is_listable() && h.name == name, read);
        };
        let Some(index) = archive.index_for_name(name) else {
            return Ok(None);
        };
        let header = zip_header(archive, index)?;
        if !header.is_listable() {
            return Ok(None);
        }
        let mut file = archive
            .by_index(index)
            .map_err(|e| Error::container_init("zip entry", e))?;
        read(&header, &mut file).map(Some)
    }
}

impl std::fmt::Debug for ContainerReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerReader")
            .field("locator", &self.locator)
            .field("format", &backend_name(&self.backend))
            .field("filter", &self.filter)
            .finish()
    }
}

fn backend_name(backend: &Backend) -> &'static str {
    match backend {
        Backend::Zip(_) | Backend::ZipOrdered { .. } => Container::Zip.name(),
        Backend::Tar(_) => Container::Tar.name(),
        Backend::Raw(_) => "raw",
    }
}

/// Opens a ZIP backend, falling back to an ordered record walk when the
/// central directory repeats a name.
fn open_zip_backend(adapter: HandleAdapter) -> Result<Backend> {
    let archive = ZipArchive::new(adapter).map_err(|e| Error::container_init("zip", e))?;
    let indexed = archive.len();
    let dir_start = archive.central_directory_start();
    let archive_offset = archive.offset();

    let mut adapter = archive.into_inner();
    let entries = read_central_directory(&mut adapter, dir_start, archive_offset)?;
    if entries.len() == indexed {
        let archive = ZipArchive::new(adapter).map_err(|e| Error::container_init("zip", e))?;
        return Ok(Backend::Zip(archive));
    }
    log::debug!(
        "zip directory lists {} records under {} names, reading in record order",
        entries.len(),
        indexed
    );
    Ok(Backend::ZipOrdered { adapter, entries })
}

fn unrecognized(locator: &str) -> Error {
    Error::container_init("format", format!("unrecognized archive format in '{}'", locator))
}

fn zip_header(archive: &mut ZipArchive<HandleAdapter>, index: usize) -> Result<EntryHeader> {
    let file = archive
        .by_index_raw(index)
        .map_err(|e| Error::container_init("zip header", e))?;
    Ok(EntryHeader {
        name: file.name().to_string(),
        size: Some(file.size()),
        is_dir: file.is_dir(),
        encrypted: file.encrypted(),
    })
}

fn tar_header<R: Read>(entry: &tar::Entry<'_, R>) -> EntryHeader {
    EntryHeader {
        name: String::from_utf8_lossy(&entry.path_bytes()).into_owned(),
        size: Some(entry.size()),
        is_dir: entry.header().entry_type().is_dir(),
        encrypted: false,
    }
}

fn raw_header() -> EntryHeader {
    EntryHeader {
        name: RAW_ENTRY_NAME.to_string(),
        size: None,
        is_dir: false,
        encrypted: false,
    }
}
