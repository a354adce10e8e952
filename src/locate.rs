//! Finding a named entry in a container and materializing its bytes.

use std::io::Read;

use crate::adapter::BLOCK_SIZE;
use crate::format::{ContainerReader, EntryHeader, FormatSupport};
use crate::vfs::FileHandle;
use crate::{Error, Result};

/// Opens `container` and returns the full contents of the entry whose name
/// equals `inner_path` exactly.
///
/// The first matching entry wins. Directory and encrypted entries are
/// never matched.
///
/// The container handle is consumed and released before returning.
///
/// # Errors
///
/// - [`Error::NotSeekable`] / [`Error::ContainerInit`] from opening.
/// - [`Error::EntryNotFound`] if no entry has that name.
/// - [`Error::ShortRead`] if the entry declared more bytes than it holds.
pub fn locate_and_extract(container: Box<dyn FileHandle>, inner_path: &str) -> Result<Box<[u8]>> {
    let mut reader = ContainerReader::open(container, FormatSupport::All)?;
    reader
        .find_named(inner_path, read_entry_fully)?
        .ok_or_else(|| Error::entry_not_found(reader.locator(), inner_path))
}

/// Opens `container` as a raw single-stream container and returns the
/// decoded contents of its only entry.
pub fn extract_raw(container: Box<dyn FileHandle>) -> Result<Box<[u8]>> {
    let mut reader = ContainerReader::open(container, FormatSupport::Raw)?;
    reader
        .find_entry(|_| true, read_entry_fully)?
        .ok_or_else(|| Error::entry_not_found(reader.locator(), "inside compressed file"))
}

/// Returns true if `container` holds a readable entry named `inner_path`.
///
/// A raw container always holds exactly one entry, so for
/// [`FormatSupport::Raw`] the name is ignored and success of opening the
/// filter decides.
pub fn entry_exists(
    container: Box<dyn FileHandle>,
    inner_path: &str,
    support: FormatSupport,
) -> Result<bool> {
    let mut reader = ContainerReader::open(container, support)?;
    let found = match support {
        FormatSupport::All => reader.find_named(inner_path, |_, _| Ok(()))?,
        FormatSupport::Raw => reader.find_entry(|_| true, |_, _| Ok(()))?,
    };
    Ok(found.is_some())
}

/// Reads an entry's data into one right-sized buffer.
///
/// With a declared size, exactly that many bytes must be produced. Without
/// one, data is pulled in [`BLOCK_SIZE`] blocks until the reader is drained.
pub fn read_entry_fully(header: &EntryHeader, reader: &mut dyn Read) -> Result<Box<[u8]>> {
    match header.size {
        Some(size) => read_declared(header, reader, size),
        None => read_until_eof(reader),
    }
}

fn read_declared(header: &EntryHeader, reader: &mut dyn Read, size: u64) -> Result<Box<[u8]>> {
    let len = usize::try_from(size).map_err(|_| out_of_memory(size))?;
    let mut data = Vec::new();
    data.try_reserve_exact(len).map_err(|_| out_of_memory(size))?;
    data.resize(len, 0);

    let mut filled = 0;
    while filled < len {
        let n = reader.read(&mut data[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    if filled < len {
        return Err(Error::ShortRead {
            entry: header.name.clone(),
            expected: size,
            actual: filled as u64,
        });
    }
    Ok(data.into_boxed_slice())
}

fn read_until_eof(reader: &mut dyn Read) -> Result<Box<[u8]>> {
    let mut data = Vec::new();
    let mut block = vec![0u8; BLOCK_SIZE];
    loop {
        let n = reader.read(&mut block)?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&block[..n]);
    }
    Ok(data.into_boxed_slice())
}

fn out_of_memory(size: u64) -> Error {
    Error::Io(std::io::Error::new(
        std::io::ErrorKind::OutOfMemory,
        format!("cannot allocate {} bytes for entry", size),
    ))
}
