//! Ordered walk of a ZIP central directory.
//!
//! `zip::ZipArchive` indexes entries by name, so when a name repeats only the
//! last record stays reachable. Archives with repeated names are read
//! through this listing instead, which keeps every record in directory
//! order.

use std::io::Read;

use super::EntryHeader;
use crate::adapter::{HandleAdapter, Whence};
use crate::{Error, Result};

const CENTRAL_SIGNATURE: u32 = 0x0201_4b50;
const LOCAL_SIGNATURE: u32 = 0x0403_4b50;
const LOCAL_FIXED_LEN: u64 = 30;
const ZIP64_EXTRA_ID: u16 = 0x0001;
const ZIP64_MARKER: u64 = u32::MAX as u64;
const STORED: u16 = 0;
const DEFLATED: u16 = 8;

/// One central directory record.
#[derive(Debug, Clone)]
pub(crate) struct CentralEntry {
    pub(crate) header: EntryHeader,
    method: u16,
    compressed_size: u64,
    local_header: u64,
}

impl CentralEntry {
    /// Positions `adapter` at the entry data and returns a decoding reader
    /// over exactly the stored bytes.
    pub(crate) fn open<'a>(&self, adapter: &'a mut HandleAdapter) -> Result<Box<dyn Read + 'a>> {
        let name = &self.header.name;
        if self.header.encrypted {
            return Err(Error::container_init(
                "zip entry",
                format!("'{}' is encrypted", name),
            ));
        }

        seek_to(adapter, self.local_header)?;
        let mut fixed = [0u8; LOCAL_FIXED_LEN as usize];
        read_exact(adapter, &mut fixed)?;
        if le32(&fixed, 0) != LOCAL_SIGNATURE {
            return Err(Error::container_init(
                "zip entry",
                format!("no local header for '{}'", name),
            ));
        }
        let variable = u64::from(le16(&fixed, 26)) + u64::from(le16(&fixed, 28));
        seek_to(adapter, self.local_header + LOCAL_FIXED_LEN + variable)?;

        let data = Read::take(adapter, self.compressed_size);
        match self.method {
            STORED => Ok(Box::new(data)),
            DEFLATED => Ok(Box::new(flate2::read::DeflateDecoder::new(data))),
            method => Err(Error::container_init(
                "zip entry",
                format!("'{}' uses unsupported compression method {}", name, method),
            )),
        }
    }
}

/// Reads every central directory record starting at `dir_start`.
///
/// `archive_offset` is the length of data prepended to the archive; local
/// header offsets in the records are relative to it.
pub(crate) fn read_central_directory(
    adapter: &mut HandleAdapter,
    dir_start: u64,
    archive_offset: u64,
) -> Result<Vec<CentralEntry>> {
    seek_to(adapter, dir_start)?;
    let mut entries = Vec::new();
    loop {
        let mut signature = [0u8; 4];
        read_exact(adapter, &mut signature)?;
        if u32::from_le_bytes(signature) != CENTRAL_SIGNATURE {
            break;
        }

        // Offsets below count from the end of the signature.
        let mut fixed = [0u8; 42];
        read_exact(adapter, &mut fixed)?;
        let flags = le16(&fixed, 4);
        let method = le16(&fixed, 6);
        let mut compressed_size = u64::from(le32(&fixed, 16));
        let mut size = u64::from(le32(&fixed, 20));
        let name_len = usize::from(le16(&fixed, 24));
        let extra_len = usize::from(le16(&fixed, 26));
        let comment_len = usize::from(le16(&fixed, 28));
        let mut local_header = u64::from(le32(&fixed, 38));

        let mut variable = vec![0u8; name_len + extra_len + comment_len];
        read_exact(adapter, &mut variable)?;
        let name = String::from_utf8_lossy(&variable[..name_len]).into_owned();
        apply_zip64(
            &variable[name_len..name_len + extra_len],
            [&mut size, &mut compressed_size, &mut local_header],
        );

        entries.push(CentralEntry {
            header: EntryHeader {
                is_dir: name.ends_with('/'),
                encrypted: flags & 1 != 0,
                size: Some(size),
                name,
            },
            method,
            compressed_size,
            local_header: archive_offset + local_header,
        });
    }
    Ok(entries)
}

/// Replaces saturated 32-bit fields with their zip64 extra values, in the
/// order the extra field stores them.
fn apply_zip64(mut extra: &[u8], fields: [&mut u64; 3]) {
    while extra.len() >= 4 {
        let id = le16(extra, 0);
        let len = usize::from(le16(extra, 2)).min(extra.len() - 4);
        if id == ZIP64_EXTRA_ID {
            let mut values = &extra[4..4 + len];
            for field in fields {
                if *field == ZIP64_MARKER && values.len() >= 8 {
                    *field = le64(values, 0);
                    values = &values[8..];
                }
            }
            return;
        }
        extra = &extra[4 + len..];
    }
}

fn seek_to(adapter: &mut HandleAdapter, position: u64) -> Result<()> {
    let offset = i64::try_from(position)
        .map_err(|_| Error::container_init("zip directory", "offset out of range"))?;
    adapter.seek(offset, Whence::Start)?;
    Ok(())
}

fn read_exact(adapter: &mut HandleAdapter, buf: &mut [u8]) -> Result<()> {
    adapter
        .read_exact(buf)
        .map_err(|e| Error::container_init("zip directory", e))
}

fn le16(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

fn le32(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

fn le64(buf: &[u8], at: usize) -> u64 {
    u64::from(le32(buf, at)) | (u64::from(le32(buf, at + 4)) << 32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zip64_extra_overrides_saturated_fields() {
        let mut size = ZIP64_MARKER;
        let mut compressed = 10;
        let mut local = ZIP64_MARKER;
        let mut extra = Vec::new();
        extra.extend_from_slice(&0x5455u16.to_le_bytes());
        extra.extend_from_slice(&1u16.to_le_bytes());
        extra.push(0);
        extra.extend_from_slice(&ZIP64_EXTRA_ID.to_le_bytes());
        extra.extend_from_slice(&16u16.to_le_bytes());
        extra.extend_from_slice(&(5u64 << 32).to_le_bytes());
        extra.extend_from_slice(&77u64.to_le_bytes());

        apply_zip64(&extra, [&mut size, &mut compressed, &mut local]);
        assert_eq!(size, 5 << 32);
        assert_eq!(compressed, 10);
        assert_eq!(local, 77);
    }

    #[test]
    fn test_truncated_extra_is_ignored() {
        let mut size = ZIP64_MARKER;
        let mut compressed = 1;
        let mut local = 2;
        apply_zip64(&[0x01, 0x00, 0x08], [&mut size, &mut compressed, &mut local]);
        assert_eq!(size, ZIP64_MARKER);
    }
}
