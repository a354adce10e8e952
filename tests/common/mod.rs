//! Shared test utilities for integration tests.
//!
//! Container builders produce real ZIP, TAR and compressed byte streams with
//! the same libraries the crate reads them with.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zipvfs::{FileHandle, MemoryFile, MemoryFileSystem, VirtualFileSystem};

/// Builds a ZIP archive. Names ending in `/` become directory entries.
pub fn create_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    create_zip_with(SimpleFileOptions::default(), entries)
}

/// Builds a ZIP archive with stored (uncompressed) entries.
pub fn create_stored_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    create_zip_with(options, entries)
}

fn create_zip_with(options: SimpleFileOptions, entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).expect("add directory");
        } else {
            writer.start_file(*name, options).expect("start file");
            writer.write_all(data).expect("write entry");
        }
    }
    writer.finish().expect("finish zip").into_inner()
}

/// Sets the "encrypted" flag on every entry of a ZIP archive in place.
///
/// Only the flag changes; the data stays readable bytes, so readers that
/// honor the flag refuse the entry while listing still sees it. Use with
/// [`create_stored_zip`] so entry data cannot contain header signatures.
pub fn mark_zip_encrypted(zip: &mut [u8]) {
    const LOCAL: &[u8] = b"PK\x03\x04";
    const CENTRAL: &[u8] = b"PK\x01\x02";
    let mut i = 0;
    while i + 4 <= zip.len() {
        let flag_offset = if &zip[i..i + 4] == LOCAL {
            Some(i + 6)
        } else if &zip[i..i + 4] == CENTRAL {
            Some(i + 8)
        } else {
            None
        };
        if let Some(offset) = flag_offset {
            zip[offset] |= 0x01;
            i += 4;
        } else {
            i += 1;
        }
    }
}

/// Renames every entry called `from` to `to` in place, in both local and
/// central headers. Names must have the same length. Renaming onto an
/// existing name yields an archive with a repeated entry name.
pub fn rename_zip_entry(zip: &mut [u8], from: &str, to: &str) {
    assert_eq!(from.len(), to.len(), "rename must keep the name length");
    let (from, to) = (from.as_bytes(), to.as_bytes());
    let mut i = 0;
    while i + from.len() <= zip.len() {
        if &zip[i..i + from.len()] == from {
            zip[i..i + to.len()].copy_from_slice(to);
            i += from.len();
        } else {
            i += 1;
        }
    }
}

/// Builds an uncompressed TAR archive.
pub fn create_tar(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (name, data) in entries {
        let mut header = tar::Header::new_gnu();
        if name.ends_with('/') {
            header.set_entry_type(tar::EntryType::Directory);
            header.set_size(0);
        } else {
            header.set_size(data.len() as u64);
        }
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, *data)
            .expect("append tar entry");
    }
    builder.into_inner().expect("finish tar")
}

/// gzip-compresses `data`.
pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder.write_all(data).expect("gzip");
    encoder.finish().expect("gzip finish")
}

/// bzip2-compresses `data` as a single stream.
pub fn bz2(data: &[u8]) -> Vec<u8> {
    let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::fast());
    encoder.write_all(data).expect("bzip2");
    encoder.finish().expect("bzip2 finish")
}

/// xz-compresses `data` as a single stream.
pub fn xz(data: &[u8]) -> Vec<u8> {
    let mut encoder = liblzma::write::XzEncoder::new(Vec::new(), 1);
    encoder.write_all(data).expect("xz");
    encoder.finish().expect("xz finish")
}

/// Incompressible bytes from a seeded generator.
pub fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
    use rand::{RngCore, SeedableRng};
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let mut data = vec![0u8; len];
    rng.fill_bytes(&mut data);
    data
}

/// A virtual filesystem over an in-memory store holding `files`.
pub fn memory_vfs(files: Vec<(&str, MemoryFile)>) -> VirtualFileSystem {
    let base = MemoryFileSystem::new();
    for (path, file) in files {
        base.insert(path, file);
    }
    VirtualFileSystem::with_base(Box::new(base))
}

/// Reads a handle from its cursor to the end.
pub fn read_to_end(handle: &mut dyn FileHandle) -> Vec<u8> {
    let mut out = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = handle.read(&mut buf).expect("read");
        if n == 0 {
            break;
        }
        out.extend_from_slice(&buf[..n]);
    }
    out
}
