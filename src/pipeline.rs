//! Streaming decompression of single-entry compressed files.
//!
//! The whole compressed source is read into memory, decoded chunk by chunk
//! into a growable buffer, and returned as one right-sized buffer. A decoder
//! that reports end of stream while input remains is at a concatenation
//! boundary: a fresh decoder picks up the rest as a new stream.

use crate::codec::{CHUNK_SIZE, DecodeStatus, StreamCodec};
use crate::vfs::FileHandle;
use crate::{Error, Result};

/// Reads all of `handle` into memory and rewinds it.
///
/// Reads repeat until the declared size is reached or a read returns zero
/// bytes, so sources that serve short reads are fully drained.
pub fn read_source_fully(handle: &mut dyn FileHandle) -> Result<Vec<u8>> {
    let size = handle.size()?;
    let len = usize::try_from(size).map_err(|_| too_large(size))?;
    let mut data = Vec::new();
    data.try_reserve_exact(len).map_err(|_| too_large(size))?;
    data.resize(len, 0);

    let mut total = 0;
    while total < len {
        let n = handle.read(&mut data[total..])?;
        if n == 0 {
            break;
        }
        total += n;
    }
    data.truncate(total);
    handle.reset()?;
    Ok(data)
}

/// Decodes every concatenated stream in `input`.
///
/// # Errors
///
/// Returns [`Error::Decode`] for any decoder error, or for input that ends
/// before the current stream does.
pub fn decode_all(codec: StreamCodec, input: &[u8]) -> Result<Box<[u8]>> {
    let mut output = Vec::with_capacity(input.len().saturating_mul(4));
    let mut chunk = vec![0u8; CHUNK_SIZE];
    let mut decoder = codec.decoder(input.len())?;
    let mut pos = 0;
    let mut streams = 1;

    loop {
        let progress = decoder.decode(&input[pos..], &mut chunk)?;
        pos += progress.consumed;
        output.extend_from_slice(&chunk[..progress.produced]);

        match progress.status {
            DecodeStatus::StreamEnd => {
                pos += codec.padding_len(&input[pos..]);
                if pos >= input.len() {
                    break;
                }
                log::debug!(
                    "{}: stream {} ended with {} bytes of input left, starting next stream",
                    codec,
                    streams,
                    input.len() - pos
                );
                decoder = codec.decoder(input.len() - pos)?;
                streams += 1;
            }
            DecodeStatus::Ok if progress.consumed == 0 && progress.produced == 0 => {
                return Err(if pos >= input.len() {
                    codec.truncated()
                } else {
                    Error::Decode {
                        codec: codec.name(),
                        code: -1,
                        reason: "decoder made no progress",
                    }
                });
            }
            DecodeStatus::Ok => {}
        }
    }

    log::debug!(
        "{}: decoded {} streams, {} -> {} bytes",
        codec,
        streams,
        input.len(),
        output.len()
    );
    Ok(output.into_boxed_slice())
}

fn too_large(size: u64) -> Error {
    Error::Io(std::io::Error::new(
        std::io::ErrorKind::OutOfMemory,
        format!("cannot buffer {} bytes of compressed input", size),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ArchiveConfig;
    use crate::vfs::{Context, FileSystem, MemoryFile, MemoryFileSystem, OpenFlags};
    use std::io::Write;

    fn bz2(data: &[u8]) -> Vec<u8> {
        let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::fast());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn xz(data: &[u8]) -> Vec<u8> {
        let mut encoder = liblzma::write::XzEncoder::new(Vec::new(), 1);
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_read_source_fully_with_short_reads() {
        let payload: Vec<u8> = (0..1000u32).map(|i| i as u8).collect();
        let fs =
            MemoryFileSystem::new().with_file("f", MemoryFile::new(payload.clone()).max_read(7));
        let config = ArchiveConfig::default();
        let ctx = Context::new(&fs, &config);
        let mut handle = fs.open_file("f", OpenFlags::READ, &ctx).unwrap();

        let data = read_source_fully(handle.as_mut()).unwrap();
        assert_eq!(data, payload);
        assert_eq!(handle.position(), 0);
    }

    #[test]
    fn test_concatenated_bzip2() {
        let mut input = bz2(b"hello ");
        input.extend(bz2(b"world"));
        let out = decode_all(StreamCodec::Bzip2, &input).unwrap();
        assert_eq!(&*out, b"hello world");
    }

    #[test]
    fn test_concatenated_xz_with_padding() {
        let mut input = xz(b"left|");
        input.extend_from_slice(&[0, 0, 0, 0]);
        input.extend(xz(b"right"));
        let out = decode_all(StreamCodec::Xz, &input).unwrap();
        assert_eq!(&*out, b"left|right");
    }

    #[test]
    fn test_output_spans_chunks() {
        let payload = vec![b'z'; CHUNK_SIZE * 2 + 123];
        let out = decode_all(StreamCodec::Bzip2, &bz2(&payload)).unwrap();
        assert_eq!(out.len(), payload.len());
        assert!(out.iter().all(|&b| b == b'z'));
    }

    #[test]
    fn test_truncated_input() {
        let input = xz(b"some data that will be cut short");
        let err = decode_all(StreamCodec::Xz, &input[..input.len() / 2]).unwrap_err();
        assert!(err.is_corruption());

        let input = bz2(b"some data that will be cut short");
        let err = decode_all(StreamCodec::Bzip2, &input[..input.len() - 4]).unwrap_err();
        assert!(err.is_corruption());
    }

    #[test]
    fn test_empty_input_is_truncated() {
        let err = decode_all(StreamCodec::Bzip2, &[]).unwrap_err();
        assert!(matches!(err, Error::Decode { code: -7, .. }));
    }

    #[test]
    fn test_garbage_after_stream() {
        let mut input = bz2(b"ok");
        input.extend_from_slice(b"trailing garbage");
        let err = decode_all(StreamCodec::Bzip2, &input).unwrap_err();
        assert!(matches!(err, Error::Decode { codec: "bzip2", .. }));
    }
}
