//! Magic-byte detection for containers and compression filters.

use std::io::Read;

use crate::{Error, Result};

/// Number of leading bytes examined for detection.
///
/// Covers the TAR header block, whose `ustar` magic sits at offset 257.
pub const HEAD_LEN: usize = 512;

/// Compression filter wrapped around a container or raw stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    /// No filter.
    None,
    /// gzip, possibly multi-member.
    Gzip,
    /// bzip2, possibly multi-stream.
    Bzip2,
    /// xz, possibly multi-stream.
    Xz,
    /// Zstandard.
    Zstd,
}

/// Multi-entry container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    /// ZIP archive.
    Zip,
    /// TAR archive (ustar or GNU).
    Tar,
}

const FILTER_SIGNATURES: &[(&[u8], Filter)] = &[
    // gzip: 0x1F 0x8B
    (&[0x1F, 0x8B], Filter::Gzip),
    // bzip2: 'B' 'Z' 'h'
    (&[0x42, 0x5A, 0x68], Filter::Bzip2),
    // XZ: 0xFD '7' 'z' 'X' 'Z' 0x00
    (&[0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00], Filter::Xz),
    // Zstd: 0x28 0xB5 0x2F 0xFD
    (&[0x28, 0xB5, 0x2F, 0xFD], Filter::Zstd),
];

const ZIP_SIGNATURES: &[&[u8]] = &[
    // local file header
    &[0x50, 0x4B, 0x03, 0x04],
    // end of central directory (empty archive)
    &[0x50, 0x4B, 0x05, 0x06],
    // spanned archive marker
    &[0x50, 0x4B, 0x07, 0x08],
];

const TAR_MAGIC_OFFSET: usize = 257;
const TAR_MAGIC: &[u8] = b"ustar";

impl Filter {
    /// Detects a filter from the leading bytes of a stream.
    pub fn detect(head: &[u8]) -> Filter {
        FILTER_SIGNATURES
            .iter()
            .find(|(signature, _)| head.starts_with(signature))
            .map(|(_, filter)| *filter)
            .unwrap_or(Filter::None)
    }

    /// Returns a short name for logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Filter::None => "none",
            Filter::Gzip => "gzip",
            Filter::Bzip2 => "bzip2",
            Filter::Xz => "xz",
            Filter::Zstd => "zstd",
        }
    }

    /// Wraps `reader` in a decoder for this filter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ContainerInit`] if the decoder cannot be created or
    /// the filter's codec was not compiled in.
    pub fn wrap<'a, R>(self, reader: R) -> Result<Box<dyn Read + Send + 'a>>
    where
        R: Read + Send + 'a,
    {
        Ok(match self {
            Filter::None => Box::new(reader),
            Filter::Gzip => Box::new(flate2::read::MultiGzDecoder::new(reader)),
            Filter::Bzip2 => Box::new(bzip2::read::MultiBzDecoder::new(reader)),
            Filter::Xz => Box::new(liblzma::read::XzDecoder::new_multi_decoder(reader)),
            #[cfg(feature = "zstd")]
            Filter::Zstd => Box::new(
                zstd::stream::read::Decoder::new(reader)
                    .map_err(|e| Error::container_init("filter zstd", e))?,
            ),
            #[cfg(not(feature = "zstd"))]
            Filter::Zstd => {
                return Err(Error::container_init(
                    "filter zstd",
                    "zstd support not compiled in (enable the `zstd` feature)",
                ));
            }
        })
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Container {
    /// Detects a multi-entry container from its leading bytes.
    pub fn detect(head: &[u8]) -> Option<Container> {
        if ZIP_SIGNATURES.iter().any(|sig| head.starts_with(sig)) {
            return Some(Container::Zip);
        }
        if head.get(TAR_MAGIC_OFFSET..TAR_MAGIC_OFFSET + TAR_MAGIC.len()) == Some(TAR_MAGIC) {
            return Some(Container::Tar);
        }
        None
    }

    /// Returns a short name for logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Container::Zip => "zip",
            Container::Tar => "tar",
        }
    }
}

/// Reads up to [`HEAD_LEN`] bytes, tolerating short reads.
pub fn read_head<R: Read + ?Sized>(reader: &mut R) -> Result<Vec<u8>> {
    let mut head = vec![0u8; HEAD_LEN];
    let mut filled = 0;
    while filled < HEAD_LEN {
        let n = reader.read(&mut head[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    head.truncate(filled);
    Ok(head)
}
