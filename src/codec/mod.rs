//! Single-stream decoders driven by the streaming decompression pipeline.
//!
//! Each decoder wraps a library stream object and exposes one incremental
//! step, [`StreamDecoder::decode`]. The pipeline in [`crate::pipeline`] owns
//! the loop, concatenated-stream handling and output accumulation, so the
//! decoders only translate library status codes.

pub mod bzip2;
pub mod xz;

use crate::{Error, Result};

/// Size of each output chunk handed to a decoder.
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Compressed inputs of at least this many bytes are decoded with the
/// multi-threaded xz decoder, when the `parallel` feature is enabled.
pub const MT_THRESHOLD: usize = 1024 * 1024;

/// Outcome of one decode step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStatus {
    /// More input or output space is needed to continue.
    Ok,
    /// The current logical stream is complete.
    StreamEnd,
}

/// Bytes moved by one decode step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeProgress {
    /// Input bytes consumed.
    pub consumed: usize,
    /// Output bytes written.
    pub produced: usize,
    /// Decoder state after the step.
    pub status: DecodeStatus,
}

/// An incremental decoder for one compressed stream.
///
/// Implementations are always handed all remaining input, so they may treat
/// the input as final.
pub trait StreamDecoder: Send {
    /// Decodes from `input` into `output`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] for any library status other than progress
    /// or end of stream.
    fn decode(&mut self, input: &[u8], output: &mut [u8]) -> Result<DecodeProgress>;
}

/// Compression formats with one logical entry per file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamCodec {
    /// bzip2.
    Bzip2,
    /// xz (LZMA2 in the .xz container).
    Xz,
}

impl StreamCodec {
    /// Returns the codec name used in errors and logs.
    pub fn name(&self) -> &'static str {
        match self {
            StreamCodec::Bzip2 => "bzip2",
            StreamCodec::Xz => "xz",
        }
    }

    /// Creates a decoder for a stream whose remaining compressed input is
    /// `input_len` bytes long.
    pub fn decoder(&self, input_len: usize) -> Result<Box<dyn StreamDecoder>> {
        Ok(match self {
            StreamCodec::Bzip2 => Box::new(bzip2::Bzip2StreamDecoder::new()),
            StreamCodec::Xz => Box::new(xz::XzStreamDecoder::for_input(input_len)?),
        })
    }

    /// Returns how many bytes of inter-stream padding start `input`.
    pub fn padding_len(&self, input: &[u8]) -> usize {
        match self {
            StreamCodec::Bzip2 => 0,
            StreamCodec::Xz => xz::stream_padding_len(input),
        }
    }

    /// Error for a stream that ends before the decoder is satisfied.
    pub fn truncated(&self) -> Error {
        match self {
            StreamCodec::Bzip2 => bzip2::truncated(),
            StreamCodec::Xz => xz::truncated(),
        }
    }
}

impl std::fmt::Display for StreamCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_names() {
        assert_eq!(StreamCodec::Bzip2.name(), "bzip2");
        assert_eq!(StreamCodec::Xz.to_string(), "xz");
    }

    #[test]
    fn test_truncated_is_corruption() {
        assert!(StreamCodec::Bzip2.truncated().is_corruption());
        assert!(StreamCodec::Xz.truncated().is_corruption());
    }

    #[test]
    fn test_padding_only_for_xz() {
        assert_eq!(StreamCodec::Bzip2.padding_len(&[0, 0, 0, 0]), 0);
        assert_eq!(StreamCodec::Xz.padding_len(&[0, 0, 0, 0, 1]), 4);
    }
}
