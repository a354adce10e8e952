//! bzip2 stream decoder.

use bzip2::{Decompress, Status};

use super::{DecodeProgress, DecodeStatus, StreamDecoder};
use crate::{Error, Result};

const CODEC: &str = "bzip2";

/// One bzip2 stream. A concatenated file needs a fresh decoder per stream.
pub struct Bzip2StreamDecoder {
    inner: Decompress,
}

impl std::fmt::Debug for Bzip2StreamDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bzip2StreamDecoder")
            .field("total_in", &self.inner.total_in())
            .field("total_out", &self.inner.total_out())
            .finish()
    }
}

impl Bzip2StreamDecoder {
    /// Creates a decoder using the fast (not small-memory) algorithm.
    pub fn new() -> Self {
        Self {
            inner: Decompress::new(false),
        }
    }
}

impl Default for Bzip2StreamDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamDecoder for Bzip2StreamDecoder {
    fn decode(&mut self, input: &[u8], output: &mut [u8]) -> Result<DecodeProgress> {
        let in_before = self.inner.total_in();
        let out_before = self.inner.total_out();
        let status = self.inner.decompress(input, output).map_err(decode_error)?;
        Ok(DecodeProgress {
            consumed: (self.inner.total_in() - in_before) as usize,
            produced: (self.inner.total_out() - out_before) as usize,
            status: match status {
                Status::StreamEnd => DecodeStatus::StreamEnd,
                _ => DecodeStatus::Ok,
            },
        })
    }
}

// Numeric codes follow libbzip2's BZ_* return values.
#[allow(unreachable_patterns)]
fn decode_error(err: bzip2::Error) -> Error {
    let (code, reason) = match err {
        bzip2::Error::Sequence => (-1, "decoder called out of sequence"),
        bzip2::Error::Param => (-2, "invalid decoder parameters"),
        bzip2::Error::Data => (-4, "compressed data is corrupt"),
        bzip2::Error::DataMagic => (-5, "the input is not in the bzip2 format"),
        _ => (-9, "unknown error"),
    };
    Error::Decode {
        codec: CODEC,
        code,
        reason,
    }
}

pub(super) fn truncated() -> Error {
    Error::Decode {
        codec: CODEC,
        code: -7,
        reason: "compressed data is truncated",
    }
}
