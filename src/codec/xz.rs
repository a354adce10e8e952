//! xz stream decoder with a size-based threading policy.

use liblzma::stream::{Action, Status, Stream};

use super::{DecodeProgress, DecodeStatus, MT_THRESHOLD, StreamDecoder};
use crate::{Error, Result};

const CODEC: &str = "xz";

/// Physical memory assumed when it cannot be detected.
const FALLBACK_PHYSICAL_MEMORY: u64 = 4 * 1024 * 1024 * 1024;

/// Threading limits for the multi-threaded decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadPolicy {
    /// Worker threads (at least 1).
    pub threads: u32,
    /// Memory ceiling above which the decoder falls back to one thread.
    pub memlimit_threading: u64,
    /// Memory ceiling above which decoding fails.
    pub memlimit_stop: u64,
}

impl ThreadPolicy {
    /// Uses every hardware thread and a quarter of physical memory for
    /// threading, with no hard stop.
    pub fn detect() -> Self {
        let threads = std::thread::available_parallelism()
            .map(|n| n.get() as u32)
            .unwrap_or(1)
            .max(1);
        Self {
            threads,
            memlimit_threading: physical_memory() / 4,
            memlimit_stop: u64::MAX,
        }
    }
}

#[cfg(feature = "sysinfo")]
fn physical_memory() -> u64 {
    use sysinfo::System;

    let mut sys = System::new();
    sys.refresh_memory();
    match sys.total_memory() {
        0 => FALLBACK_PHYSICAL_MEMORY,
        total => total,
    }
}

#[cfg(not(feature = "sysinfo"))]
fn physical_memory() -> u64 {
    FALLBACK_PHYSICAL_MEMORY
}

/// One xz stream. A concatenated file needs a fresh decoder per stream.
pub struct XzStreamDecoder {
    stream: Stream,
    multithreaded: bool,
}

impl std::fmt::Debug for XzStreamDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XzStreamDecoder")
            .field("multithreaded", &self.multithreaded)
            .field("total_in", &self.stream.total_in())
            .field("total_out", &self.stream.total_out())
            .finish()
    }
}

impl XzStreamDecoder {
    /// Creates a single-threaded decoder with no memory limit.
    pub fn single_threaded() -> Result<Self> {
        let stream = Stream::new_stream_decoder(u64::MAX, 0).map_err(init_error)?;
        Ok(Self {
            stream,
            multithreaded: false,
        })
    }

    /// Creates a multi-threaded decoder.
    #[cfg(feature = "parallel")]
    pub fn multi_threaded(policy: &ThreadPolicy) -> Result<Self> {
        let stream = liblzma::stream::MtStreamBuilder::new()
            .threads(policy.threads)
            .memlimit_threading(policy.memlimit_threading)
            .memlimit_stop(policy.memlimit_stop)
            .decoder()
            .map_err(init_error)?;
        Ok(Self {
            stream,
            multithreaded: true,
        })
    }

    /// Picks single- or multi-threaded decoding by compressed size.
    pub fn for_input(input_len: usize) -> Result<Self> {
        #[cfg(feature = "parallel")]
        if input_len >= MT_THRESHOLD {
            let policy = ThreadPolicy::detect();
            log::debug!(
                "xz: {} compressed bytes, multi-threaded decoder with {} threads (threading memlimit {} bytes)",
                input_len,
                policy.threads,
                policy.memlimit_threading
            );
            return Self::multi_threaded(&policy);
        }
        log::debug!(
            "xz: {} compressed bytes, single-threaded decoder (threshold {})",
            input_len,
            MT_THRESHOLD
        );
        Self::single_threaded()
    }

    /// Returns true if this decoder runs worker threads.
    pub fn is_multithreaded(&self) -> bool {
        self.multithreaded
    }
}

impl StreamDecoder for XzStreamDecoder {
    fn decode(&mut self, input: &[u8], output: &mut [u8]) -> Result<DecodeProgress> {
        let in_before = self.stream.total_in();
        let out_before = self.stream.total_out();
        let status = self
            .stream
            .process(input, output, Action::Finish)
            .map_err(decode_error)?;
        Ok(DecodeProgress {
            consumed: (self.stream.total_in() - in_before) as usize,
            produced: (self.stream.total_out() - out_before) as usize,
            status: match status {
                Status::StreamEnd => DecodeStatus::StreamEnd,
                // MemNeeded is LZMA_BUF_ERROR: no progress possible. The
                // pipeline reports it as truncation once input runs out.
                _ => DecodeStatus::Ok,
            },
        })
    }
}

/// Length of the stream padding (zero bytes in groups of four) at the start
/// of `input`.
pub fn stream_padding_len(input: &[u8]) -> usize {
    let zeros = input.iter().take_while(|&&b| b == 0).count();
    zeros - zeros % 4
}

// Numeric codes follow liblzma's lzma_ret values.
#[allow(unreachable_patterns)]
fn classify(err: &liblzma::stream::Error) -> (i32, &'static str) {
    use liblzma::stream::Error as E;
    match err {
        E::NoCheck => (2, "input stream has no integrity check"),
        E::UnsupportedCheck => (3, "cannot calculate the integrity check"),
        E::Mem => (5, "memory allocation failed"),
        E::MemLimit => (6, "memory usage limit was reached"),
        E::Format => (7, "the input is not in the .xz format"),
        E::Options => (8, "unsupported compression options"),
        E::Data => (9, "compressed data is corrupt"),
        E::Program => (11, "programming error in the decoder"),
        _ => (-1, "unknown error"),
    }
}

fn decode_error(err: liblzma::stream::Error) -> Error {
    let (code, reason) = classify(&err);
    Error::Decode {
        codec: CODEC,
        code,
        reason,
    }
}

fn init_error(err: liblzma::stream::Error) -> Error {
    let (code, reason) = classify(&err);
    Error::container_init("xz decoder", format!("{} (error {})", reason, code))
}

pub(super) fn truncated() -> Error {
    Error::Decode {
        codec: CODEC,
        code: 10,
        reason: "compressed data is truncated or corrupt",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn compress(data: &[u8]) -> Vec<u8> {
        let mut encoder = liblzma::write::XzEncoder::new(Vec::new(), 1);
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_policy_detect() {
        let policy = ThreadPolicy::detect();
        assert!(policy.threads >= 1);
        assert!(policy.memlimit_threading > 0);
        assert_eq!(policy.memlimit_stop, u64::MAX);
    }

    #[test]
    fn test_small_input_is_single_threaded() {
        let decoder = XzStreamDecoder::for_input(100).unwrap();
        assert!(!decoder.is_multithreaded());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_large_input_is_multi_threaded() {
        let decoder = XzStreamDecoder::for_input(MT_THRESHOLD).unwrap();
        assert!(decoder.is_multithreaded());
    }

    #[test]
    fn test_single_stream() {
        let compressed = compress(b"xz payload");
        let mut decoder = XzStreamDecoder::single_threaded().unwrap();
        let mut out = vec![0u8; 64];
        let progress = decoder.decode(&compressed, &mut out).unwrap();
        assert_eq!(progress.status, DecodeStatus::StreamEnd);
        assert_eq!(progress.consumed, compressed.len());
        assert_eq!(&out[..progress.produced], b"xz payload");
    }

    #[test]
    fn test_not_xz() {
        let mut decoder = XzStreamDecoder::single_threaded().unwrap();
        let mut out = vec![0u8; 64];
        let err = decoder.decode(b"plain text, not xz at all", &mut out).unwrap_err();
        match err {
            Error::Decode { codec, code, .. } => {
                assert_eq!(codec, "xz");
                assert_eq!(code, 7);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_stream_padding_len() {
        assert_eq!(stream_padding_len(&[]), 0);
        assert_eq!(stream_padding_len(&[0, 0, 0]), 0);
        assert_eq!(stream_padding_len(&[0, 0, 0, 0, 0xFD]), 4);
        assert_eq!(stream_padding_len(&[0; 9]), 8);
    }
}
