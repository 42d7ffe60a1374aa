//! Streaming compressor trait and validated compression parameters.
//!
//! [`CompressionLevel`] and [`WindowBits`] can only hold values inside their
//! legal ranges, so anything that accepts them never has to re-check.

use crate::error::{Result, WebgzError};
use std::fmt;

/// Flush mode for compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushMode {
    /// No flush - buffer data for best compression.
    #[default]
    None,
    /// Sync flush - emit all pending output and byte-align with an empty
    /// stored block.
    Sync,
    /// Full flush - sync flush, then forget the match history.
    Full,
    /// Finish - complete the stream with a final block.
    Finish,
}

/// A streaming compressor (encoder).
///
/// Output is appended to the caller's buffer; nothing is ever truncated.
pub trait Compressor {
    /// Compress `input`, appending any produced bytes to `output`.
    ///
    /// After a call with [`FlushMode::Finish`] the compressor is finished
    /// and further calls fail with a stream misuse error until [`reset`].
    ///
    /// [`reset`]: Compressor::reset
    fn compress(&mut self, input: &[u8], output: &mut Vec<u8>, flush: FlushMode) -> Result<()>;

    /// Reset the compressor to its initial state.
    fn reset(&mut self);

    /// Check if the compressor has finished.
    fn is_finished(&self) -> bool;

    /// Compress all data at once (convenience method).
    fn compress_all(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::with_capacity(input.len() / 2 + 16);
        self.compress(input, &mut output, FlushMode::Finish)?;
        Ok(output)
    }
}

/// Compression effort, 0 (stored only) to 9 (best).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompressionLevel(u8);

impl CompressionLevel {
    /// No compression: stored blocks only.
    pub const STORE: Self = Self(0);
    /// Fastest compressing level.
    pub const FAST: Self = Self(1);
    /// Best compression.
    pub const BEST: Self = Self(9);

    /// Validate a level.
    pub fn new(level: u8) -> Result<Self> {
        if level > 9 {
            return Err(WebgzError::invalid_configuration(format!(
                "compression level {level} is out of range 0..=9"
            )));
        }
        Ok(Self(level))
    }

    /// Validate a level given as a wider integer (command line, JSON).
    pub fn from_i64(level: i64) -> Result<Self> {
        u8::try_from(level)
            .map_err(|_| {
                WebgzError::invalid_configuration(format!(
                    "compression level {level} is out of range 0..=9"
                ))
            })
            .and_then(Self::new)
    }

    /// The numeric level.
    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self::BEST
    }
}

impl fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Base-2 logarithm of the LZ77 window, 8 to 15.
///
/// The decoder on the device allocates `2^bits` bytes of history, so the
/// encoder must never emit a back-reference further than that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowBits(u8);

impl WindowBits {
    /// Smallest supported window (256 bytes).
    pub const MIN: Self = Self(8);
    /// Largest supported window (32 KiB).
    pub const MAX: Self = Self(15);

    /// Validate a window size given as its base-2 logarithm.
    pub fn new(bits: u8) -> Result<Self> {
        if !(8..=15).contains(&bits) {
            return Err(WebgzError::invalid_configuration(format!(
                "window bits {bits} is out of range 8..=15"
            )));
        }
        Ok(Self(bits))
    }

    /// Validate a zlib-style raw-deflate window parameter, -15 to -8.
    pub fn from_zlib(window: i32) -> Result<Self> {
        if !(-15..=-8).contains(&window) {
            return Err(WebgzError::invalid_configuration(format!(
                "window size {window} is out of range -15..=-8"
            )));
        }
        Ok(Self((-window) as u8))
    }

    /// The base-2 logarithm of the window.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// The zlib-style negative parameter this window corresponds to.
    pub fn zlib(self) -> i32 {
        -(self.0 as i32)
    }

    /// Window size in bytes.
    pub fn size(self) -> usize {
        1 << self.0
    }
}

impl Default for WindowBits {
    fn default() -> Self {
        Self(10)
    }
}

impl fmt::Display for WindowBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.zlib())
    }
}
