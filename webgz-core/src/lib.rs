//! # webgz Core
//!
//! Core components shared by the webgz crates.
//!
//! - [`bitstream`]: Bit-level I/O for DEFLATE's LSB-first codes
//! - [`crc`]: CRC-32 as used by the GZIP trailer
//! - [`traits`]: The streaming [`Compressor`] trait and the validated
//!   compression parameters ([`CompressionLevel`], [`WindowBits`])
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L4: Orchestration                                       │
//! │     asset pipeline, webgz / webgz-build binaries        │
//! ├─────────────────────────────────────────────────────────┤
//! │ L3: Container                                           │
//! │     GZIP header, streaming encoder session, verifier    │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codec                                               │
//! │     Deflate (LZ77+Huffman, bounded window), minifier    │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: BitStream (this crate)                              │
//! │     BitReader/BitWriter, CRC-32, parameters, errors     │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use webgz_core::crc::Crc32;
//! use webgz_core::traits::WindowBits;
//!
//! let crc = Crc32::compute(b"Hello, World!");
//! assert_eq!(crc, 0xEC4AC3D0);
//!
//! // zlib-style negative window parameter: 2^10 byte decoder buffer.
//! let window = WindowBits::from_zlib(-10).unwrap();
//! assert_eq!(window.size(), 1024);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod crc;
pub mod error;
pub mod traits;

// Re-exports for convenience
pub use bitstream::{BitReader, BitWriter};
pub use crc::Crc32;
pub use error::{Result, WebgzError};
pub use traits::{CompressionLevel, Compressor, FlushMode, WindowBits};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::{BitReader, BitWriter};
    pub use crate::crc::Crc32;
    pub use crate::error::{Result, WebgzError};
    pub use crate::traits::{CompressionLevel, Compressor, FlushMode, WindowBits};
}
