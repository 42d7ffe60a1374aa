//! # webgz Deflate
//!
//! Pure Rust DEFLATE (RFC 1951) with a configurable, small sliding window.
//!
//! Embedded HTTP servers often inflate responses with a decoder buffer of
//! only a few KiB. Every back-reference the [`Deflater`] emits is at most
//! `2^bits` bytes long, where `bits` comes from [`WindowBits`] (8 to 15),
//! and the [`Inflater`] can enforce the same bound when verifying.
//!
//! ## Features
//!
//! - **Compression**: streaming LZ77 + Huffman encoder
//!   - Levels 0-9 (0 writes stored blocks only)
//!   - Per block choice of stored, fixed, or dynamic Huffman coding
//!   - Sync, full, and finish flushes
//! - **Decompression**: all block types, with window enforcement
//!
//! ## Example
//!
//! ```rust
//! use webgz_core::{CompressionLevel, WindowBits};
//! use webgz_deflate::{deflate, inflate};
//!
//! let window = WindowBits::from_zlib(-10).unwrap();
//! let original = b"Hello, World! Hello, World!";
//! let compressed = deflate(original, CompressionLevel::BEST, window).unwrap();
//!
//! let decompressed = inflate(&compressed, window).unwrap();
//! assert_eq!(&decompressed, original);
//! ```
//!
//! [`WindowBits`]: webgz_core::WindowBits

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod deflate;
pub mod huffman;
pub mod inflate;
pub mod lz77;
pub mod tables;

// Re-exports
pub use deflate::{Deflater, deflate};
pub use huffman::{HuffmanBuilder, HuffmanCodes, HuffmanTree};
pub use inflate::{Inflater, inflate};
pub use lz77::{Lz77Encoder, Lz77Token};
