//! # webgz GZIP
//!
//! GZIP (RFC 1952) container for the webgz deflate engine.
//!
//! The encoder is a write-only session tuned for small decoders:
//!
//! - the deflate window is chosen by the caller (`-10`, i.e. 1 KiB, by
//!   default) so the device can inflate with a matching buffer
//! - the header carries no timestamp and an "unknown" OS byte, so output
//!   is reproducible
//! - the original filename is embedded as Latin-1 when it can be
//!
//! [`GzipReader`] decodes a member back with the same window limit and
//! checks the trailer.
//!
//! ## Example
//!
//! ```rust
//! use webgz_gzip::{GzipEncoder, GzipOptions, decompress};
//!
//! let options = GzipOptions::default();
//! let mut encoder = GzipEncoder::new(Vec::new(), Some("index.html.gz"), options).unwrap();
//! encoder.write_str("<h1>hello</h1>\n").unwrap();
//! let gz = encoder.finish().unwrap();
//!
//! assert_eq!(&gz[10..21], b"index.html\0");
//! assert_eq!(decompress(&gz, options.window).unwrap(), b"<h1>hello</h1>\n");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod encoder;
pub mod header;
pub mod reader;

pub use encoder::{CHUNK_SIZE, GzipEncoder, GzipOptions, compress, gz_path, gzip_file};
pub use header::{
    CM_DEFLATE, FNAME, GZIP_MAGIC, GzipHeader, OS_UNKNOWN, XFL_FAST, XFL_MAX, encode_latin1,
};
pub use reader::{GzipReader, decompress};
