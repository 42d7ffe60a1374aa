//! Error types for webgz operations.
//!
//! A single error type covers configuration mistakes, missing assets,
//! stream lifecycle violations, and the validation failures raised while
//! decoding a GZIP container back for verification.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for webgz operations.
#[derive(Debug, Error)]
pub enum WebgzError {
    /// I/O error from underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A parameter or configuration value is out of its allowed range.
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// Description of the rejected value.
        message: String,
    },

    /// A configured source asset does not exist.
    #[error("Asset not found: {}", path.display())]
    MissingAsset {
        /// Path of the missing asset.
        path: PathBuf,
    },

    /// A value could not be represented in the required encoding.
    #[error("Encoding error: {message}")]
    EncodingFailure {
        /// Description of the encoding error.
        message: String,
    },

    /// A stream was used outside of its contract (closed, write-only, ...).
    #[error("Stream misuse: {message}")]
    StreamMisuse {
        /// Description of the violated contract.
        message: String,
    },

    /// Invalid magic number in a container header.
    #[error("Invalid magic number: expected {expected:02x?}, found {found:02x?}")]
    InvalidMagic {
        /// Expected magic bytes.
        expected: Vec<u8>,
        /// Actual magic bytes found.
        found: Vec<u8>,
    },

    /// Unsupported compression method.
    #[error("Unsupported compression method: {method}")]
    UnsupportedMethod {
        /// The compression method identifier.
        method: String,
    },

    /// CRC checksum mismatch.
    #[error("CRC mismatch: expected {expected:#x}, computed {computed:#x}")]
    CrcMismatch {
        /// Expected CRC value from the trailer.
        expected: u32,
        /// Computed CRC value from data.
        computed: u32,
    },

    /// Uncompressed size mismatch.
    #[error("Size mismatch: expected {expected} bytes (mod 2^32), got {actual}")]
    SizeMismatch {
        /// Size stored in the trailer.
        expected: u32,
        /// Size of the decoded data, mod 2^32.
        actual: u32,
    },

    /// Invalid Huffman code encountered during decompression.
    #[error("Invalid Huffman code at bit position {bit_position}")]
    InvalidHuffmanCode {
        /// Bit position where the invalid code was found.
        bit_position: u64,
    },

    /// Corrupted compressed data.
    #[error("Corrupted data at offset {offset}: {message}")]
    CorruptedData {
        /// Byte offset where corruption was detected.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// Invalid header format.
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// Unexpected end of input.
    #[error("Unexpected end of file: expected {expected} more bytes")]
    UnexpectedEof {
        /// Number of bytes that were expected but not available.
        expected: usize,
    },

    /// A back-reference reaches further back than the decoder window.
    #[error("Invalid back-reference distance: {distance} exceeds window of {window} bytes")]
    InvalidDistance {
        /// The offending distance.
        distance: usize,
        /// Window (or available history) size in bytes.
        window: usize,
    },
}

/// Result type alias for webgz operations.
pub type Result<T> = std::result::Result<T, WebgzError>;

impl WebgzError {
    /// Create an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Create a missing asset error.
    pub fn missing_asset(path: impl Into<PathBuf>) -> Self {
        Self::MissingAsset { path: path.into() }
    }

    /// Create an encoding error.
    pub fn encoding_failure(message: impl Into<String>) -> Self {
        Self::EncodingFailure {
            message: message.into(),
        }
    }

    /// Create a stream misuse error.
    pub fn stream_misuse(message: impl Into<String>) -> Self {
        Self::StreamMisuse {
            message: message.into(),
        }
    }

    /// Create an invalid magic error.
    pub fn invalid_magic(expected: impl Into<Vec<u8>>, found: impl Into<Vec<u8>>) -> Self {
        Self::InvalidMagic {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an unsupported method error.
    pub fn unsupported_method(method: impl Into<String>) -> Self {
        Self::UnsupportedMethod {
            method: method.into(),
        }
    }

    /// Create a CRC mismatch error.
    pub fn crc_mismatch(expected: u32, computed: u32) -> Self {
        Self::CrcMismatch { expected, computed }
    }

    /// Create a size mismatch error.
    pub fn size_mismatch(expected: u32, actual: u32) -> Self {
        Self::SizeMismatch { expected, actual }
    }

    /// Create an invalid Huffman code error.
    pub fn invalid_huffman(bit_position: u64) -> Self {
        Self::InvalidHuffmanCode { bit_position }
    }

    /// Create a corrupted data error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::CorruptedData {
            offset,
            message: message.into(),
        }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create an unexpected EOF error.
    pub fn unexpected_eof(expected: usize) -> Self {
        Self::UnexpectedEof { expected }
    }

    /// Create an invalid distance error.
    pub fn invalid_distance(distance: usize, window: usize) -> Self {
        Self::InvalidDistance { distance, window }
    }

    /// Whether this error wraps an I/O error of the given kind.
    pub fn is_io_kind(&self, kind: io::ErrorKind) -> bool {
        matches!(self, Self::Io(e) if e.kind() == kind)
    }
}

impl From<WebgzError> for io::Error {
    fn from(err: WebgzError) -> Self {
        match err {
            WebgzError::Io(e) => e,
            WebgzError::StreamMisuse { .. } => io::Error::new(io::ErrorKind::Unsupported, err),
            WebgzError::InvalidConfiguration { .. } => {
                io::Error::new(io::ErrorKind::InvalidInput, err)
            }
            WebgzError::MissingAsset { .. } => io::Error::new(io::ErrorKind::NotFound, err),
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
