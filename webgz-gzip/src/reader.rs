//! GZIP verification reader.
//!
//! Decodes one member with a window-checking inflater, the way the device
//! would, and checks the trailer.

use crate::header::GzipHeader;
use std::io::{self, Read};
use webgz_core::crc::Crc32;
use webgz_core::error::{Result, WebgzError};
use webgz_core::traits::WindowBits;
use webgz_deflate::Inflater;

/// GZIP reader that decompresses and verifies one member.
pub struct GzipReader<R: Read> {
    reader: R,
    header: GzipHeader,
    window: WindowBits,
}

impl<R: Read> GzipReader<R> {
    /// Parse the header. The full 32 KiB window is accepted.
    pub fn new(mut reader: R) -> Result<Self> {
        let header = GzipHeader::read(&mut reader)?;
        Ok(Self {
            reader,
            header,
            window: WindowBits::MAX,
        })
    }

    /// Reject back-references beyond `window`.
    pub fn with_window(mut self, window: WindowBits) -> Self {
        self.window = window;
        self
    }

    /// Get the header.
    pub fn header(&self) -> &GzipHeader {
        &self.header
    }

    /// Decompress the payload and check CRC-32 and size.
    pub fn decompress(self) -> Result<Vec<u8>> {
        let (data, mut rest) = Inflater::with_window(self.window).inflate_stream(self.reader)?;

        let mut trailer = [0u8; 8];
        rest.read_exact(&mut trailer).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => WebgzError::unexpected_eof(trailer.len()),
            _ => WebgzError::Io(e),
        })?;

        let expected_crc = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
        let expected_size = u32::from_le_bytes([trailer[4], trailer[5], trailer[6], trailer[7]]);

        let actual_crc = Crc32::compute(&data);
        if actual_crc != expected_crc {
            return Err(WebgzError::crc_mismatch(expected_crc, actual_crc));
        }

        let actual_size = data.len() as u32;
        if actual_size != expected_size {
            return Err(WebgzError::size_mismatch(expected_size, actual_size));
        }

        let mut extra = [0u8; 1];
        if rest.read(&mut extra)? != 0 {
            return Err(WebgzError::corrupted(
                0,
                "trailing data after the gzip member",
            ));
        }

        Ok(data)
    }
}

/// Decompress a single-member GZIP buffer, enforcing `window`.
pub fn decompress(data: &[u8], window: WindowBits) -> Result<Vec<u8>> {
    GzipReader::new(data)?.with_window(window).decompress()
}
