//! GZIP header writing and parsing.

use log::{debug, warn};
use std::io::{Read, Write};
use webgz_core::error::{Result, WebgzError};
use webgz_core::traits::CompressionLevel;

/// GZIP magic bytes.
pub const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// GZIP compression method: DEFLATE.
pub const CM_DEFLATE: u8 = 8;

/// Header CRC present.
pub const FHCRC: u8 = 0x02;

/// Extra field present.
pub const FEXTRA: u8 = 0x04;

/// Original filename present.
pub const FNAME: u8 = 0x08;

/// Comment present.
pub const FCOMMENT: u8 = 0x10;

/// Extra flags: maximum compression.
pub const XFL_MAX: u8 = 0x02;

/// Extra flags: fastest compression.
pub const XFL_FAST: u8 = 0x04;

/// Operating system: unknown.
pub const OS_UNKNOWN: u8 = 0xFF;

/// Length of the fixed part of the header.
pub const HEADER_LEN: usize = 10;

/// GZIP member header.
///
/// The encoder always writes a zero modification time and the "unknown"
/// OS byte; the only optional field it emits is the original filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GzipHeader {
    /// Flags.
    pub flags: u8,
    /// Modification time (always zero when written by webgz).
    pub mtime: u32,
    /// Extra flags.
    pub xfl: u8,
    /// Operating system.
    pub os: u8,
    /// Original filename as Latin-1 bytes, without the terminating NUL.
    pub filename: Option<Vec<u8>>,
}

impl GzipHeader {
    /// Header for a stream compressed at `level`, without a filename.
    pub fn new(level: CompressionLevel) -> Self {
        Self {
            flags: 0,
            mtime: 0,
            xfl: Self::xfl_for_level(level),
            os: OS_UNKNOWN,
            filename: None,
        }
    }

    /// Extra flags byte for a compression level.
    pub fn xfl_for_level(level: CompressionLevel) -> u8 {
        match level.value() {
            9 => XFL_MAX,
            1 => XFL_FAST,
            _ => 0,
        }
    }

    /// Embed `name` as the original filename.
    ///
    /// A name that cannot be written as Latin-1 is left out and the header
    /// is written without one.
    pub fn with_filename(mut self, name: &str) -> Self {
        match encode_latin1(name) {
            Ok(bytes) => {
                self.flags |= FNAME;
                self.filename = Some(bytes);
            }
            Err(e) => {
                warn!("{e}; writing the gzip header without a filename");
                self.flags &= !FNAME;
                self.filename = None;
            }
        }
        self
    }

    /// Filename decoded from Latin-1.
    pub fn filename_str(&self) -> Option<String> {
        self.filename
            .as_ref()
            .map(|bytes| bytes.iter().map(|&b| char::from(b)).collect())
    }

    /// Serialize the header.
    pub fn to_bytes(&self) -> Vec<u8> {
        let name_len = self.filename.as_ref().map_or(0, |n| n.len() + 1);
        let mut bytes = Vec::with_capacity(HEADER_LEN + name_len);

        bytes.extend_from_slice(&GZIP_MAGIC);
        bytes.push(CM_DEFLATE);
        bytes.push(self.flags);
        bytes.extend_from_slice(&self.mtime.to_le_bytes());
        bytes.push(self.xfl);
        bytes.push(self.os);

        if self.flags & FNAME != 0 {
            if let Some(name) = &self.filename {
                bytes.extend_from_slice(name);
                bytes.push(0);
            }
        }
        bytes
    }

    /// Write the header to a writer.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        debug!(
            "gzip header: xfl={:#04x}, filename={:?}",
            self.xfl,
            self.filename_str()
        );
        writer.write_all(&self.to_bytes())?;
        Ok(())
    }

    /// Read a GZIP header from a reader.
    ///
    /// Extra field, comment, and header CRC are skipped.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut buf = [0u8; HEADER_LEN];
        reader.read_exact(&mut buf)?;

        if buf[0..2] != GZIP_MAGIC {
            return Err(WebgzError::invalid_magic(
                GZIP_MAGIC.to_vec(),
                buf[0..2].to_vec(),
            ));
        }

        if buf[2] != CM_DEFLATE {
            return Err(WebgzError::unsupported_method(format!(
                "GZIP method {}",
                buf[2]
            )));
        }

        let flags = buf[3];
        if flags & 0xE0 != 0 {
            return Err(WebgzError::invalid_header(format!(
                "reserved flag bits set: {flags:#04x}"
            )));
        }
        let mtime = u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);

        if flags & FEXTRA != 0 {
            let mut xlen = [0u8; 2];
            reader.read_exact(&mut xlen)?;
            let mut extra = vec![0u8; u16::from_le_bytes(xlen) as usize];
            reader.read_exact(&mut extra)?;
        }

        let filename = if flags & FNAME != 0 {
            Some(read_null_terminated(reader)?)
        } else {
            None
        };

        if flags & FCOMMENT != 0 {
            read_null_terminated(reader)?;
        }

        if flags & FHCRC != 0 {
            let mut crc = [0u8; 2];
            reader.read_exact(&mut crc)?;
        }

        Ok(Self {
            flags,
            mtime,
            xfl: buf[8],
            os: buf[9],
            filename,
        })
    }
}

/// Encode a header filename as Latin-1.
///
/// Fails with [`WebgzError::EncodingFailure`] for characters above
/// U+00FF, for NUL (the field terminator), and for an empty name.
pub fn encode_latin1(name: &str) -> Result<Vec<u8>> {
    if name.is_empty() {
        return Err(WebgzError::encoding_failure("empty filename"));
    }

    name.chars()
        .map(|c| match u8::try_from(c) {
            Ok(0) => Err(WebgzError::encoding_failure(format!(
                "filename {name:?} contains NUL"
            ))),
            Ok(b) => Ok(b),
            Err(_) => Err(WebgzError::encoding_failure(format!(
                "filename {name:?} is not Latin-1 ({c:?})"
            ))),
        })
        .collect()
}

fn read_null_terminated<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let mut buf = [0u8; 1];

    loop {
        reader.read_exact(&mut buf)?;
        if buf[0] == 0 {
            return Ok(bytes);
        }
        bytes.push(buf[0]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xfl() {
        assert_eq!(GzipHeader::xfl_for_level(CompressionLevel::BEST), XFL_MAX);
        assert_eq!(GzipHeader::xfl_for_level(CompressionLevel::FAST), XFL_FAST);
        assert_eq!(GzipHeader::xfl_for_level(CompressionLevel::STORE), 0);
        assert_eq!(GzipHeader::xfl_for_level(CompressionLevel::new(6).unwrap()), 0);
    }

    #[test]
    fn test_header_bytes() {
        let header = GzipHeader::new(CompressionLevel::BEST);
        assert_eq!(
            header.to_bytes(),
            [0x1F, 0x8B, 0x08, 0x00, 0, 0, 0, 0, 0x02, 0xFF]
        );

        let header = GzipHeader::new(CompressionLevel::FAST).with_filename("app.js");
        let bytes = header.to_bytes();
        assert_eq!(bytes[3], FNAME);
        assert_eq!(bytes[8], XFL_FAST);
        assert_eq!(&bytes[HEADER_LEN..], b"app.js\0");
    }

    #[test]
    fn test_latin1() {
        assert_eq!(encode_latin1("café").unwrap(), b"caf\xE9");
        assert!(matches!(
            encode_latin1("日本.html"),
            Err(WebgzError::EncodingFailure { .. })
        ));
        assert!(encode_latin1("").is_err());
        assert!(encode_latin1("a\0b").is_err());
    }

    #[test]
    fn test_filename_fallback() {
        let header = GzipHeader::new(CompressionLevel::BEST).with_filename("€.css");
        assert_eq!(header.flags & FNAME, 0);
        assert_eq!(header.filename, None);
        assert_eq!(header.to_bytes().len(), HEADER_LEN);
    }

    #[test]
    fn test_read_roundtrip() {
        let header = GzipHeader::new(CompressionLevel::BEST).with_filename("straße.html");
        let bytes = header.to_bytes();
        let parsed = GzipHeader::read(&mut bytes.as_slice()).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(parsed.filename_str().as_deref(), Some("straße.html"));
    }

    #[test]
    fn test_read_rejects_bad_magic() {
        let bytes = [0x50, 0x4B, 0x08, 0, 0, 0, 0, 0, 0, 0xFF];
        assert!(matches!(
            GzipHeader::read(&mut bytes.as_slice()),
            Err(WebgzError::InvalidMagic { .. })
        ));

        let bytes = [0x1F, 0x8B, 0x07, 0, 0, 0, 0, 0, 0, 0xFF];
        assert!(matches!(
            GzipHeader::read(&mut bytes.as_slice()),
            Err(WebgzError::UnsupportedMethod { .. })
        ));

        let bytes = [0x1F, 0x8B, 0x08, 0x20, 0, 0, 0, 0, 0, 0xFF];
        assert!(matches!(
            GzipHeader::read(&mut bytes.as_slice()),
            Err(WebgzError::InvalidHeader { .. })
        ));
    }
}
