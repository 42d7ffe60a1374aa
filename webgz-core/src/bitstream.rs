//! Bit-level I/O for DEFLATE streams.
//!
//! DEFLATE packs its codes starting at the least significant bit of each
//! byte. [`BitWriter`] produces that layout and [`BitReader`] consumes it.
//!
//! The reader takes one byte at a time from its source and only when it
//! needs more bits, so after the final deflate block the source is
//! positioned on the GZIP trailer.
//!
//! # Example
//!
//! ```
//! use webgz_core::bitstream::{BitReader, BitWriter};
//!
//! // BFINAL=1, BTYPE=01 (fixed Huffman), then the 7-bit end-of-block code.
//! let mut writer = BitWriter::new(Vec::new());
//! writer.write_bit(true).unwrap();
//! writer.write_bits(0b01, 2).unwrap();
//! writer.write_bits(0, 7).unwrap();
//! let block = writer.into_inner().unwrap();
//! assert_eq!(block, [0x03, 0x00]);
//!
//! let mut reader = BitReader::new(block.as_slice());
//! assert!(reader.read_bit().unwrap());
//! assert_eq!(reader.read_bits(2).unwrap(), 0b01);
//! ```

use crate::error::{Result, WebgzError};
use std::io::{self, Read, Write};

/// LSB-first bit reader over any `Read`.
#[derive(Debug)]
pub struct BitReader<R: Read> {
    source: R,
    /// Bits fetched but not yet returned; the next bit is bit 0.
    acc: u64,
    acc_len: u8,
    consumed: u64,
}

impl<R: Read> BitReader<R> {
    /// Wrap `source`.
    pub fn new(source: R) -> Self {
        Self {
            source,
            acc: 0,
            acc_len: 0,
            consumed: 0,
        }
    }

    /// Underlying source.
    pub fn get_ref(&self) -> &R {
        &self.source
    }

    /// Return the source, dropping the unread bits of the current byte.
    pub fn into_inner(self) -> R {
        self.source
    }

    /// Bits consumed so far.
    pub fn bit_position(&self) -> u64 {
        self.consumed
    }

    fn pull_byte(&mut self, wanted: u8) -> Result<()> {
        let mut byte = [0u8; 1];
        loop {
            match self.source.read(&mut byte) {
                Ok(0) => {
                    let short = (wanted - self.acc_len).div_ceil(8);
                    return Err(WebgzError::unexpected_eof(short as usize));
                }
                Ok(_) => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        self.acc |= u64::from(byte[0]) << self.acc_len;
        self.acc_len += 8;
        Ok(())
    }

    /// Read `count` (at most 32) bits; the first one read ends up in bit 0.
    #[inline]
    pub fn read_bits(&mut self, count: u8) -> Result<u32> {
        debug_assert!(count <= 32);
        while self.acc_len < count {
            self.pull_byte(count)?;
        }

        let value = (self.acc & ((1u64 << count) - 1)) as u32;
        self.acc >>= count;
        self.acc_len -= count;
        self.consumed += u64::from(count);
        Ok(value)
    }

    /// Read one bit.
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        self.read_bits(1).map(|b| b == 1)
    }

    /// Skip to the start of the next byte.
    pub fn align_to_byte(&mut self) {
        let skip = self.acc_len % 8;
        self.acc >>= skip;
        self.acc_len -= skip;
        self.consumed += u64::from(skip);
    }

    /// Fill `buf` with whole bytes, starting at the next byte boundary.
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        self.align_to_byte();

        // At most one byte is ever held back once aligned.
        let mut filled = 0;
        while self.acc_len >= 8 && filled < buf.len() {
            buf[filled] = self.acc as u8;
            self.acc >>= 8;
            self.acc_len -= 8;
            filled += 1;
        }

        self.source
            .read_exact(&mut buf[filled..])
            .map_err(|e| match e.kind() {
                io::ErrorKind::UnexpectedEof => WebgzError::unexpected_eof(buf.len() - filled),
                _ => WebgzError::Io(e),
            })?;

        self.consumed += 8 * buf.len() as u64;
        Ok(())
    }
}

/// LSB-first bit writer over any `Write`.
///
/// Whole bytes go to the sink as soon as they are complete. A partial byte
/// waits for more bits, [`align_to_byte`](BitWriter::align_to_byte) or
/// [`flush`](BitWriter::flush); it is lost if the writer is dropped.
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    sink: W,
    acc: u64,
    acc_len: u8,
    produced: u64,
}

impl<W: Write> BitWriter<W> {
    /// Wrap `sink`.
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            acc: 0,
            acc_len: 0,
            produced: 0,
        }
    }

    /// Underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Underlying sink. Completed bytes may be taken out of it.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    /// Pad, flush, and return the sink.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.sink)
    }

    /// Bits written so far, padding included.
    pub fn bits_written(&self) -> u64 {
        self.produced
    }

    /// Bits in the incomplete byte (0-7).
    pub fn pending_bits(&self) -> u8 {
        self.acc_len
    }

    /// Write the low `count` (at most 32) bits of `value`.
    #[inline]
    pub fn write_bits(&mut self, value: u32, count: u8) -> Result<()> {
        debug_assert!(count <= 32);
        if count == 0 {
            return Ok(());
        }

        let masked = u64::from(value) & ((1u64 << count) - 1);
        self.acc |= masked << self.acc_len;
        self.acc_len += count;
        self.produced += u64::from(count);

        if self.acc_len >= 8 {
            let whole = usize::from(self.acc_len / 8);
            let bytes = self.acc.to_le_bytes();
            self.sink.write_all(&bytes[..whole])?;
            // whole < 8 because acc_len < 40
            self.acc >>= 8 * whole;
            self.acc_len %= 8;
        }
        Ok(())
    }

    /// Write one bit.
    #[inline]
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.write_bits(u32::from(bit), 1)
    }

    /// Zero-pad to the next byte boundary.
    pub fn align_to_byte(&mut self) -> Result<()> {
        match self.acc_len {
            0 => Ok(()),
            n => self.write_bits(0, 8 - n),
        }
    }

    /// Zero-pad the partial byte and flush the sink.
    pub fn flush(&mut self) -> Result<()> {
        self.align_to_byte()?;
        self.sink.flush()?;
        Ok(())
    }

    /// Pad to a byte boundary, then write `buf` as is.
    pub fn write_bytes(&mut self, buf: &[u8]) -> Result<()> {
        self.align_to_byte()?;
        self.sink.write_all(buf)?;
        self.produced += 8 * buf.len() as u64;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_lsb_first_order() {
        let mut reader = BitReader::new(&[0b1011_0101u8][..]);
        let bits: Vec<u32> = (0..4).map(|_| reader.read_bits(1).unwrap()).collect();
        assert_eq!(bits, [1, 0, 1, 0]);
        assert_eq!(reader.read_bits(4).unwrap(), 0b1011);
    }

    #[test]
    fn test_value_spanning_bytes() {
        let mut reader = BitReader::new(&[0xF0u8, 0x0F][..]);
        assert_eq!(reader.read_bits(4).unwrap(), 0x0);
        assert_eq!(reader.read_bits(8).unwrap(), 0xFF);
        assert_eq!(reader.read_bits(4).unwrap(), 0x0);
        assert_eq!(reader.bit_position(), 16);
    }

    #[test]
    fn test_reader_leaves_trailer_untouched() {
        // Fixed block with only end-of-block, then two trailer bytes.
        let mut reader = BitReader::new(Cursor::new(vec![0x03, 0x00, 0xAA, 0xBB]));
        assert!(reader.read_bit().unwrap());
        assert_eq!(reader.read_bits(2).unwrap(), 1);
        assert_eq!(reader.read_bits(7).unwrap(), 0);
        assert_eq!(reader.into_inner().position(), 2);
    }

    #[test]
    fn test_reader_eof() {
        let mut reader = BitReader::new(&[0x80u8][..]);
        assert_eq!(reader.read_bits(7).unwrap(), 0);
        assert!(matches!(
            reader.read_bits(9),
            Err(WebgzError::UnexpectedEof { expected: 1 })
        ));
    }

    #[test]
    fn test_stored_block_header() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_bits(0b000, 3).unwrap();
        writer.write_bytes(&[0x05, 0x00, 0xFA, 0xFF]).unwrap();
        writer.write_bytes(b"hello").unwrap();
        let out = writer.into_inner().unwrap();
        assert_eq!(out, b"\x00\x05\x00\xFA\xFFhello");

        let mut reader = BitReader::new(out.as_slice());
        assert_eq!(reader.read_bits(3).unwrap(), 0);
        let mut len = [0u8; 4];
        reader.read_bytes(&mut len).unwrap();
        assert_eq!(len, [0x05, 0x00, 0xFA, 0xFF]);
        let mut body = [0u8; 5];
        reader.read_bytes(&mut body).unwrap();
        assert_eq!(&body, b"hello");
    }

    #[test]
    fn test_writer_packs_lsb_first() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_bits(0b101, 3).unwrap();
        writer.write_bits(0b11001, 5).unwrap();
        assert_eq!(writer.get_ref(), &[0xCD]);
        assert_eq!(writer.bits_written(), 8);
    }

    #[test]
    fn test_partial_byte_waits() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_bits(0xABC, 12).unwrap();
        assert_eq!(writer.get_ref(), &[0xBC]);
        assert_eq!(writer.pending_bits(), 4);

        let taken = std::mem::take(writer.get_mut());
        assert_eq!(taken, [0xBC]);

        writer.write_bits(0x1, 4).unwrap();
        assert_eq!(writer.pending_bits(), 0);
        assert_eq!(writer.into_inner().unwrap(), [0x1A]);
    }

    #[test]
    fn test_write_32_bits() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_bit(true).unwrap();
        writer.write_bits(0xDEAD_BEEF, 32).unwrap();
        let out = writer.into_inner().unwrap();

        let mut reader = BitReader::new(out.as_slice());
        assert!(reader.read_bit().unwrap());
        assert_eq!(reader.read_bits(32).unwrap(), 0xDEAD_BEEF);
    }

    #[test]
    fn test_align() {
        let mut reader = BitReader::new(&[0xFFu8, 0xAA][..]);
        reader.read_bits(3).unwrap();
        reader.align_to_byte();
        assert_eq!(reader.bit_position(), 8);
        assert_eq!(reader.read_bits(8).unwrap(), 0xAA);

        let mut writer = BitWriter::new(Vec::new());
        writer.write_bits(1, 1).unwrap();
        writer.align_to_byte().unwrap();
        writer.align_to_byte().unwrap();
        assert_eq!(writer.get_ref(), &[0x01]);
        assert_eq!(writer.bits_written(), 8);
    }
}
