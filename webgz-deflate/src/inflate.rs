//! DEFLATE decompression (inflate).
//!
//! Decodes all three block types:
//! - Type 0: Stored (uncompressed)
//! - Type 1: Fixed Huffman codes
//! - Type 2: Dynamic Huffman codes
//!
//! An [`Inflater`] is configured with the window its producer promised to
//! respect. Any back-reference further than that is reported as
//! [`WebgzError::InvalidDistance`], which is how the pipeline proves its
//! output fits a device with a small decoder buffer.

use crate::huffman::HuffmanTree;
use crate::tables::{
    CODE_LENGTH_ORDER, DISTANCE_BASE, DISTANCE_EXTRA_BITS, END_OF_BLOCK, FIXED_DISTANCE_LENGTHS,
    FIXED_LITLEN_LENGTHS, LENGTH_BASE, LENGTH_EXTRA_BITS, NUM_DISTANCE_SYMBOLS,
    NUM_LITLEN_SYMBOLS,
};
use std::io::{Cursor, Read};
use std::sync::OnceLock;
use webgz_core::BitReader;
use webgz_core::error::{Result, WebgzError};
use webgz_core::traits::WindowBits;

/// DEFLATE decompressor.
#[derive(Debug, Clone)]
pub struct Inflater {
    window: WindowBits,
}

impl Inflater {
    /// Decoder accepting the full 32 KiB DEFLATE window.
    pub fn new() -> Self {
        Self {
            window: WindowBits::MAX,
        }
    }

    /// Decoder that rejects back-references beyond `window`.
    pub fn with_window(window: WindowBits) -> Self {
        Self { window }
    }

    /// Window this decoder enforces.
    pub fn window(&self) -> WindowBits {
        self.window
    }

    /// Decode one complete DEFLATE stream from `reader`.
    ///
    /// Returns the decoded bytes and the reader, positioned on the first
    /// byte after the one holding the final block's last bit.
    pub fn inflate_stream<R: Read>(&self, reader: R) -> Result<(Vec<u8>, R)> {
        let mut bits = BitReader::new(reader);
        let mut output = Vec::new();

        loop {
            let last = bits.read_bit()?;
            match bits.read_bits(2)? {
                0 => self.stored_block(&mut bits, &mut output)?,
                1 => {
                    let (litlen, dist) = fixed_trees();
                    self.codes_block(&mut bits, &mut output, litlen, dist)?;
                }
                2 => {
                    let (litlen, dist) = read_dynamic_trees(&mut bits)?;
                    self.codes_block(&mut bits, &mut output, &litlen, &dist)?;
                }
                _ => {
                    return Err(WebgzError::corrupted(
                        bits.bit_position() / 8,
                        "reserved block type 3",
                    ));
                }
            }
            if last {
                break;
            }
        }

        Ok((output, bits.into_inner()))
    }

    fn stored_block<R: Read>(&self, bits: &mut BitReader<R>, output: &mut Vec<u8>) -> Result<()> {
        let mut header = [0u8; 4];
        bits.read_bytes(&mut header)?;
        let len = u16::from_le_bytes([header[0], header[1]]);
        let nlen = u16::from_le_bytes([header[2], header[3]]);
        if len != !nlen {
            return Err(WebgzError::corrupted(
                bits.bit_position() / 8,
                format!("stored block length {len:#06x} does not match complement {nlen:#06x}"),
            ));
        }

        let start = output.len();
        output.resize(start + len as usize, 0);
        bits.read_bytes(&mut output[start..])
    }

    fn codes_block<R: Read>(
        &self,
        bits: &mut BitReader<R>,
        output: &mut Vec<u8>,
        litlen: &HuffmanTree,
        dist: &HuffmanTree,
    ) -> Result<()> {
        loop {
            let symbol = litlen.decode(bits)?;
            match symbol {
                0..=255 => output.push(symbol as u8),
                END_OF_BLOCK => return Ok(()),
                257..=285 => {
                    let index = (symbol - 257) as usize;
                    let length = LENGTH_BASE[index] as usize
                        + bits.read_bits(LENGTH_EXTRA_BITS[index])? as usize;

                    let dsym = dist.decode(bits)? as usize;
                    if dsym >= NUM_DISTANCE_SYMBOLS {
                        return Err(WebgzError::corrupted(
                            bits.bit_position() / 8,
                            format!("invalid distance symbol {dsym}"),
                        ));
                    }
                    let distance = DISTANCE_BASE[dsym] as usize
                        + bits.read_bits(DISTANCE_EXTRA_BITS[dsym])? as usize;

                    if distance > self.window.size() {
                        return Err(WebgzError::invalid_distance(distance, self.window.size()));
                    }
                    if distance > output.len() {
                        return Err(WebgzError::invalid_distance(distance, output.len()));
                    }

                    let from = output.len() - distance;
                    if distance >= length {
                        output.extend_from_within(from..from + length);
                    } else {
                        for i in 0..length {
                            let b = output[from + i];
                            output.push(b);
                        }
                    }
                }
                _ => {
                    return Err(WebgzError::corrupted(
                        bits.bit_position() / 8,
                        format!("invalid literal/length symbol {symbol}"),
                    ));
                }
            }
        }
    }
}

impl Default for Inflater {
    fn default() -> Self {
        Self::new()
    }
}

fn fixed_trees() -> &'static (HuffmanTree, HuffmanTree) {
    static TREES: OnceLock<(HuffmanTree, HuffmanTree)> = OnceLock::new();
    TREES.get_or_init(|| {
        (
            HuffmanTree::build(&FIXED_LITLEN_LENGTHS),
            HuffmanTree::build(&FIXED_DISTANCE_LENGTHS),
        )
    })
}

fn read_dynamic_trees<R: Read>(bits: &mut BitReader<R>) -> Result<(HuffmanTree, HuffmanTree)> {
    let hlit = bits.read_bits(5)? as usize + 257;
    let hdist = bits.read_bits(5)? as usize + 1;
    let hclen = bits.read_bits(4)? as usize + 4;

    if hlit > NUM_LITLEN_SYMBOLS || hdist > NUM_DISTANCE_SYMBOLS {
        return Err(WebgzError::corrupted(
            bits.bit_position() / 8,
            format!("too many codes: hlit={hlit} hdist={hdist}"),
        ));
    }

    let mut codelen_lengths = [0u8; 19];
    for &symbol in &CODE_LENGTH_ORDER[..hclen] {
        codelen_lengths[symbol] = bits.read_bits(3)? as u8;
    }
    let codelen = HuffmanTree::from_code_lengths(&codelen_lengths)?;

    let total = hlit + hdist;
    let mut lengths = Vec::with_capacity(total);
    while lengths.len() < total {
        let symbol = codelen.decode(bits)?;
        let (value, repeat) = match symbol {
            0..=15 => (symbol as u8, 1),
            16 => {
                let Some(&prev) = lengths.last() else {
                    return Err(WebgzError::corrupted(
                        bits.bit_position() / 8,
                        "repeat code with no previous length",
                    ));
                };
                (prev, 3 + bits.read_bits(2)? as usize)
            }
            17 => (0, 3 + bits.read_bits(3)? as usize),
            _ => (0, 11 + bits.read_bits(7)? as usize),
        };
        if lengths.len() + repeat > total {
            return Err(WebgzError::corrupted(
                bits.bit_position() / 8,
                "code length repeat overruns the table",
            ));
        }
        lengths.extend(std::iter::repeat_n(value, repeat));
    }

    if lengths[END_OF_BLOCK as usize] == 0 {
        return Err(WebgzError::corrupted(
            bits.bit_position() / 8,
            "no code for end-of-block",
        ));
    }

    let litlen = HuffmanTree::from_code_lengths(&lengths[..hlit])?;
    let dist = HuffmanTree::from_code_lengths(&lengths[hlit..])?;
    Ok((litlen, dist))
}

/// Decode a complete raw DEFLATE stream, enforcing `window`.
pub fn inflate(data: &[u8], window: WindowBits) -> Result<Vec<u8>> {
    let (output, _) = Inflater::with_window(window).inflate_stream(Cursor::new(data))?;
    Ok(output)
}
