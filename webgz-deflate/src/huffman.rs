//! Canonical Huffman coding for DEFLATE.
//!
//! DEFLATE only ever transmits code *lengths*; both sides derive the same
//! canonical codes from them (RFC 1951 Section 3.2.2). This module has the
//! three pieces built on that:
//!
//! - [`HuffmanBuilder`]: symbol frequencies to length-limited code lengths
//! - [`HuffmanCodes`]: code lengths to bit-reversed codes for the encoder
//! - [`HuffmanTree`]: code lengths to a canonical decoder
//!
//! # Alphabets
//!
//! - **Literal/Length**: 0-285 (0-255 literals, 256 EOB, 257-285 lengths)
//! - **Distance**: 0-29 (back-reference distances)
//! - **Code Length**: 0-18 (for encoding dynamic Huffman trees)

use crate::tables::MAX_CODE_BITS;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::io::{Read, Write};
use webgz_core::error::{Result, WebgzError};
use webgz_core::{BitReader, BitWriter};

/// Builds length-limited Huffman code lengths from symbol frequencies.
#[derive(Debug, Clone)]
pub struct HuffmanBuilder {
    frequencies: Vec<u32>,
    max_length: u8,
}

impl HuffmanBuilder {
    /// Create a builder for an alphabet of `alphabet_size` symbols whose
    /// codes may not exceed `max_length` bits.
    pub fn new(alphabet_size: usize, max_length: u8) -> Self {
        Self {
            frequencies: vec![0; alphabet_size],
            max_length,
        }
    }

    /// Count one occurrence of `symbol`.
    pub fn add(&mut self, symbol: u16) {
        self.frequencies[symbol as usize] += 1;
    }

    /// Count `count` occurrences of `symbol`.
    pub fn add_count(&mut self, symbol: u16, count: u32) {
        self.frequencies[symbol as usize] += count;
    }

    /// Frequency recorded for `symbol`.
    pub fn frequency(&self, symbol: u16) -> u32 {
        self.frequencies[symbol as usize]
    }

    /// Make sure at least `min_symbols` symbols get a code, adding unit
    /// frequencies to the lowest unused symbols.
    ///
    /// Some decoders reject trees with a single code, so dynamic blocks
    /// always carry at least two codes per tree.
    pub fn ensure_used(&mut self, min_symbols: usize) {
        let mut used = self.frequencies.iter().filter(|&&f| f > 0).count();
        for freq in self.frequencies.iter_mut() {
            if used >= min_symbols {
                break;
            }
            if *freq == 0 {
                *freq = 1;
                used += 1;
            }
        }
    }

    /// Compute code lengths for every symbol (0 for unused ones).
    ///
    /// Builds an optimal Huffman tree; when it is deeper than the length
    /// limit, the frequencies are halved (rounding up, so no used symbol
    /// drops out) and the tree is rebuilt. Halving flattens the
    /// distribution until the tree fits, and the result is always a
    /// complete prefix code.
    pub fn build_lengths(&self) -> Vec<u8> {
        let mut lengths = vec![0u8; self.frequencies.len()];
        let used: Vec<usize> = (0..self.frequencies.len())
            .filter(|&s| self.frequencies[s] > 0)
            .collect();

        match used.len() {
            0 => return lengths,
            1 => {
                lengths[used[0]] = 1;
                return lengths;
            }
            _ => {}
        }

        let mut weights: Vec<u64> = used
            .iter()
            .map(|&s| self.frequencies[s] as u64)
            .collect();

        loop {
            let depths = tree_depths(&weights);
            if depths.iter().all(|&d| d <= self.max_length as usize) {
                for (&symbol, &depth) in used.iter().zip(&depths) {
                    lengths[symbol] = depth as u8;
                }
                return lengths;
            }
            for w in weights.iter_mut() {
                *w = (*w + 1) / 2;
            }
        }
    }
}

/// Leaf depths of a Huffman tree over `weights` (at least two leaves).
fn tree_depths(weights: &[u64]) -> Vec<usize> {
    let leaves = weights.len();
    let mut parent = vec![usize::MAX; 2 * leaves - 1];
    let mut heap: BinaryHeap<Reverse<(u64, usize)>> = weights
        .iter()
        .enumerate()
        .map(|(i, &w)| Reverse((w, i)))
        .collect();

    let mut next = leaves;
    while heap.len() > 1 {
        let Some(Reverse((w1, a))) = heap.pop() else {
            break;
        };
        let Some(Reverse((w2, b))) = heap.pop() else {
            break;
        };
        parent[a] = next;
        parent[b] = next;
        heap.push(Reverse((w1 + w2, next)));
        next += 1;
    }

    // Parents are always created after their children, so walking down
    // from the root sees every parent's depth before its children's.
    let mut depth = vec![0usize; next];
    for node in (0..next - 1).rev() {
        depth[node] = depth[parent[node]] + 1;
    }
    depth.truncate(leaves);
    depth
}

/// Reverse the low `length` bits of `code`.
#[inline]
pub fn reverse_bits(code: u16, length: u8) -> u16 {
    if length == 0 {
        return 0;
    }
    code.reverse_bits() >> (16 - length as u32)
}

/// Canonical codes ready for LSB-first emission.
#[derive(Debug, Clone)]
pub struct HuffmanCodes {
    codes: Vec<u16>,
    lengths: Vec<u8>,
}

impl HuffmanCodes {
    /// Assign canonical codes to `lengths` (RFC 1951 Section 3.2.2).
    pub fn from_lengths(lengths: &[u8]) -> Self {
        let mut bl_count = [0u16; MAX_CODE_BITS as usize + 1];
        for &len in lengths {
            bl_count[len as usize] += 1;
        }
        bl_count[0] = 0;

        let mut next_code = [0u16; MAX_CODE_BITS as usize + 1];
        let mut code = 0u16;
        for bits in 1..=MAX_CODE_BITS as usize {
            code = (code + bl_count[bits - 1]) << 1;
            next_code[bits] = code;
        }

        let codes = lengths
            .iter()
            .map(|&len| {
                if len == 0 {
                    return 0;
                }
                let c = next_code[len as usize];
                next_code[len as usize] += 1;
                reverse_bits(c, len)
            })
            .collect();

        Self {
            codes,
            lengths: lengths.to_vec(),
        }
    }

    /// Code length of `symbol` in bits.
    #[inline]
    pub fn length(&self, symbol: u16) -> u8 {
        self.lengths[symbol as usize]
    }

    /// All code lengths, indexed by symbol.
    pub fn lengths(&self) -> &[u8] {
        &self.lengths
    }

    /// Write the code for `symbol`.
    #[inline]
    pub fn write<W: Write>(&self, writer: &mut BitWriter<W>, symbol: u16) -> Result<()> {
        let len = self.lengths[symbol as usize];
        debug_assert!(len > 0, "symbol {symbol} has no code");
        writer.write_bits(self.codes[symbol as usize] as u32, len)
    }
}

/// Canonical Huffman decoder.
///
/// Decodes one bit at a time against per-length code counts, which needs no
/// lookup table and handles incomplete codes gracefully.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    /// Number of codes of each length.
    counts: [u16; MAX_CODE_BITS as usize + 1],
    /// Symbols ordered by code (length first, then symbol value).
    symbols: Vec<u16>,
}

impl HuffmanTree {
    /// Build a decoder from code lengths.
    ///
    /// Over-subscribed length sets are rejected. Incomplete sets are
    /// accepted; their unused codes fail when decoded.
    pub fn from_code_lengths(code_lengths: &[u8]) -> Result<Self> {
        let tree = Self::build(code_lengths);

        let mut left: i32 = 1;
        for len in 1..=MAX_CODE_BITS as usize {
            left <<= 1;
            left -= tree.counts[len] as i32;
            if left < 0 {
                return Err(WebgzError::corrupted(
                    0,
                    "over-subscribed Huffman code lengths",
                ));
            }
        }

        Ok(tree)
    }

    /// Build without validation, for the fixed tables.
    pub(crate) fn build(code_lengths: &[u8]) -> Self {
        let mut counts = [0u16; MAX_CODE_BITS as usize + 1];
        for &len in code_lengths {
            counts[len as usize] += 1;
        }
        counts[0] = 0;

        let mut offsets = [0u16; MAX_CODE_BITS as usize + 2];
        for len in 1..=MAX_CODE_BITS as usize {
            offsets[len + 1] = offsets[len] + counts[len];
        }

        let total = offsets[MAX_CODE_BITS as usize + 1] as usize;
        let mut symbols = vec![0u16; total];
        for (symbol, &len) in code_lengths.iter().enumerate() {
            if len != 0 {
                symbols[offsets[len as usize] as usize] = symbol as u16;
                offsets[len as usize] += 1;
            }
        }

        Self { counts, symbols }
    }

    /// Decode one symbol.
    pub fn decode<R: Read>(&self, reader: &mut BitReader<R>) -> Result<u16> {
        let start = reader.bit_position();
        let mut code: i32 = 0;
        let mut first: i32 = 0;
        let mut index: i32 = 0;

        for len in 1..=MAX_CODE_BITS as usize {
            code |= reader.read_bit()? as i32;
            let count = self.counts[len] as i32;
            if code - first < count {
                return Ok(self.symbols[(index + code - first) as usize]);
            }
            index += count;
            first += count;
            first <<= 1;
            code <<= 1;
        }

        Err(WebgzError::invalid_huffman(start))
    }
}
