//! Streaming DEFLATE compression.
//!
//! The [`Deflater`] turns input into LZ77 tokens as it arrives and emits a
//! block whenever 64 KiB of input has been tokenized, or when the caller
//! flushes. Each block is written in whichever of the three encodings is
//! smallest for it:
//! - Stored blocks (no compression)
//! - Fixed Huffman codes
//! - Dynamic Huffman codes
//!
//! Level 0 always writes stored blocks.

use crate::huffman::{HuffmanBuilder, HuffmanCodes};
use crate::lz77::{Lz77Encoder, Lz77Token};
use crate::tables::{
    CODE_LENGTH_ORDER, DISTANCE_EXTRA_BITS, END_OF_BLOCK, FIXED_DISTANCE_LENGTHS,
    FIXED_LITLEN_LENGTHS, LENGTH_EXTRA_BITS, MAX_CODE_BITS, MAX_CODELEN_BITS,
    NUM_CODELEN_SYMBOLS, NUM_DISTANCE_SYMBOLS, NUM_LITLEN_SYMBOLS, distance_code, length_code,
};
use std::io::Write;
use std::sync::OnceLock;
use webgz_core::BitWriter;
use webgz_core::error::{Result, WebgzError};
use webgz_core::traits::{CompressionLevel, Compressor, FlushMode, WindowBits};

/// Tokenized input that triggers a block.
const BLOCK_INPUT_LIMIT: usize = 64 * 1024;

/// Largest payload of a single stored block.
const MAX_STORED_BLOCK: usize = 65535;

/// Input is handed to the match finder in pieces of this size so blocks
/// stay close to [`BLOCK_INPUT_LIMIT`].
const FEED_STEP: usize = 16 * 1024;

/// DEFLATE compressor.
#[derive(Debug)]
pub struct Deflater {
    /// LZ77 encoder.
    lz77: Lz77Encoder,
    /// Compression level.
    level: CompressionLevel,
    /// Window the match finder is limited to.
    window: WindowBits,
    /// Bit sink; completed bytes are handed out after every call.
    bits: BitWriter<Vec<u8>>,
    /// Tokens of the block being collected.
    tokens: Vec<Lz77Token>,
    /// Input not yet written out in a block.
    raw: Vec<u8>,
    /// Length of the prefix of `raw` that `tokens` describe.
    covered: usize,
    /// Whether compression is finished.
    finished: bool,
}

impl Deflater {
    /// Create a compressor for the given level and window.
    pub fn new(level: CompressionLevel, window: WindowBits) -> Self {
        Self {
            lz77: Lz77Encoder::new(level, window),
            level,
            window,
            bits: BitWriter::new(Vec::new()),
            tokens: Vec::new(),
            raw: Vec::new(),
            covered: 0,
            finished: false,
        }
    }

    /// Compression level.
    pub fn level(&self) -> CompressionLevel {
        self.level
    }

    /// Window the encoder is limited to.
    pub fn window(&self) -> WindowBits {
        self.window
    }

    fn record_tokens(&mut self, from: usize) {
        self.covered += self.tokens[from..].iter().map(Lz77Token::len).sum::<usize>();
    }

    fn feed(&mut self, input: &[u8]) -> Result<()> {
        for chunk in input.chunks(FEED_STEP) {
            self.raw.extend_from_slice(chunk);
            let from = self.tokens.len();
            self.lz77.compress(chunk, false, &mut self.tokens);
            self.record_tokens(from);

            if self.covered >= BLOCK_INPUT_LIMIT {
                self.write_block(false)?;
            }
        }
        Ok(())
    }

    fn drain_lookahead(&mut self) {
        let from = self.tokens.len();
        self.lz77.compress(&[], true, &mut self.tokens);
        self.record_tokens(from);
    }

    /// Write the collected tokens as one block.
    fn write_block(&mut self, last: bool) -> Result<()> {
        if self.covered == 0 {
            if last {
                write_empty_final_block(&mut self.bits)?;
            }
            return Ok(());
        }

        let block = &self.raw[..self.covered];
        let (litlen_freq, dist_freq) = count_frequencies(&self.tokens);
        let stored = stored_cost(self.bits.pending_bits(), block.len());

        if self.level == CompressionLevel::STORE {
            write_stored(&mut self.bits, block, last)?;
        } else {
            let fixed = 3 + data_cost(
                &FIXED_LITLEN_LENGTHS,
                &FIXED_DISTANCE_LENGTHS,
                &litlen_freq,
                &dist_freq,
            );
            let header = DynamicHeader::build(&litlen_freq, &dist_freq);
            let dynamic = 3
                + header.cost()
                + data_cost(
                    header.litlen.lengths(),
                    header.dist.lengths(),
                    &litlen_freq,
                    &dist_freq,
                );

            if stored <= fixed && stored <= dynamic {
                write_stored(&mut self.bits, block, last)?;
            } else if fixed <= dynamic {
                let (litlen, dist) = fixed_codes();
                self.bits.write_bits(last as u32, 1)?;
                self.bits.write_bits(1, 2)?;
                write_tokens(&mut self.bits, &self.tokens, litlen, dist)?;
            } else {
                self.bits.write_bits(last as u32, 1)?;
                self.bits.write_bits(2, 2)?;
                header.write(&mut self.bits)?;
                write_tokens(&mut self.bits, &self.tokens, &header.litlen, &header.dist)?;
            }
        }

        self.raw.drain(..self.covered);
        self.covered = 0;
        self.tokens.clear();
        Ok(())
    }

    /// Empty stored block: leaves the output byte aligned and ends with
    /// the `00 00 FF FF` marker.
    fn write_sync_marker(&mut self) -> Result<()> {
        self.bits.write_bits(0, 3)?;
        self.bits.align_to_byte()?;
        self.bits.write_bytes(&[0x00, 0x00, 0xFF, 0xFF])
    }
}

impl Default for Deflater {
    fn default() -> Self {
        Self::new(CompressionLevel::default(), WindowBits::default())
    }
}

impl Compressor for Deflater {
    fn compress(&mut self, input: &[u8], output: &mut Vec<u8>, flush: FlushMode) -> Result<()> {
        if self.finished {
            return Err(WebgzError::stream_misuse("deflate stream is already finished"));
        }

        self.feed(input)?;

        match flush {
            FlushMode::None => {}
            FlushMode::Sync | FlushMode::Full => {
                self.drain_lookahead();
                self.write_block(false)?;
                self.write_sync_marker()?;
                if flush == FlushMode::Full {
                    self.lz77.reset();
                }
            }
            FlushMode::Finish => {
                self.drain_lookahead();
                self.write_block(true)?;
                self.bits.flush()?;
                self.finished = true;
            }
        }

        output.append(self.bits.get_mut());
        Ok(())
    }

    fn reset(&mut self) {
        self.lz77.reset();
        self.bits = BitWriter::new(Vec::new());
        self.tokens.clear();
        self.raw.clear();
        self.covered = 0;
        self.finished = false;
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Compress `data` into a complete raw DEFLATE stream.
pub fn deflate(data: &[u8], level: CompressionLevel, window: WindowBits) -> Result<Vec<u8>> {
    Deflater::new(level, window).compress_all(data)
}

fn fixed_codes() -> &'static (HuffmanCodes, HuffmanCodes) {
    static CODES: OnceLock<(HuffmanCodes, HuffmanCodes)> = OnceLock::new();
    CODES.get_or_init(|| {
        (
            HuffmanCodes::from_lengths(&FIXED_LITLEN_LENGTHS),
            HuffmanCodes::from_lengths(&FIXED_DISTANCE_LENGTHS),
        )
    })
}

fn count_frequencies(tokens: &[Lz77Token]) -> ([u32; NUM_LITLEN_SYMBOLS], [u32; NUM_DISTANCE_SYMBOLS]) {
    let mut litlen = [0u32; NUM_LITLEN_SYMBOLS];
    let mut dist = [0u32; NUM_DISTANCE_SYMBOLS];

    for token in tokens {
        match *token {
            Lz77Token::Literal(b) => litlen[b as usize] += 1,
            Lz77Token::Match { length, distance } => {
                litlen[length_code(length).symbol as usize] += 1;
                dist[distance_code(distance).symbol as usize] += 1;
            }
        }
    }
    litlen[END_OF_BLOCK as usize] = 1;

    (litlen, dist)
}

/// Bits for the token data and end-of-block under the given code lengths.
fn data_cost(litlen_lengths: &[u8], dist_lengths: &[u8], litlen_freq: &[u32], dist_freq: &[u32]) -> u64 {
    let mut bits = 0u64;
    for (symbol, &freq) in litlen_freq.iter().enumerate() {
        if freq == 0 {
            continue;
        }
        let extra = if symbol > 256 {
            LENGTH_EXTRA_BITS[symbol - 257] as u64
        } else {
            0
        };
        bits += freq as u64 * (litlen_lengths[symbol] as u64 + extra);
    }
    for (symbol, &freq) in dist_freq.iter().enumerate() {
        if freq > 0 {
            bits += freq as u64 * (dist_lengths[symbol] as u64 + DISTANCE_EXTRA_BITS[symbol] as u64);
        }
    }
    bits
}

/// Exact size of `len` bytes written as stored blocks, starting with
/// `pending_bits` bits in the current partial byte.
fn stored_cost(pending_bits: u8, len: usize) -> u64 {
    let mut bits = 0u64;
    let mut offset = pending_bits as u64;
    let mut remaining = len;
    loop {
        let piece = remaining.min(MAX_STORED_BLOCK);
        offset += 3;
        let pad = (8 - offset % 8) % 8;
        bits += 3 + pad + 32 + 8 * piece as u64;
        offset = 0;
        remaining -= piece;
        if remaining == 0 {
            return bits;
        }
    }
}

fn write_stored<W: Write>(bits: &mut BitWriter<W>, data: &[u8], last: bool) -> Result<()> {
    let mut chunks = data.chunks(MAX_STORED_BLOCK).peekable();
    while let Some(chunk) = chunks.next() {
        let is_last = last && chunks.peek().is_none();
        let len = chunk.len() as u16;
        bits.write_bits(is_last as u32, 1)?;
        bits.write_bits(0, 2)?;
        bits.align_to_byte()?;
        let [l0, l1] = len.to_le_bytes();
        let [n0, n1] = (!len).to_le_bytes();
        bits.write_bytes(&[l0, l1, n0, n1])?;
        bits.write_bytes(chunk)?;
    }
    Ok(())
}

fn write_empty_final_block<W: Write>(bits: &mut BitWriter<W>) -> Result<()> {
    let (litlen, _) = fixed_codes();
    bits.write_bits(1, 1)?;
    bits.write_bits(1, 2)?;
    litlen.write(bits, END_OF_BLOCK)
}

fn write_tokens<W: Write>(
    bits: &mut BitWriter<W>,
    tokens: &[Lz77Token],
    litlen: &HuffmanCodes,
    dist: &HuffmanCodes,
) -> Result<()> {
    for token in tokens {
        match *token {
            Lz77Token::Literal(b) => litlen.write(bits, b as u16)?,
            Lz77Token::Match { length, distance } => {
                let lc = length_code(length);
                litlen.write(bits, lc.symbol)?;
                bits.write_bits(lc.extra_value as u32, lc.extra_bits)?;

                let dc = distance_code(distance);
                dist.write(bits, dc.symbol)?;
                bits.write_bits(dc.extra_value as u32, dc.extra_bits)?;
            }
        }
    }
    litlen.write(bits, END_OF_BLOCK)
}

/// Code tables and their run-length encoded description for a dynamic block.
#[derive(Debug)]
struct DynamicHeader {
    litlen: HuffmanCodes,
    dist: HuffmanCodes,
    codelen: HuffmanCodes,
    hlit: usize,
    hdist: usize,
    hclen: usize,
    /// Code length symbols with their extra-bit values.
    rle: Vec<(u8, u8)>,
}

impl DynamicHeader {
    fn build(litlen_freq: &[u32], dist_freq: &[u32]) -> Self {
        let mut builder = HuffmanBuilder::new(NUM_LITLEN_SYMBOLS, MAX_CODE_BITS);
        for (symbol, &freq) in litlen_freq.iter().enumerate() {
            builder.add_count(symbol as u16, freq);
        }
        builder.ensure_used(2);
        let litlen_lengths = builder.build_lengths();

        let mut builder = HuffmanBuilder::new(NUM_DISTANCE_SYMBOLS, MAX_CODE_BITS);
        for (symbol, &freq) in dist_freq.iter().enumerate() {
            builder.add_count(symbol as u16, freq);
        }
        builder.ensure_used(2);
        let dist_lengths = builder.build_lengths();

        let hlit = last_used(&litlen_lengths).max(257);
        let hdist = last_used(&dist_lengths).max(1);

        let mut combined = Vec::with_capacity(hlit + hdist);
        combined.extend_from_slice(&litlen_lengths[..hlit]);
        combined.extend_from_slice(&dist_lengths[..hdist]);
        let rle = run_length_encode(&combined);

        let mut builder = HuffmanBuilder::new(NUM_CODELEN_SYMBOLS, MAX_CODELEN_BITS);
        for &(symbol, _) in &rle {
            builder.add(symbol as u16);
        }
        builder.ensure_used(2);
        let codelen_lengths = builder.build_lengths();

        let hclen = CODE_LENGTH_ORDER
            .iter()
            .rposition(|&s| codelen_lengths[s] != 0)
            .map_or(0, |i| i + 1)
            .max(4);

        Self {
            litlen: HuffmanCodes::from_lengths(&litlen_lengths),
            dist: HuffmanCodes::from_lengths(&dist_lengths),
            codelen: HuffmanCodes::from_lengths(&codelen_lengths),
            hlit,
            hdist,
            hclen,
            rle,
        }
    }

    /// Header size in bits, not counting BFINAL and BTYPE.
    fn cost(&self) -> u64 {
        let mut bits = 5 + 5 + 4 + 3 * self.hclen as u64;
        for &(symbol, _) in &self.rle {
            bits += self.codelen.length(symbol as u16) as u64 + rle_extra_bits(symbol) as u64;
        }
        bits
    }

    fn write<W: Write>(&self, bits: &mut BitWriter<W>) -> Result<()> {
        bits.write_bits((self.hlit - 257) as u32, 5)?;
        bits.write_bits((self.hdist - 1) as u32, 5)?;
        bits.write_bits((self.hclen - 4) as u32, 4)?;

        for &symbol in &CODE_LENGTH_ORDER[..self.hclen] {
            bits.write_bits(self.codelen.length(symbol as u16) as u32, 3)?;
        }

        for &(symbol, extra) in &self.rle {
            self.codelen.write(bits, symbol as u16)?;
            bits.write_bits(extra as u32, rle_extra_bits(symbol))?;
        }
        Ok(())
    }
}

/// One past the last nonzero entry.
fn last_used(lengths: &[u8]) -> usize {
    lengths.iter().rposition(|&l| l != 0).map_or(0, |i| i + 1)
}

fn rle_extra_bits(symbol: u8) -> u8 {
    match symbol {
        16 => 2,
        17 => 3,
        18 => 7,
        _ => 0,
    }
}

/// Run-length encode code lengths with symbols 16 (repeat previous 3-6),
/// 17 (zeros 3-10) and 18 (zeros 11-138).
fn run_length_encode(lengths: &[u8]) -> Vec<(u8, u8)> {
    let mut out = Vec::new();
    let mut i = 0;

    while i < lengths.len() {
        let len = lengths[i];
        let run = lengths[i..].iter().take_while(|&&l| l == len).count();

        if len == 0 {
            let mut left = run;
            while left >= 11 {
                let r = left.min(138);
                out.push((18, (r - 11) as u8));
                left -= r;
            }
            if left >= 3 {
                out.push((17, (left - 3) as u8));
                left = 0;
            }
            out.extend(std::iter::repeat_n((0, 0), left));
        } else {
            out.push((len, 0));
            let mut left = run - 1;
            while left >= 3 {
                let r = left.min(6);
                out.push((16, (r - 3) as u8));
                left -= r;
            }
            out.extend(std::iter::repeat_n((len, 0), left));
        }

        i += run;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inflate::inflate;

    fn level(n: u8) -> CompressionLevel {
        CompressionLevel::new(n).unwrap()
    }

    fn expand_rle(rle: &[(u8, u8)]) -> Vec<u8> {
        let mut out: Vec<u8> = Vec::new();
        for &(symbol, extra) in rle {
            match symbol {
                16 => {
                    let prev = *out.last().unwrap();
                    out.extend(std::iter::repeat_n(prev, 3 + extra as usize));
                }
                17 => out.extend(std::iter::repeat_n(0, 3 + extra as usize)),
                18 => out.extend(std::iter::repeat_n(0, 11 + extra as usize)),
                l => out.push(l),
            }
        }
        out
    }

    #[test]
    fn test_deflate_stored() {
        let data = b"Hello, World!";
        let compressed = deflate(data, level(0), WindowBits::default()).unwrap();
        // BFINAL=1, BTYPE=00, then LEN/NLEN.
        assert_eq!(compressed[0], 0x01);
        assert_eq!(&compressed[1..5], &[13, 0, !13u8, 0xFF]);
        assert_eq!(&compressed[5..], data);
    }

    #[test]
    fn test_deflate_empty() {
        let compressed = deflate(b"", level(9), WindowBits::default()).unwrap();
        assert_eq!(compressed, vec![0x03, 0x00]);
        assert!(inflate(&compressed, WindowBits::default()).unwrap().is_empty());
    }

    #[test]
    fn test_deflate_roundtrip_levels() {
        let data = b"The quick brown fox jumps over the lazy dog. ".repeat(200);
        for n in 0..=9 {
            let compressed = deflate(&data, level(n), WindowBits::default()).unwrap();
            if n > 0 {
                assert!(compressed.len() < data.len() / 4, "level {n}");
            }
            assert_eq!(inflate(&compressed, WindowBits::default()).unwrap(), data);
        }
    }

    #[test]
    fn test_large_stored_splits() {
        let data: Vec<u8> = (0..150_000u32).map(|i| (i * 7 + i / 13) as u8).collect();
        let compressed = deflate(&data, level(0), WindowBits::MAX).unwrap();
        assert_eq!(inflate(&compressed, WindowBits::MAX).unwrap(), data);
    }

    #[test]
    fn test_sync_flush_marker() {
        let mut deflater = Deflater::new(level(9), WindowBits::default());
        let mut out = Vec::new();
        deflater.compress(b"abcabcabc", &mut out, FlushMode::Sync).unwrap();
        assert!(out.ends_with(&[0x00, 0x00, 0xFF, 0xFF]));

        deflater.compress(b"abc", &mut out, FlushMode::Finish).unwrap();
        assert!(deflater.is_finished());
        assert_eq!(inflate(&out, WindowBits::default()).unwrap(), b"abcabcabcabc");
    }

    #[test]
    fn test_compress_after_finish_fails() {
        let mut deflater = Deflater::default();
        let mut out = Vec::new();
        deflater.compress(b"x", &mut out, FlushMode::Finish).unwrap();
        assert!(matches!(
            deflater.compress(b"y", &mut out, FlushMode::None),
            Err(WebgzError::StreamMisuse { .. })
        ));

        deflater.reset();
        out.clear();
        deflater.compress(b"y", &mut out, FlushMode::Finish).unwrap();
        assert_eq!(inflate(&out, WindowBits::default()).unwrap(), b"y");
    }

    #[test]
    fn test_full_flush_restarts_history() {
        let mut deflater = Deflater::new(level(9), WindowBits::default());
        let mut out = Vec::new();
        deflater.compress(b"0123456789", &mut out, FlushMode::Full).unwrap();
        let first = out.len();
        deflater.compress(b"0123456789", &mut out, FlushMode::Finish).unwrap();
        // No back-reference into the first segment: second block is literals.
        assert_eq!(inflate(&out, WindowBits::default()).unwrap(), b"01234567890123456789");
        assert!(out.len() - first >= 10);
    }

    #[test]
    fn test_rle_long_runs() {
        let mut lengths = vec![0u8; 300];
        lengths.extend(std::iter::repeat_n(8u8, 20));
        lengths.extend([5, 0, 0, 7]);
        let rle = run_length_encode(&lengths);
        assert_eq!(expand_rle(&rle), lengths);
        assert_eq!(rle[0], (18, 127));
        assert!(rle.iter().all(|&(s, e)| match s {
            16 => e <= 3,
            17 => e <= 7,
            18 => e <= 127,
            _ => e == 0,
        }));
    }

    #[test]
    fn test_stored_cost_matches_output() {
        for (pending, len) in [(0u8, 10usize), (3, 10), (5, 70_000)] {
            let mut bits = BitWriter::new(Vec::new());
            bits.write_bits(0, pending).unwrap();
            let before = bits.bits_written();
            let data = vec![0u8; len];
            write_stored(&mut bits, &data, true).unwrap();
            assert_eq!(bits.bits_written() - before, stored_cost(pending, len));
        }
    }

    #[test]
    fn test_chunked_stream_roundtrip() {
        let data: Vec<u8> = b"body { margin: 0; padding: 0; } .nav a { color: #fff; }\n"
            .iter()
            .cycle()
            .take(200_000)
            .copied()
            .collect();
        let window = WindowBits::new(9).unwrap();
        let mut deflater = Deflater::new(level(9), window);
        let mut out = Vec::new();
        for chunk in data.chunks(4096) {
            deflater.compress(chunk, &mut out, FlushMode::None).unwrap();
        }
        deflater.compress(&[], &mut out, FlushMode::Finish).unwrap();
        assert_eq!(inflate(&out, window).unwrap(), data);
    }
}
