//! LZ77 match finding with a configurable window.
//!
//! The encoder keeps a history buffer of `2 * window + LOOKAHEAD` bytes and
//! hash chains over 3-byte prefixes. Every match it emits has a distance of
//! at most `window` bytes, so a decoder with only `2^bits` bytes of history
//! can always resolve it.
//!
//! Input may arrive in arbitrary pieces. Unless asked to flush, the encoder
//! holds back the last [`LOOKAHEAD`] bytes so matches are never cut short
//! at a chunk boundary.

use webgz_core::{CompressionLevel, WindowBits};

/// Minimum match length.
pub const MIN_MATCH: usize = 3;

/// Maximum match length.
pub const MAX_MATCH: usize = 258;

/// Bytes kept unprocessed between calls so a full-length match (plus the
/// lazy look at the next position) always has data to compare against.
pub const LOOKAHEAD: usize = MAX_MATCH + MIN_MATCH + 1;

/// Size of the hash table (power of 2).
const HASH_SIZE: usize = 32768;

/// Hash mask.
const HASH_MASK: usize = HASH_SIZE - 1;

/// Number of hash chain entries to check at level 9.
const MAX_CHAIN_LENGTH: usize = 4096;

/// Empty hash slot.
const NIL: u32 = u32::MAX;

/// A token produced by LZ77 compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lz77Token {
    /// A literal byte.
    Literal(u8),
    /// A back-reference to previously seen data.
    Match {
        /// Number of bytes to copy (3-258).
        length: u16,
        /// Distance back into the window (1 to the window size).
        distance: u16,
    },
}

impl Lz77Token {
    /// Number of input bytes this token stands for.
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Self::Literal(_) => 1,
            Self::Match { length, .. } => *length as usize,
        }
    }

    /// Tokens always cover at least one byte.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// LZ77 encoder for DEFLATE compression.
#[derive(Debug)]
pub struct Lz77Encoder {
    /// History plus not yet tokenized input.
    buffer: Vec<u8>,
    /// Maximum back-reference distance.
    window_size: usize,
    /// End of valid data in `buffer`.
    data_end: usize,
    /// Next position to tokenize.
    strstart: usize,
    /// Next position to insert into the hash chains.
    next_insert: usize,
    /// Hash table: most recent position per hash.
    head: Vec<u32>,
    /// Hash chain: previous position with the same hash, by `pos % window`.
    prev: Vec<u32>,
    /// Chain entries to examine per search (0 disables matching).
    max_chain: usize,
    /// Minimum match length to accept.
    min_match: usize,
    /// Enable lazy matching.
    lazy_match: bool,
}

impl Lz77Encoder {
    /// Create an encoder for the given level and window.
    pub fn new(level: CompressionLevel, window: WindowBits) -> Self {
        let (max_chain, min_match, lazy_match) = match level.value() {
            0 => (0, MAX_MATCH + 1, false),
            1 => (4, 4, false),
            2 => (8, 4, false),
            3 => (16, 4, false),
            4 => (32, 4, false),
            5 => (64, 4, true),
            6 => (128, 4, true),
            7 => (256, 3, true),
            8 => (1024, 3, true),
            _ => (MAX_CHAIN_LENGTH, 3, true),
        };

        let window_size = window.size();
        Self {
            buffer: vec![0; 2 * window_size + LOOKAHEAD],
            window_size,
            data_end: 0,
            strstart: 0,
            next_insert: 0,
            head: vec![NIL; HASH_SIZE],
            prev: vec![NIL; window_size],
            max_chain,
            min_match,
            lazy_match,
        }
    }

    /// Window size in bytes.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Forget all history; later matches cannot reach earlier input.
    ///
    /// Input still held back as lookahead is discarded, so callers flush
    /// before resetting.
    pub fn reset(&mut self) {
        self.data_end = 0;
        self.strstart = 0;
        self.next_insert = 0;
        self.head.fill(NIL);
        self.prev.fill(NIL);
    }

    /// Number of input bytes accepted but not yet turned into tokens.
    pub fn pending(&self) -> usize {
        self.data_end - self.strstart
    }

    /// Compute hash for 3 bytes.
    #[inline(always)]
    fn hash(b0: u8, b1: u8, b2: u8) -> usize {
        let h = ((b0 as usize).wrapping_mul(506832829))
            ^ ((b1 as usize).wrapping_mul(2654435761) << 8)
            ^ ((b2 as usize).wrapping_mul(374761393) << 16);
        (h ^ (h >> 15)) & HASH_MASK
    }

    /// Insert every position before `limit` that has 3 bytes of data.
    fn insert_until(&mut self, limit: usize) {
        if self.max_chain == 0 {
            self.next_insert = self.next_insert.max(limit);
            return;
        }
        while self.next_insert < limit && self.next_insert + MIN_MATCH <= self.data_end {
            let pos = self.next_insert;
            let h = Self::hash(self.buffer[pos], self.buffer[pos + 1], self.buffer[pos + 2]);
            self.prev[pos & (self.window_size - 1)] = self.head[h];
            self.head[h] = pos as u32;
            self.next_insert += 1;
        }
    }

    /// Longest match for `pos` within the window, as `(length, distance)`.
    ///
    /// Positions before `pos` must already be inserted and `pos` itself
    /// must not be.
    fn find_match(&self, pos: usize) -> Option<(usize, usize)> {
        let max_len = (self.data_end - pos).min(MAX_MATCH);
        if self.max_chain == 0 || max_len < self.min_match || max_len < MIN_MATCH {
            return None;
        }

        let h = Self::hash(self.buffer[pos], self.buffer[pos + 1], self.buffer[pos + 2]);
        let mut candidate = self.head[h];
        let mut best_len = self.min_match - 1;
        let mut best_dist = 0usize;
        let mut chain = 0;

        while candidate != NIL && chain < self.max_chain {
            let cand = candidate as usize;
            if cand >= pos || pos - cand > self.window_size {
                break;
            }

            // Cheap rejection on the byte that would extend the best match.
            if self.buffer[cand + best_len] == self.buffer[pos + best_len] {
                let len = self.buffer[cand..cand + max_len]
                    .iter()
                    .zip(&self.buffer[pos..pos + max_len])
                    .take_while(|(a, b)| a == b)
                    .count();

                if len > best_len {
                    best_len = len;
                    best_dist = pos - cand;
                    if len >= max_len {
                        break;
                    }
                }
            }

            candidate = self.prev[cand & (self.window_size - 1)];
            chain += 1;
        }

        (best_len >= self.min_match && best_len >= MIN_MATCH).then_some((best_len, best_dist))
    }

    /// Shift the buffer down by one window.
    fn slide(&mut self) {
        let shift = self.window_size;
        debug_assert!(self.strstart >= shift);

        self.buffer.copy_within(shift..self.data_end, 0);
        self.data_end -= shift;
        self.strstart -= shift;
        self.next_insert = self.next_insert.saturating_sub(shift);

        let remap = |entry: &mut u32| {
            *entry = if *entry == NIL || (*entry as usize) < shift {
                NIL
            } else {
                *entry - shift as u32
            };
        };
        self.head.iter_mut().for_each(remap);
        self.prev.iter_mut().for_each(remap);
    }

    /// Tokenize buffered data. Without `flush`, stops [`LOOKAHEAD`] bytes
    /// short of the end.
    fn process(&mut self, flush: bool, tokens: &mut Vec<Lz77Token>) {
        let keep = if flush { 0 } else { LOOKAHEAD };

        while self.strstart < self.data_end && self.data_end - self.strstart > keep {
            let pos = self.strstart;
            self.insert_until(pos);

            if let Some((length, distance)) = self.find_match(pos) {
                let mut use_match = true;

                if self.lazy_match && pos + 1 < self.data_end {
                    self.insert_until(pos + 1);
                    if let Some((next_len, _)) = self.find_match(pos + 1) {
                        if next_len > length + 1 {
                            use_match = false;
                        }
                    }
                }

                if use_match {
                    tokens.push(Lz77Token::Match {
                        length: length as u16,
                        distance: distance as u16,
                    });
                    self.strstart += length;
                    self.insert_until(self.strstart);
                    continue;
                }
            }

            tokens.push(Lz77Token::Literal(self.buffer[pos]));
            self.strstart += 1;
        }
    }

    /// Feed `input` and append the resulting tokens.
    ///
    /// With `flush` set, all buffered input is tokenized before returning.
    pub fn compress(&mut self, input: &[u8], flush: bool, tokens: &mut Vec<Lz77Token>) {
        let mut remaining = input;

        loop {
            if !remaining.is_empty() && self.data_end == self.buffer.len() {
                self.slide();
            }

            let room = self.buffer.len() - self.data_end;
            let n = room.min(remaining.len());
            self.buffer[self.data_end..self.data_end + n].copy_from_slice(&remaining[..n]);
            self.data_end += n;
            remaining = &remaining[n..];

            self.process(flush && remaining.is_empty(), tokens);

            if remaining.is_empty() {
                break;
            }
        }
    }

    /// Tokenize a whole buffer in one go (convenience method).
    pub fn compress_all(input: &[u8], level: CompressionLevel, window: WindowBits) -> Vec<Lz77Token> {
        let mut encoder = Self::new(level, window);
        let mut tokens = Vec::with_capacity(input.len() / 2);
        encoder.compress(input, true, &mut tokens);
        tokens
    }
}
