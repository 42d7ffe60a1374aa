//! Static DEFLATE tables (RFC 1951 Sections 3.2.5 to 3.2.7).

/// Number of literal/length symbols that may appear in a stream (0-285).
pub const NUM_LITLEN_SYMBOLS: usize = 286;

/// Number of distance symbols that may appear in a stream (0-29).
pub const NUM_DISTANCE_SYMBOLS: usize = 30;

/// Number of code length symbols (0-18).
pub const NUM_CODELEN_SYMBOLS: usize = 19;

/// End-of-block symbol.
pub const END_OF_BLOCK: u16 = 256;

/// Longest code allowed for literal/length and distance trees.
pub const MAX_CODE_BITS: u8 = 15;

/// Longest code allowed for the code length tree.
pub const MAX_CODELEN_BITS: u8 = 7;

/// Fixed literal/length code lengths.
///
/// - Symbols 0-143: 8 bits
/// - Symbols 144-255: 9 bits
/// - Symbols 256-279: 7 bits
/// - Symbols 280-287: 8 bits
pub const FIXED_LITLEN_LENGTHS: [u8; 288] = {
    let mut lengths = [8u8; 288];
    let mut i = 144;
    while i < 256 {
        lengths[i] = 9;
        i += 1;
    }
    while i < 280 {
        lengths[i] = 7;
        i += 1;
    }
    lengths
};

/// Fixed distance code lengths: all 5 bits.
pub const FIXED_DISTANCE_LENGTHS: [u8; 30] = [5; 30];

/// Base match length for length codes 257-285.
pub const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115,
    131, 163, 195, 227, 258,
];

/// Extra bits for length codes 257-285.
pub const LENGTH_EXTRA_BITS: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

/// Base distance for distance codes 0-29.
pub const DISTANCE_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];

/// Extra bits for distance codes 0-29.
pub const DISTANCE_EXTRA_BITS: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/// Transmission order of the code length code lengths.
pub const CODE_LENGTH_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// A symbol plus the extra bits that follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeWithExtra {
    /// Huffman symbol.
    pub symbol: u16,
    /// Number of extra bits.
    pub extra_bits: u8,
    /// Value of the extra bits.
    pub extra_value: u16,
}

/// Map a match length (3-258) to its length symbol (257-285).
pub fn length_code(length: u16) -> CodeWithExtra {
    debug_assert!((3..=258).contains(&length), "length out of range: {length}");
    // 258 has its own code; 227..=257 share code 284 with 5 extra bits.
    let index = if length == 258 {
        28
    } else {
        LENGTH_BASE[..28].partition_point(|&base| base <= length) - 1
    };
    CodeWithExtra {
        symbol: 257 + index as u16,
        extra_bits: LENGTH_EXTRA_BITS[index],
        extra_value: length - LENGTH_BASE[index],
    }
}

/// Map a match distance (1-32768) to its distance symbol (0-29).
pub fn distance_code(distance: u16) -> CodeWithExtra {
    debug_assert!(distance >= 1, "distance out of range: {distance}");
    let index = DISTANCE_BASE.partition_point(|&base| base <= distance) - 1;
    CodeWithExtra {
        symbol: index as u16,
        extra_bits: DISTANCE_EXTRA_BITS[index],
        extra_value: distance - DISTANCE_BASE[index],
    }
}
