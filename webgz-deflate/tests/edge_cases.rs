//! Edge case tests for window-bounded DEFLATE.

use webgz_core::{CompressionLevel, Compressor, FlushMode, WebgzError, WindowBits};
use webgz_deflate::{Deflater, Lz77Encoder, Lz77Token, deflate, inflate};

const STYLESHEET: &[u8] = b"body{margin:0;padding:0;font-family:sans-serif}.nav{display:flex;background:#333}.nav a{color:#fff;padding:8px 12px;text-decoration:none}.nav a:hover{background:#555}.card{border:1px solid #ccc;border-radius:4px;margin:8px;padding:8px}";

/// `STYLESHEET` compressed by zlib (level 9, raw deflate, window bits 10).
/// A single dynamic Huffman block.
const ZLIB_STYLESHEET: &[u8] = &[
    0x4d, 0x8f, 0x51, 0x0a, 0x83, 0x30, 0x10, 0x44, 0xaf, 0x22, 0xf8, 0xad, 0xd4, 0x5a,
    0xa1, 0xac, 0xa7, 0x59, 0xb3, 0x89, 0x0d, 0x8d, 0xbb, 0xb2, 0x51, 0x51, 0x82, 0x77,
    0xaf, 0xb4, 0x52, 0xfc, 0x1b, 0x86, 0x99, 0x37, 0x4c, 0x27, 0xb4, 0xa5, 0x01, 0xb5,
    0xf7, 0x0c, 0xb7, 0x76, 0x44, 0x22, 0xcf, 0xfd, 0xa1, 0x9c, 0xf0, 0x54, 0x38, 0x1c,
    0x7c, 0xd8, 0x20, 0x22, 0xc7, 0x22, 0x5a, 0xf5, 0x6e, 0x2f, 0x19, 0x97, 0x44, 0x3e,
    0x8e, 0x01, 0x37, 0x70, 0xc1, 0xae, 0x6d, 0x87, 0xe6, 0xdd, 0xab, 0xcc, 0x4c, 0x90,
    0xd7, 0x75, 0xfd, 0x4d, 0x64, 0x98, 0x8c, 0x04, 0x51, 0xc8, 0x9d, 0x73, 0x7f, 0xe8,
    0x73, 0x5c, 0xb3, 0xea, 0x3e, 0xae, 0xed, 0x64, 0xd7, 0xa9, 0x20, 0x6b, 0x44, 0x71,
    0xf2, 0xc2, 0xc0, 0xc2, 0xf6, 0xec, 0xc1, 0x4b, 0x16, 0xab, 0xe9, 0x0a, 0x6d, 0x9a,
    0x66, 0x2f, 0x0d, 0x2a, 0xa5, 0x4e, 0x94, 0xac, 0x42, 0x75, 0x70, 0xa2, 0x04, 0x4f,
    0x59, 0x6e, 0x8c, 0x69, 0x7f, 0x6e, 0xa1, 0x48, 0x7e, 0x8e, 0xf0, 0x38, 0xf8, 0xe7,
    0x9d, 0x63, 0xef, 0xba, 0xbd, 0x7f, 0x00,
];

fn text_like(size: usize) -> Vec<u8> {
    let words: [&[u8]; 8] = [
        b"<tr><td>", b"</td></tr>\n", b"temperature", b"humidity", b" = ", b"var ", b"{}", b";\n",
    ];
    let mut data = Vec::with_capacity(size);
    let mut seed: u64 = 0x2545F4914F6CDD1D;
    while data.len() < size {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let pick = (seed >> 33) as usize;
        if pick % 7 == 0 {
            data.push((seed >> 20) as u8);
        } else {
            data.extend_from_slice(words[pick % words.len()]);
        }
    }
    data.truncate(size);
    data
}

fn random(size: usize) -> Vec<u8> {
    let mut seed: u64 = 0x123456789ABCDEF0;
    (0..size)
        .map(|_| {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            (seed >> 32) as u8
        })
        .collect()
}

#[test]
fn test_empty_input() {
    for bits in 8..=15 {
        let window = WindowBits::new(bits).unwrap();
        let compressed = deflate(b"", CompressionLevel::BEST, window).unwrap();
        assert_eq!(inflate(&compressed, window).unwrap(), b"");
    }
}

#[test]
fn test_single_byte() {
    let window = WindowBits::default();
    let compressed = deflate(b"A", CompressionLevel::BEST, window).unwrap();
    assert_eq!(inflate(&compressed, window).unwrap(), b"A");
}

#[test]
fn test_all_zeros() {
    let input = vec![0u8; 1000];
    let window = WindowBits::default();
    let compressed = deflate(&input, CompressionLevel::BEST, window).unwrap();
    assert_eq!(inflate(&compressed, window).unwrap(), input);
    assert!(compressed.len() < input.len() / 10);
}

#[test]
fn test_random_data_falls_back_to_stored() {
    let input = random(5000);
    let window = WindowBits::default();
    let compressed = deflate(&input, CompressionLevel::BEST, window).unwrap();
    assert_eq!(inflate(&compressed, window).unwrap(), input);
    // Stored overhead is 5 bytes per block.
    assert!(compressed.len() <= input.len() + 5);
}

#[test]
fn test_every_window_and_level_roundtrip() {
    let input = text_like(70_000);
    for bits in 8..=15 {
        let window = WindowBits::new(bits).unwrap();
        for level in [0u8, 1, 5, 9] {
            let level = CompressionLevel::new(level).unwrap();
            let compressed = deflate(&input, level, window).unwrap();
            let decompressed = inflate(&compressed, window)
                .unwrap_or_else(|e| panic!("bits {bits}, level {level}: {e}"));
            assert_eq!(decompressed, input, "bits {bits}, level {level}");
        }
    }
}

#[test]
fn test_tokens_respect_window() {
    let input = text_like(40_000);
    for bits in 8..=15 {
        let window = WindowBits::new(bits).unwrap();
        let tokens = Lz77Encoder::compress_all(&input, CompressionLevel::BEST, window);
        let max = tokens
            .iter()
            .filter_map(|t| match t {
                Lz77Token::Match { distance, .. } => Some(*distance as usize),
                Lz77Token::Literal(_) => None,
            })
            .max()
            .unwrap_or(0);
        assert!(max <= window.size(), "bits {bits}: distance {max}");
    }
}

#[test]
fn test_larger_window_compresses_better() {
    let input = text_like(64 * 1024);
    let small = deflate(&input, CompressionLevel::BEST, WindowBits::MIN).unwrap();
    let large = deflate(&input, CompressionLevel::BEST, WindowBits::MAX).unwrap();
    assert!(large.len() <= small.len());
}

#[test]
fn test_inflate_rejects_oversized_window() {
    // Period of 3000 bytes: matches reach 3000 back, beyond a 2 KiB window.
    let block = random(3000);
    let input = [block.clone(), block].concat();
    let compressed = deflate(&input, CompressionLevel::BEST, WindowBits::MAX).unwrap();

    assert_eq!(inflate(&compressed, WindowBits::new(12).unwrap()).unwrap(), input);
    let err = inflate(&compressed, WindowBits::new(11).unwrap()).unwrap_err();
    assert!(matches!(err, WebgzError::InvalidDistance { window: 2048, .. }));
}

#[test]
fn test_inflate_zlib_dynamic_block() {
    let window = WindowBits::from_zlib(-10).unwrap();
    assert_eq!(inflate(ZLIB_STYLESHEET, window).unwrap(), STYLESHEET);
}

#[test]
fn test_max_match_length() {
    let input = vec![42u8; 258 * 10];
    let window = WindowBits::MIN;
    let compressed = deflate(&input, CompressionLevel::BEST, window).unwrap();
    assert_eq!(inflate(&compressed, window).unwrap(), input);
}

#[test]
fn test_streaming_with_flushes() {
    let input = text_like(30_000);
    let window = WindowBits::from_zlib(-9).unwrap();
    let mut deflater = Deflater::new(CompressionLevel::BEST, window);
    let mut out = Vec::new();

    for (i, chunk) in input.chunks(1000).enumerate() {
        let flush = match i % 10 {
            3 => FlushMode::Sync,
            7 => FlushMode::Full,
            _ => FlushMode::None,
        };
        deflater.compress(chunk, &mut out, flush).unwrap();
    }
    deflater.compress(&[], &mut out, FlushMode::Finish).unwrap();

    assert_eq!(inflate(&out, window).unwrap(), input);
}

#[test]
fn test_truncated_stream_fails() {
    let input = text_like(5000);
    let window = WindowBits::default();
    let compressed = deflate(&input, CompressionLevel::BEST, window).unwrap();
    let truncated = &compressed[..compressed.len() / 2];
    assert!(inflate(truncated, window).is_err());
}
