//! Deflate throughput across window sizes and levels.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use webgz_core::{CompressionLevel, WindowBits};
use webgz_deflate::{deflate, inflate};

/// Markup-like data resembling the assets the encoder is used on.
fn web_asset(size: usize) -> Vec<u8> {
    let parts: [&[u8]; 5] = [
        b"<div class=\"card\"><span id=\"v",
        b"\">--</span></div>\n",
        b"function update(id){fetch('/api/'+id).then(r=>r.json())}\n",
        b".card{margin:4px;padding:2px 8px;border:1px solid #ccc}\n",
        b"<button onclick=\"update(",
    ];
    let mut data = Vec::with_capacity(size);
    let mut seed: u64 = 0x123456789ABCDEF0;
    while data.len() < size {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
        data.extend_from_slice(parts[(seed >> 33) as usize % parts.len()]);
        data.extend_from_slice(format!("{}", (seed >> 40) % 1000).as_bytes());
    }
    data.truncate(size);
    data
}

fn bench_window_sizes(c: &mut Criterion) {
    let data = web_asset(128 * 1024);
    let mut group = c.benchmark_group("deflate_window");
    group.throughput(Throughput::Bytes(data.len() as u64));

    for bits in [8u8, 10, 12, 15] {
        let window = WindowBits::new(bits).unwrap_or_default();
        group.bench_with_input(BenchmarkId::from_parameter(bits), &data, |b, data| {
            b.iter(|| deflate(black_box(data), CompressionLevel::BEST, window));
        });
    }
    group.finish();
}

fn bench_levels(c: &mut Criterion) {
    let data = web_asset(128 * 1024);
    let window = WindowBits::default();
    let mut group = c.benchmark_group("deflate_level");
    group.throughput(Throughput::Bytes(data.len() as u64));

    for level in [1u8, 6, 9] {
        let level = CompressionLevel::new(level).unwrap_or_default();
        group.bench_with_input(BenchmarkId::from_parameter(level), &data, |b, data| {
            b.iter(|| deflate(black_box(data), level, window));
        });
    }
    group.finish();
}

fn bench_inflate(c: &mut Criterion) {
    let data = web_asset(128 * 1024);
    let window = WindowBits::default();
    let Ok(compressed) = deflate(&data, CompressionLevel::BEST, window) else {
        return;
    };
    let mut group = c.benchmark_group("inflate");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("window_10", |b| {
        b.iter(|| inflate(black_box(&compressed), window));
    });
    group.finish();
}

criterion_group!(benches, bench_window_sizes, bench_levels, bench_inflate);
criterion_main!(benches);
