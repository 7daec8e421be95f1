use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use hzip::codec::{build_code_table, FrequencyTable};
use hzip::{hzip_decode, hzip_encode};

/// Text-like data with a skewed byte distribution.
fn generate_text(size: usize) -> Vec<u8> {
    let phrases: &[&[u8]] = &[
        b"The quick brown fox jumps over the lazy dog. ",
        b"Pack my box with five dozen liquor jugs! ",
        b"How vexingly quick daft zebras jump!! ",
    ];
    let mut rng = StdRng::seed_from_u64(42);
    let mut data = Vec::with_capacity(size);
    while data.len() < size {
        data.extend_from_slice(phrases[rng.gen_range(0..phrases.len())]);
    }
    data.truncate(size);
    data
}

fn generate_random(size: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut data = vec![0u8; size];
    rng.fill(&mut data[..]);
    data
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("hzip_encode");
    for size in [1024, 64 * 1024, 1024 * 1024] {
        group.throughput(Throughput::Bytes(size as u64));
        let text = generate_text(size);
        let random = generate_random(size);
        group.bench_with_input(BenchmarkId::new("text", size), &text, |b, data| {
            b.iter(|| hzip_encode(black_box(data)).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("random", size), &random, |b, data| {
            b.iter(|| hzip_encode(black_box(data)).unwrap())
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("hzip_decode");
    for size in [1024, 64 * 1024, 1024 * 1024] {
        group.throughput(Throughput::Bytes(size as u64));
        let container = hzip_encode(&generate_text(size)).unwrap();
        group.bench_with_input(BenchmarkId::new("text", size), &container, |b, data| {
            b.iter(|| hzip_decode(black_box(data)).unwrap())
        });
    }
    group.finish();
}

fn bench_code_table(c: &mut Criterion) {
    let freq = FrequencyTable::from_bytes(&generate_random(64 * 1024));
    c.bench_function("build_code_table_256_symbols", |b| {
        b.iter(|| build_code_table(black_box(&freq)).unwrap())
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_code_table);
criterion_main!(benches);
