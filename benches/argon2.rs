use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use weir::{Algorithm, Argon2, Block, Params};

/// Fill throughput across matrix sizes, with the matrix allocation
/// amortized out so the compression loop dominates.
fn bench_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("argon2id_fill");
    group.sample_size(20);

    for memory_kib in [256u32, 1024, 8 * 1024, 64 * 1024] {
        let params = Params::new(memory_kib, 1, 1);
        let hasher = Argon2::new(Algorithm::Argon2id, params.clone());
        let mut blocks = vec![Block::default(); params.block_count()];
        let mut out = [0u8; 32];

        group.throughput(Throughput::Bytes(params.block_count() as u64 * 1024));
        group.bench_with_input(
            BenchmarkId::from_parameter(memory_kib),
            &memory_kib,
            |b, _| {
                b.iter(|| {
                    hasher
                        .hash_into_with_memory(b"password", b"benchsalt", &mut out, &mut blocks)
                        .unwrap();
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_fill);
criterion_main!(benches);
