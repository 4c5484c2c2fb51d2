use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rf_codecs::{decode_alaw, decode_ima4, decode_mace, decode_ulaw, expand_ysnd, MaceVariant};

/// Deterministic xorshift noise standing in for encoded audio.
fn noise(len: usize) -> Vec<u8> {
    let mut x: u32 = 0x1234_5678;
    (0..len)
        .map(|_| {
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            x as u8
        })
        .collect()
}

fn bench_codecs(c: &mut Criterion) {
    let input = noise(22_032 / 64 * 68);
    let mut group = c.benchmark_group("codecs");
    group.throughput(Throughput::Bytes(input.len() as u64));

    group.bench_function("mace3_stereo", |b| {
        b.iter(|| decode_mace(black_box(&input), 2, MaceVariant::Mace3))
    });
    group.bench_function("mace6_mono", |b| {
        b.iter(|| decode_mace(black_box(&input), 1, MaceVariant::Mace6))
    });
    group.bench_function("ima4_stereo", |b| b.iter(|| decode_ima4(black_box(&input), 2)));
    group.bench_function("ulaw", |b| b.iter(|| decode_ulaw(black_box(&input))));
    group.bench_function("alaw", |b| b.iter(|| decode_alaw(black_box(&input))));
    group.bench_function("ysnd", |b| {
        b.iter(|| expand_ysnd(black_box(&input), input.len()))
    });
    group.finish();
}

criterion_group!(benches, bench_codecs);
criterion_main!(benches);
