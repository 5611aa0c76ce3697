//! Embed throughput over a synthetic carrier.

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

use graphstega_core::{Engine, MemoryCarrier, Preset};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn noisy_bytes(len: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(1234);
    (0..len).map(|_| rng.r#gen()).collect()
}

fn bench_embed(c: &mut Criterion) {
    let bytes = noisy_bytes(300_000);
    let payload = noisy_bytes(1_000);

    let mut group = c.benchmark_group("embed");
    group.throughput(Throughput::Bytes(bytes.len() as u64));
    for preset in [
        Preset::Default,
        Preset::Imperceptibility,
        Preset::Performance,
    ] {
        let engine = Engine::new(preset.parameters());
        group.bench_function(format!("{preset:?}"), |b| {
            b.iter(|| {
                let mut carrier = MemoryCarrier::new(bytes.clone());
                black_box(engine.embed(&mut carrier, &payload).unwrap())
            });
        });
    }
    group.finish();
}

fn bench_extract(c: &mut Criterion) {
    let engine = Engine::new(Preset::Default.parameters());
    let mut carrier = MemoryCarrier::new(noisy_bytes(300_000));
    engine.embed(&mut carrier, &noisy_bytes(1_000)).unwrap();

    c.bench_function("extract", |b| {
        b.iter(|| black_box(engine.extract(&carrier).unwrap()));
    });
}

criterion_group!(benches, bench_embed, bench_extract);
criterion_main!(benches);
