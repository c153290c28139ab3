use bilinear::arith::{
    BilinearGroup, DebugBilinearGroup, Group, LazyGroup, PairingType, PointCompression,
    SupersingularBilinearGroup,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use num_bigint::BigInt;
use rand::{rngs::StdRng, SeedableRng};

fn bench_compression(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let group = SupersingularBilinearGroup::generate(&mut rng, 160, 512).unwrap();
    let curve = group.curve();
    let point = curve.random(&mut rng).unwrap();
    let compressed = curve.compress(&point).unwrap();

    c.bench_function("supersingular/compress_512", |b| {
        b.iter(|| black_box(curve.compress(black_box(&point)).unwrap()));
    });
    c.bench_function("supersingular/decompress_512", |b| {
        b.iter(|| black_box(curve.decompress(black_box(&compressed)).unwrap()));
    });
}

fn bench_pairing(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let group = SupersingularBilinearGroup::generate(&mut rng, 160, 512).unwrap();
    let (g1, g2) = (group.g1(), group.g2());
    let (a, b) = (g1.random(&mut rng).unwrap(), g2.random(&mut rng).unwrap());
    let e = group.bilinear_map();

    c.bench_function("supersingular/pairing_512", |bench| {
        bench.iter(|| black_box(e.apply(black_box(&a), black_box(&b)).unwrap()));
    });
}

#[cfg(feature = "ark_bn254")]
fn bench_bn254_pairing(c: &mut Criterion) {
    use bilinear::arith::ArkBilinearGroup;

    let mut rng = StdRng::seed_from_u64(42);
    let group = ArkBilinearGroup::<ark_bn254::Bn254>::new().unwrap();
    let (g1, g2) = (group.g1(), group.g2());
    let (a, b) = (g1.random(&mut rng).unwrap(), g2.random(&mut rng).unwrap());
    let e = group.bilinear_map();

    c.bench_function("bn254/pairing", |bench| {
        bench.iter(|| black_box(e.apply(black_box(&a), black_box(&b)).unwrap()));
    });
}

/// Product of 64 powers, evaluated eagerly and through the lazy decorator.
fn bench_lazy_product(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let bg = DebugBilinearGroup::new(1 << 20, PairingType::Type1, 4).unwrap();
    let eager = bg.g1();
    let lazy = LazyGroup::new(eager.clone());
    let terms: Vec<_> = (0..64)
        .map(|i| (eager.random(&mut rng).unwrap(), BigInt::from(1_000_003u64 * (i + 1))))
        .collect();

    c.bench_function("debug/eager_product_64", |b| {
        b.iter(|| {
            let mut acc = eager.identity();
            for (base, exponent) in &terms {
                acc = eager.op(&acc, &eager.pow(base, exponent).unwrap()).unwrap();
            }
            black_box(acc)
        });
    });

    let lifted: Vec<_> = terms
        .iter()
        .map(|(base, exponent)| (lazy.wrap(base).unwrap(), exponent.clone()))
        .collect();
    c.bench_function("debug/lazy_product_64", |b| {
        b.iter(|| {
            let mut acc = lazy.identity();
            for (base, exponent) in &lifted {
                acc = lazy.op(&acc, &lazy.pow(base, exponent).unwrap()).unwrap();
            }
            black_box(lazy.force(&acc).unwrap())
        });
    });
}

fn criterion_benches(c: &mut Criterion) {
    bench_compression(c);
    bench_pairing(c);
    #[cfg(feature = "ark_bn254")]
    bench_bn254_pairing(c);
    bench_lazy_product(c);
}

criterion_group!(benches, criterion_benches);
criterion_main!(benches);
