use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use puncta::{Blob, BridgeSuppressor, ProximitySuppressor, Volume};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const WIDTH: usize = 512;
const HEIGHT: usize = 512;
const DEPTH: usize = 32;

fn random_blobs(count: usize, seed: u64) -> Vec<Blob> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            Blob::new(
                rng.random_range(0..DEPTH),
                rng.random_range(0.0..HEIGHT as f32),
                rng.random_range(0.0..WIDTH as f32),
                1.5,
                rng.random_range(100.0..1000.0),
            )
        })
        .collect()
}

fn noisy_volume(seed: u64) -> Volume {
    let mut rng = StdRng::seed_from_u64(seed);
    let voxels = (0..WIDTH * HEIGHT * DEPTH)
        .map(|_| 100.0 + rng.random::<f32>() * 50.0)
        .collect();
    Volume::new(WIDTH, HEIGHT, DEPTH, voxels)
}

fn proximity_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("proximity");
    let suppressor = ProximitySuppressor::default();

    for count in [50, 500, 5000] {
        let blobs = random_blobs(count, 1);
        group.bench_with_input(BenchmarkId::from_parameter(count), &blobs, |b, blobs| {
            b.iter(|| {
                let mut blobs = blobs.clone();
                suppressor.suppress(&mut blobs)
            })
        });
    }
    group.finish();
}

fn bridge_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("bridge");
    group.sample_size(20);
    let volume = noisy_volume(2);
    let suppressor = BridgeSuppressor::default();

    for count in [100, 1000] {
        let blobs = random_blobs(count, 3);
        group.bench_with_input(BenchmarkId::from_parameter(count), &blobs, |b, blobs| {
            b.iter(|| {
                let mut blobs = blobs.clone();
                suppressor.suppress(&volume, &mut blobs)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, proximity_benchmarks, bridge_benchmarks);
criterion_main!(benches);
