use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stackwise::{
    DenoisingSampler, GreedyDenoisingAutoencoder, PipelineConfig, Pretrainer, SimpleStackedEncoder,
};
use std::time::Duration;

const SEED: u64 = 42;

fn two_clusters() -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
    let data = vec![
        vec![0.0, 0.0, 1.0, 1.0],
        vec![0.0, 0.0, 1.0, 0.9],
        vec![0.0, 0.0, 0.9, 0.9],
        vec![0.8, 1.0, 0.0, 0.0],
        vec![1.0, 1.0, 0.1, 0.0],
        vec![1.0, 0.9, 0.0, 0.2],
    ];
    let targets = vec![vec![0.0], vec![0.0], vec![0.0], vec![1.0], vec![1.0], vec![1.0]];
    (data, targets)
}

fn random_data(samples: usize, width: usize) -> Vec<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(SEED);
    (0..samples)
        .map(|_| (0..width).map(|_| rng.gen::<f64>()).collect())
        .collect()
}

// ============================================================================
// Benchmark: Denoising Sampler
// ============================================================================

fn bench_sampler(c: &mut Criterion) {
    let mut group = c.benchmark_group("denoising_sampler");
    let sampler = DenoisingSampler::default();

    for width in [16, 64, 256, 1024].iter() {
        let data = random_data(100, *width);
        group.throughput(Throughput::Elements((100 * width) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(width), width, |b, _| {
            let mut rng = StdRng::seed_from_u64(SEED);
            b.iter(|| black_box(sampler.corrupt(&data, &mut rng).unwrap()));
        });
    }
    group.finish();
}

// ============================================================================
// Benchmark: Full Fit (two-cluster scenario)
// ============================================================================

fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(20);

    let (data, targets) = two_clusters();
    let config = PipelineConfig::from_names(vec![4, 2, 1], "Tanh", "Tanh", 50, true, true, true)
        .unwrap()
        .with_seed(SEED);

    group.bench_function("greedy_denoising_autoencoder", |b| {
        let mut dae =
            GreedyDenoisingAutoencoder::new(data.clone(), targets.clone(), config.clone()).unwrap();
        b.iter(|| black_box(dae.fit().unwrap()));
    });

    group.bench_function("simple_stacked_encoder", |b| {
        let mut sse = SimpleStackedEncoder::new(
            data.clone(),
            targets.clone(),
            config.clone().with_dropout(false),
        )
        .unwrap();
        b.iter(|| black_box(sse.fit().unwrap()));
    });

    group.finish();
}

// ============================================================================
// Benchmark: Depth Scaling
// ============================================================================

fn bench_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit_depth");
    group.sample_size(10);

    let data = random_data(32, 16);
    let targets: Vec<Vec<f64>> = data.iter().map(|d| vec![d[0]]).collect();

    for depth in [1usize, 2, 4].iter() {
        let mut layers = vec![16];
        layers.extend((0..*depth).map(|i| 12 - 2 * i));
        layers.push(1);
        let config = PipelineConfig::from_names(layers, "Sigmoid", "Sigmoid", 10, true, true, false)
            .unwrap()
            .with_seed(SEED);

        group.throughput(Throughput::Elements(*depth as u64));
        group.bench_with_input(BenchmarkId::from_parameter(depth), depth, |b, _| {
            let mut dae =
                GreedyDenoisingAutoencoder::new(data.clone(), targets.clone(), config.clone())
                    .unwrap();
            b.iter(|| black_box(dae.fit().unwrap()));
        });
    }
    group.finish();
}

// ============================================================================
// Benchmark: Prediction
// ============================================================================

fn bench_predict(c: &mut Criterion) {
    let (data, targets) = two_clusters();
    let config = PipelineConfig::from_names(vec![4, 3, 2, 1], "Sigmoid", "Sigmoid", 20, true, true, false)
        .unwrap()
        .with_seed(SEED);
    let mut dae = GreedyDenoisingAutoencoder::new(data.clone(), targets, config).unwrap();
    let assembled = dae.fit().unwrap();

    let mut group = c.benchmark_group("predict");
    group.bench_function("prediction_path", |b| {
        b.iter(|| black_box(dae.predict(black_box(&data[0])).unwrap()));
    });
    group.bench_function("assembled_network", |b| {
        b.iter(|| black_box(assembled.activate(black_box(&data[0])).unwrap()));
    });
    group.finish();
}

criterion_group!(benches, bench_sampler, bench_fit, bench_depth, bench_predict);
criterion_main!(benches);
