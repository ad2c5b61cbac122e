//! Criterion benchmarks for loadcheck-rf: training and batch prediction.

use criterion::{Criterion, criterion_group, criterion_main};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use loadcheck_rf::RandomForestConfig;

/// Seven-column rows shaped like the vehicle records.
fn make_vehicle_rows(n_samples: usize, seed: u64) -> (Vec<Vec<f64>>, Vec<usize>, Vec<String>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut features = Vec::with_capacity(n_samples);
    let mut labels = Vec::with_capacity(n_samples);
    for i in 0..n_samples {
        let overloaded = i % 2 == 1;
        let max_load: f64 = rng.gen_range(10.0..15.0);
        let ratio: f64 = if overloaded {
            rng.gen_range(105.0..160.0)
        } else {
            rng.gen_range(13.0..80.0)
        };
        features.push(vec![
            ratio * max_load / 100.0,
            max_load,
            ratio,
            rng.gen_range(20.0..100.0),
            rng.gen_range(20.0..45.0),
            rng.gen_range(3000.0..10000.0),
            rng.gen_range(30.0..120.0),
        ]);
        labels.push(usize::from(overloaded));
    }
    let names = (0..7).map(|f| format!("f{f}")).collect();
    (features, labels, names)
}

fn bench_rf_train(c: &mut Criterion) {
    let (features, labels, names) = make_vehicle_rows(800, 42);
    let cfg = RandomForestConfig::new(100)
        .unwrap()
        .with_max_depth(Some(10));

    c.bench_function("rf_train_800x7_100trees_depth10", |b| {
        b.iter(|| cfg.fit(&features, &labels, &names).unwrap());
    });
}

fn bench_rf_predict_batch(c: &mut Criterion) {
    let (features, labels, names) = make_vehicle_rows(800, 42);
    let forest = RandomForestConfig::new(100)
        .unwrap()
        .with_max_depth(Some(10))
        .fit(&features, &labels, &names)
        .unwrap()
        .into_forest();
    let (queries, _, _) = make_vehicle_rows(200, 7);

    c.bench_function("rf_predict_proba_batch_200x7_100trees", |b| {
        b.iter(|| forest.predict_proba_batch(&queries).unwrap());
    });
}

criterion_group!(benches, bench_rf_train, bench_rf_predict_batch);
criterion_main!(benches);
