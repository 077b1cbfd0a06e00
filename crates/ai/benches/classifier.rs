use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand::rngs::StdRng;

use restock_ai::{AiJob, ReorderClassifier, ScoringJob};

/// Full training run on the fixed set (200 epochs).
fn bench_training(c: &mut Criterion) {
    let classifier = ReorderClassifier::default();
    c.bench_function("train_fixed_set_200_epochs", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(1);
            black_box(classifier.train(&mut rng).unwrap())
        })
    });
}

/// One prediction pass over a 100-row catalog (sequential single-row inference).
fn bench_scoring(c: &mut Criterion) {
    let model = ReorderClassifier::default()
        .train(&mut StdRng::seed_from_u64(2))
        .unwrap()
        .into_handle();
    let rows: Vec<[f64; 3]> = (0..100)
        .map(|i| [5.0 + (i % 80) as f64, 5.0 + (i % 60) as f64, 1.0 + (i % 10) as f64])
        .collect();

    c.bench_function("score_100_rows", |b| {
        b.iter(|| {
            let job = ScoringJob::new(model.clone(), rows.clone());
            black_box(job.run().unwrap())
        })
    });
}

criterion_group!(benches, bench_training, bench_scoring);
criterion_main!(benches);
