//! Training throughput benchmark.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

use sparselin::testing::{interleaved_blobs, BlobSpec};
use sparselin::training::{LogisticRegression, Parameter, Penalty, Verbosity};

fn bench_training(c: &mut Criterion) {
    let spec = BlobSpec {
        n_per_class: 250,
        n_features: 20,
        ..Default::default()
    };

    let mut group = c.benchmark_group("train");
    for (name, penalty) in [("l2_lbfgs", Penalty::L2), ("l1_lbfgs", Penalty::L1)] {
        group.bench_function(name, |b| {
            b.iter_batched(
                || interleaved_blobs(spec, 17),
                |mut dataset| {
                    let params = Parameter {
                        penalty,
                        max_epoch: 50,
                        verbosity: Verbosity::Silent,
                        ..Default::default()
                    };
                    let mut lr = LogisticRegression::new();
                    lr.train(&mut dataset, &params).unwrap();
                    lr.export_model()
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_training);
criterion_main!(benches);
