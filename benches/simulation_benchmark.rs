//! Simulation throughput benchmark — measure full `ProductionLine::run`
//! cost for increasing station counts.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use conwip_sim::ProductionLine;

fn bench_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("production_line_run");
    group.sample_size(30);

    for &n_stations in &[1usize, 2, 4, 8, 16] {
        let means = vec![1.0; n_stations];
        let cvs = vec![0.5; n_stations];

        group.bench_with_input(
            BenchmarkId::new("stations", n_stations),
            &n_stations,
            |b, &_n| {
                b.iter(|| {
                    let mut line = ProductionLine::with_seed(
                        n_stations,
                        20,
                        &means,
                        &cvs,
                        n_stations as f64 * 0.5,
                        1.0,
                        Some(1),
                    )
                    .unwrap();
                    line.run(5_000.0, 100.0)
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_run);
criterion_main!(benches);
