use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use slab_relax::prelude::*;

fn bench_sweeps(c: &mut Criterion) {
    let mut group = c.benchmark_group("relaxation");

    for &extent in &[34usize, 66, 130] {
        let partition = SlabPartition::new(extent, 1, 0).unwrap();

        group.bench_with_input(
            BenchmarkId::new("one_color", extent),
            &partition,
            |b, partition| {
                let mut field = SlabField::zeroed(partition);
                init_field(&mut field);
                b.iter(|| sweep_color(&mut field, Color::Even, 0.5));
            },
        );

        group.bench_with_input(
            BenchmarkId::new("full_step", extent),
            &partition,
            |b, partition| {
                let comm = NoComm;
                let config = RelaxConfig {
                    extent,
                    relaxation: 0.5,
                    tolerance: 0.0,
                    max_iterations: 1,
                };
                let solver = Solver::new(&comm, config).unwrap();
                let mut field = SlabField::zeroed(partition);
                init_field(&mut field);
                b.iter(|| solver.step(&mut field).unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_sweeps);
criterion_main!(benches);
