use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use filterbench::prelude::*;
use strum::IntoEnumIterator;

const SIZES: [u32; 2] = [256, 1024];

fn quiet() -> Status {
    Status::new(|_: &str| {})
}

fn reference_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("reference");
    group.sample_size(10);

    for size in SIZES {
        let input = Image::new_random(size, size, 7).unwrap();
        let mut output = input.new_like();

        for kind in FilterKind::iter() {
            let mut filter = Filter::with_status(kind, quiet());
            group.bench_with_input(BenchmarkId::new(kind.name(), size), &size, |b, _| {
                b.iter(|| {
                    filter.invalidate_reference();
                    filter.run_reference(black_box(&input), &mut output).unwrap();
                })
            });
        }
    }

    group.finish();
}

fn native_cpu_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("native_cpu");
    let params = ExecutionParams::default().verify(false).iterations(1);

    for size in SIZES {
        let input = Image::new_random(size, size, 7).unwrap();
        let mut output = input.new_like();

        for kind in FilterKind::iter() {
            let mut filter = Filter::with_status(kind, quiet());
            group.bench_with_input(BenchmarkId::new(kind.name(), size), &size, |b, _| {
                b.iter(|| {
                    filter
                        .run_native_cpu(black_box(&input), &mut output, &params)
                        .unwrap()
                })
            });
        }
    }

    group.finish();
}

criterion_group!(benches, reference_benchmarks, native_cpu_benchmarks);
criterion_main!(benches);
