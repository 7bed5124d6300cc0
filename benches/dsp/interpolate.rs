//! Benchmarks for fractional-position sample reads.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use melody_sampler::dsp::interpolate;

use crate::BLOCK_SIZES;

pub fn bench_interpolate(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/interpolate");

    let left: Vec<f32> = (0..48_000).map(|i| (i as f32 * 0.01).sin()).collect();
    let right: Vec<f32> = left.iter().map(|s| -s).collect();

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for (name, rate) in [("unity", 1.0), ("pitched", 1.498_307)] {
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    let mut position = 0.0_f64;
                    for out in buffer.iter_mut() {
                        if let Some((l, r)) =
                            interpolate::linear_stereo(&left, &right, black_box(position))
                        {
                            *out = l + r;
                        }
                        position += rate;
                    }
                })
            });
        }
    }

    group.finish();
}
