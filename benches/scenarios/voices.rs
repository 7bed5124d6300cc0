//! Benchmarks for `render_block` with many concurrent voices.
//!
//! Each batch gets a fresh engine with its voices already admitted, so the
//! timed part is pure mixing.

use std::hint::black_box;

use criterion::{BatchSize, BenchmarkId, Criterion};
use melody_sampler::{sampler, synth::bank::SampleAsset, EngineConfig, PolySampler, ScheduleRequest};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

/// Every voice gets a distinct pitch so most of them read at a fractional rate.
fn engine(asset: &SampleAsset, voices: usize) -> PolySampler {
    let config = EngineConfig::default().with_sample_rate(SAMPLE_RATE);
    let (mut control, mut engine) = sampler(&config);
    control.load_assets([asset.clone()]);

    for i in 0..voices {
        let _ = control.schedule_note(ScheduleRequest {
            pitch: 48 + (i % 24) as i32,
            at_time: 0.0,
            duration: 10.0,
            velocity: 0.8,
        });
    }

    // Drain the queue and step past the safety margin.
    let mut left = vec![0.0; 1_024];
    let mut right = vec![0.0; 1_024];
    engine.render_block(&mut left, &mut right);
    engine
}

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");
    let source: Vec<f32> = (0..SAMPLE_RATE as usize * 4)
        .map(|i| (i as f32 * 0.05).sin() * 0.5)
        .collect();
    let asset = SampleAsset::mono(60, source, 44_100);

    for &size in BLOCK_SIZES {
        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        for voices in [1, 8, 48] {
            let id = BenchmarkId::new(format!("{voices}_voices"), size);
            group.bench_with_input(id, &size, |b, _| {
                b.iter_batched_ref(
                    || engine(&asset, voices),
                    |engine| engine.render_block(black_box(&mut left), black_box(&mut right)),
                    BatchSize::LargeInput,
                )
            });
        }

        // Overflow: twice the cap scheduled, half evicted on admission
        group.bench_with_input(BenchmarkId::new("admit_overflow", size), &size, |b, _| {
            b.iter_batched(
                || {
                    let config = EngineConfig::default().with_sample_rate(SAMPLE_RATE);
                    let (mut control, engine) = sampler(&config);
                    control.load_assets([asset.clone()]);
                    for i in 0..config.max_voices * 2 {
                        let _ = control.schedule_note(ScheduleRequest {
                            pitch: 60,
                            at_time: i as f64 * 0.001,
                            duration: 1.0,
                            velocity: 1.0,
                        });
                    }
                    (control, engine)
                },
                |(_control, mut engine)| {
                    engine.render_block(black_box(&mut left), black_box(&mut right));
                },
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}
