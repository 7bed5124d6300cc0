//! Benchmarks for the frame-driven ADSR envelope.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use melody_sampler::dsp::Envelope;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn run(env: &mut Envelope, buffer: &mut [f32], elapsed: u64, gate: bool) {
    for (i, out) in buffer.iter_mut().enumerate() {
        *out = env.next_sample(elapsed + i as u64, gate);
    }
}

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack phase (ramping up)
        let mut env = Envelope::adsr(10.0, 0.1, 0.7, 0.3, SAMPLE_RATE);
        env.note_on();
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| run(&mut env, black_box(&mut buffer), black_box(0), true))
        });

        // Sustain phase (holding steady)
        let mut env = Envelope::adsr(0.001, 0.001, 0.7, 0.3, SAMPLE_RATE);
        env.note_on();
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| run(&mut env, black_box(&mut buffer), black_box(1_000), true))
        });

        // Release phase (ramping down). Re-armed every block so it never idles.
        let mut env = Envelope::adsr(0.001, 0.001, 0.7, 60.0, SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| {
                env.note_on();
                env.next_sample(1_000, true);
                run(&mut env, black_box(&mut buffer), 1_001, false);
            })
        });
    }

    group.finish();
}
