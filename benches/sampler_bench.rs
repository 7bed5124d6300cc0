//! Benchmarks for sampler primitives and full render blocks.
//!
//! Run with: cargo bench
//!
//! Everything measured here runs inside the audio callback, so it has to
//! finish well within the block deadline.
//!
//! Reference timing at 48kHz sample rate:
//!   - 64 samples  = 1.33ms deadline
//!   - 128 samples = 2.67ms deadline
//!   - 256 samples = 5.33ms deadline
//!   - 512 samples = 10.67ms deadline
//!
//! Benchmark groups:
//!   - dsp/*        Envelope and interpolation per block
//!   - scenarios/*  `render_block` with a populated voice pool

use criterion::{criterion_group, criterion_main};

mod dsp;
mod scenarios;

/// Common buffer sizes used in audio applications.
pub const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

pub const SAMPLE_RATE: f32 = 48_000.0;

criterion_group!(
    benches,
    dsp::bench_envelope,
    dsp::bench_interpolate,
    scenarios::bench_voices,
);
criterion_main!(benches);
