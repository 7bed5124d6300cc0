//! Benchmarks for low-level DSP primitives.

mod envelope;
mod interpolate;

pub use envelope::bench_envelope;
pub use interpolate::bench_interpolate;
