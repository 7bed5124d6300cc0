//! Real-world scenario benchmarks.
//!
//! These drive the engine through its public API with loaded samples and a
//! populated voice pool, the way the audio callback sees it.

mod voices;

pub use voices::bench_voices;
