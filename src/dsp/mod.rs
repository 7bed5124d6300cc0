//! Low-level DSP primitives used by the render engine.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! call per frame inside the voice loop.

/// Frame-driven attack/decay/sustain/release envelope.
pub mod envelope;
/// Fractional-position sample reads.
pub mod interpolate;

pub use envelope::{Envelope, EnvelopeState};
