pub mod config;
pub mod control; // Loading, clock and note scheduling (non-realtime side)
pub mod dsp;
pub mod io;
pub mod synth; // Sample bank, voice pool and the render engine

pub use config::{ConfigError, EngineConfig, EnvelopeConfig};
pub use control::{LoadReport, Sampler, ScheduleError, ScheduleRequest};
pub use synth::poly::PolySampler;

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;

/// Build both halves of a sampler from one configuration.
///
/// The [`Sampler`] stays on the control thread; the [`PolySampler`] is moved
/// into the audio callback. They share nothing but a wait-free message queue
/// and the render clock.
pub fn sampler(config: &EngineConfig) -> (Sampler, PolySampler) {
    let (tx, rx) = rtrb::RingBuffer::new(config.message_capacity.max(1));
    let clock = control::clock::RenderClock::new(config.sample_rate);

    let engine = PolySampler::new(config, rx, clock.clone());
    let control = Sampler::new(config, tx, clock);

    (control, engine)
}
