//! Engine configuration.
//!
//! Everything here is fixed once the engine is built: envelope shape, timing
//! margins and the polyphony cap are engine constants, never per-note values.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Attack/decay/sustain/release shape shared by every voice.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EnvelopeConfig {
    /// Seconds to ramp 0 → 1.
    pub attack: f32,
    /// Seconds to ramp 1 → sustain.
    pub decay: f32,
    /// Level held until the note's stop frame (0.0 - 1.0).
    pub sustain: f32,
    /// Seconds to ramp from the release-onset level to 0.
    pub release: f32,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            attack: 0.004,
            decay: 0.10,
            sustain: 0.85,
            release: 0.35,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Render rate in frames per second. Overwritten by the host device rate.
    pub sample_rate: f32,
    /// Polyphony cap (`N_max`).
    pub max_voices: usize,
    /// Capacity of the control → render command queue.
    pub message_capacity: usize,
    /// Late notes are pushed to at least this far past the current frame.
    pub safety_time: f32,
    /// Shortest audible hold before release begins.
    pub min_hold_time: f32,
    pub envelope: EnvelopeConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100.0,
            max_voices: 48,
            message_capacity: 1024,
            safety_time: 0.010,
            min_hold_time: 0.080,
            envelope: EnvelopeConfig::default(),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f32),

    #[error("max_voices must be at least 1")]
    NoVoices,

    #[error("message_capacity must be at least 1")]
    NoMessageCapacity,

    #[error("sustain level must be within 0.0..=1.0, got {0}")]
    InvalidSustain(f32),

    #[error("{name} must be finite and non-negative, got {value}")]
    InvalidTime { name: &'static str, value: f32 },
}

impl EngineConfig {
    /// Same configuration at a different render rate (typically the device's).
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate));
        }
        if self.max_voices == 0 {
            return Err(ConfigError::NoVoices);
        }
        if self.message_capacity == 0 {
            return Err(ConfigError::NoMessageCapacity);
        }
        let env = &self.envelope;
        if !(0.0..=1.0).contains(&env.sustain) {
            return Err(ConfigError::InvalidSustain(env.sustain));
        }
        for (name, value) in [
            ("attack", env.attack),
            ("decay", env.decay),
            ("release", env.release),
            ("safety_time", self.safety_time),
            ("min_hold_time", self.min_hold_time),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidTime { name, value });
            }
        }
        Ok(())
    }

    /// Frames a late note is pushed past the current render frame.
    pub fn safety_frames(&self) -> u64 {
        (self.safety_time * self.sample_rate).round() as u64
    }

    /// Minimum gate length in frames, never less than one.
    pub fn min_hold_frames(&self) -> u64 {
        ((self.min_hold_time * self.sample_rate).round() as u64).max(1)
    }

    /// Upper bound on how long a release tail can ring, in frames.
    pub fn release_frames(&self) -> u64 {
        (self.envelope.release * self.sample_rate).ceil() as u64
    }
}
