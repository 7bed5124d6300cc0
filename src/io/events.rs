//! Inbound note events from the composition side.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A note in musical time, as produced by the melody generator.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NoteEvent {
    pub pitch: i32,
    pub start_beat: f64,
    /// Length in beats.
    pub duration: f64,
    /// MIDI-style velocity, 0..=127.
    pub velocity: u8,
}

impl NoteEvent {
    pub fn new(pitch: i32, start_beat: f64, duration: f64, velocity: u8) -> Self {
        Self {
            pitch,
            start_beat,
            duration,
            velocity,
        }
    }

    /// Velocity mapped to 0.0..=1.0.
    pub fn velocity_unit(&self) -> f32 {
        self.velocity.min(127) as f32 / 127.0
    }

    pub fn end_beat(&self) -> f64 {
        self.start_beat + self.duration.max(0.0)
    }
}

/// Beat at which the last event of a phrase ends.
pub fn phrase_length(events: &[NoteEvent]) -> f64 {
    events.iter().map(NoteEvent::end_beat).fold(0.0, f64::max)
}
