//! Render-synchronised clock.
//!
//! The render side is the only writer: after each block it publishes the
//! absolute frame count and a few counters. The control side reads them to
//! answer "what time is it on the audio clock" and for telemetry. All
//! accesses are single relaxed atomics, so publishing is wait-free.

use std::sync::{
    atomic::{AtomicU64, AtomicUsize, Ordering},
    Arc,
};

#[derive(Debug, Default)]
struct ClockShared {
    frame: AtomicU64,
    active_voices: AtomicUsize,
    evictions: AtomicU64,
    unmapped: AtomicU64,
}

/// Snapshot of the render side's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Frames rendered since the engine started.
    pub frame: u64,
    pub active_voices: usize,
    /// Voices dropped (resident or incoming) to respect the polyphony cap.
    pub evictions: u64,
    /// Notes dropped because their base pitch had no asset.
    pub unmapped_drops: u64,
}

#[derive(Debug, Clone)]
pub struct RenderClock {
    shared: Arc<ClockShared>,
    sample_rate: f32,
}

impl RenderClock {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            shared: Arc::new(ClockShared::default()),
            sample_rate,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Absolute frame at the start of the next block to be rendered.
    pub fn frame(&self) -> u64 {
        self.shared.frame.load(Ordering::Relaxed)
    }

    /// Current render time in seconds.
    pub fn now(&self) -> f64 {
        self.frame() as f64 / self.sample_rate as f64
    }

    pub fn stats(&self) -> RenderStats {
        RenderStats {
            frame: self.frame(),
            active_voices: self.shared.active_voices.load(Ordering::Relaxed),
            evictions: self.shared.evictions.load(Ordering::Relaxed),
            unmapped_drops: self.shared.unmapped.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn publish(&self, frame: u64, active_voices: usize) {
        self.shared.frame.store(frame, Ordering::Relaxed);
        self.shared
            .active_voices
            .store(active_voices, Ordering::Relaxed);
    }

    pub(crate) fn record_eviction(&self) {
        self.shared.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_unmapped(&self) {
        self.shared.unmapped.fetch_add(1, Ordering::Relaxed);
    }
}
