//! Pitch resolution and note planning.
//!
//! Pure control-side logic: given the catalogue of loaded assets, pick the
//! nearest recorded pitch for a request, work out how fast to read it, and
//! clamp every field into the range the render side expects.

use crate::synth::message::NoteOn;

/// A loaded asset as the scheduler sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub base_pitch: u8,
    pub native_rate: u32,
}

/// A note as requested by a caller, not yet normalised.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleRequest {
    pub pitch: i32,
    /// Onset in render-clock seconds.
    pub at_time: f64,
    pub duration: f64,
    pub velocity: f32,
}

/// Playback rate that shifts `base_pitch` to `pitch` and compensates for the
/// asset's native rate differing from the render rate.
pub fn playback_rate(pitch: i32, base_pitch: u8, native_rate: u32, render_rate: f64) -> f64 {
    let semitones = (pitch - base_pitch as i32) as f64;
    2.0_f64.powf(semitones / 12.0) * (native_rate as f64 / render_rate)
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    catalog: Vec<CatalogEntry>,
    render_rate: f64,
}

impl Scheduler {
    pub fn new(render_rate: f32) -> Self {
        Self {
            catalog: Vec::new(),
            render_rate: render_rate as f64,
        }
    }

    /// Add a loaded asset. Registration order is the tie-break order.
    /// Returns false if the pitch was already registered.
    pub fn register(&mut self, entry: CatalogEntry) -> bool {
        if self
            .catalog
            .iter()
            .any(|e| e.base_pitch == entry.base_pitch)
        {
            return false;
        }
        self.catalog.push(entry);
        true
    }

    pub fn catalog(&self) -> &[CatalogEntry] {
        &self.catalog
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    /// Entry with the smallest semitone distance to `pitch`. On a tie the
    /// earliest registered entry wins.
    pub fn nearest(&self, pitch: i32) -> Option<&CatalogEntry> {
        let mut best: Option<(&CatalogEntry, u32)> = None;
        for entry in &self.catalog {
            let distance = pitch.abs_diff(entry.base_pitch as i32);
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((entry, distance)),
            }
        }
        best.map(|(entry, _)| entry)
    }

    /// Resolve a request into a render command. `now` stands in for an
    /// unusable onset time. Returns `None` when nothing is loaded.
    pub fn plan(&self, request: ScheduleRequest, now: f64) -> Option<NoteOn> {
        let pitch = request.pitch.clamp(0, 127);
        let entry = self.nearest(pitch)?;

        let at_time = if request.at_time.is_finite() {
            request.at_time.max(0.0)
        } else {
            now
        };
        let duration = if request.duration.is_finite() {
            request.duration.max(0.0)
        } else {
            0.0
        };
        let velocity = if request.velocity.is_nan() {
            0.0
        } else {
            request.velocity.clamp(0.0, 1.0)
        };

        Some(NoteOn {
            base_pitch: entry.base_pitch,
            rate: playback_rate(pitch, entry.base_pitch, entry.native_rate, self.render_rate),
            at_time,
            duration,
            velocity,
        })
    }
}
