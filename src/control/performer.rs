//! Performer - streams a phrase of beat-timed notes to the sampler
//!
//! Converts musical time (beats at a tempo) into render-clock seconds and
//! posts each note only once it falls inside the lookahead window. Notes
//! further out stay here, so voices that have not started yet never crowd
//! the polyphony cap. The phrase is anchored one lookahead after "now" so
//! the first notes are not already late when they arrive.

use std::{thread, time::Duration};

use tracing::{debug, info};

use crate::{
    control::{Sampler, ScheduleError, ScheduleRequest},
    io::events::{phrase_length, NoteEvent},
};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PerformError {
    #[error("tempo must be a positive number of beats per minute, got {0}")]
    InvalidTempo(f64),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformReport {
    pub scheduled: usize,
    pub dropped: usize,
    /// Render time the phrase was anchored to (beat 0 minus lookahead).
    pub origin: f64,
    /// Render time at which the last note's gate closes.
    pub end_time: f64,
}

#[derive(Debug, Clone)]
pub struct Performer {
    bpm: f64,
    lookahead: f64,
    yield_every: usize,
}

impl Performer {
    pub fn new(bpm: f64) -> Result<Self, PerformError> {
        if !(bpm.is_finite() && bpm > 0.0) {
            return Err(PerformError::InvalidTempo(bpm));
        }
        Ok(Self {
            bpm,
            lookahead: 0.1,
            yield_every: 16,
        })
    }

    /// Seconds between "now" and beat 0, and how far ahead of the render
    /// clock notes are posted.
    pub fn with_lookahead(mut self, lookahead: f64) -> Self {
        self.lookahead = if lookahead.is_finite() { lookahead.max(0.0) } else { 0.0 };
        self
    }

    /// Give up the thread after this many notes. Zero never yields.
    pub fn with_yield_every(mut self, notes: usize) -> Self {
        self.yield_every = notes;
        self
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn lookahead(&self) -> f64 {
        self.lookahead
    }

    pub fn seconds_per_beat(&self) -> f64 {
        60.0 / self.bpm
    }

    /// Render-clock request for one event of a phrase anchored at `origin`.
    pub fn to_request(&self, event: &NoteEvent, origin: f64) -> ScheduleRequest {
        let spb = self.seconds_per_beat();
        ScheduleRequest {
            pitch: event.pitch,
            at_time: origin + self.lookahead + event.start_beat * spb,
            duration: event.duration * spb,
            velocity: event.velocity_unit(),
        }
    }

    /// Anchor `events` at the sampler's current time. Nothing is posted
    /// until [`Performance::pump`] is called.
    pub fn start(&self, sampler: &Sampler, events: &[NoteEvent]) -> Performance {
        let origin = sampler.clock_now();
        let mut pending: Vec<ScheduleRequest> =
            events.iter().map(|e| self.to_request(e, origin)).collect();
        pending.sort_by(|a, b| a.at_time.total_cmp(&b.at_time));

        info!(
            notes = events.len(),
            bpm = self.bpm,
            origin,
            "Performing phrase"
        );

        Performance {
            pending,
            next: 0,
            lookahead: self.lookahead,
            yield_every: self.yield_every,
            report: PerformReport {
                scheduled: 0,
                dropped: 0,
                origin,
                end_time: origin
                    + self.lookahead
                    + phrase_length(events) * self.seconds_per_beat(),
            },
        }
    }

    /// Stream every event to the sampler, blocking until the last one has
    /// been posted. Needs the render side running to advance the clock.
    pub fn perform(
        &self,
        sampler: &mut Sampler,
        events: &[NoteEvent],
    ) -> Result<PerformReport, PerformError> {
        let mut performance = self.start(sampler, events);
        let poll = Duration::from_secs_f64((self.lookahead / 4.0).clamp(0.001, 0.025));

        while !performance.is_finished() {
            performance.pump(sampler)?;
            if !performance.is_finished() {
                thread::sleep(poll);
            }
        }
        Ok(performance.report())
    }
}

impl Default for Performer {
    fn default() -> Self {
        Self {
            bpm: 120.0,
            lookahead: 0.1,
            yield_every: 16,
        }
    }
}

/// A phrase in flight, ordered by onset time.
#[derive(Debug, Clone)]
pub struct Performance {
    pending: Vec<ScheduleRequest>,
    next: usize,
    lookahead: f64,
    yield_every: usize,
    report: PerformReport,
}

impl Performance {
    /// Post every note whose onset is within the lookahead of the render
    /// clock. Returns how many were posted this pass.
    ///
    /// Stops early only if nothing has been loaded; a full queue drops the
    /// note and carries on.
    pub fn pump(&mut self, sampler: &mut Sampler) -> Result<usize, ScheduleError> {
        let horizon = sampler.clock_now() + self.lookahead;
        let mut posted = 0;

        while let Some(&request) = self.pending.get(self.next) {
            // Unusable onsets sort last and are posted as soon as reached.
            if request.at_time > horizon {
                break;
            }
            match sampler.schedule_note(request) {
                Ok(_) => self.report.scheduled += 1,
                Err(ScheduleError::QueueFull) => self.report.dropped += 1,
                Err(e @ ScheduleError::NotInitialized) => return Err(e),
            }
            self.next += 1;
            posted += 1;

            // Let the audio thread drain the queue between bursts
            if self.yield_every > 0 && posted % self.yield_every == 0 {
                thread::yield_now();
            }
        }

        if self.is_finished() && posted > 0 {
            debug!(
                scheduled = self.report.scheduled,
                dropped = self.report.dropped,
                end_time = self.report.end_time,
                "Phrase scheduled"
            );
        }
        Ok(posted)
    }

    pub fn is_finished(&self) -> bool {
        self.next >= self.pending.len()
    }

    /// Notes not yet posted.
    pub fn remaining(&self) -> usize {
        self.pending.len() - self.next
    }

    /// Onset of the next note to be posted.
    pub fn next_onset(&self) -> Option<f64> {
        self.pending.get(self.next).map(|r| r.at_time)
    }

    pub fn report(&self) -> PerformReport {
        self.report
    }
}
