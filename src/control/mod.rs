//! Control side of the sampler.
//!
//! [`Sampler`] owns the producer end of the command queue. It loads the
//! instrument once, answers clock queries, and turns note requests into
//! `NoteOn` commands. None of its methods ever wait on the render thread.

pub mod clock;
pub mod performer;
pub mod scheduler;

use rtrb::{Producer, PushError};
use tracing::{debug, info, warn};

use crate::{
    config::EngineConfig,
    io::{
        assets::AssetDecl,
        loader::{self, LoadError},
    },
    synth::{
        bank::SampleAsset,
        message::{NoteOn, SamplerMessage},
    },
};

use self::{
    clock::{RenderClock, RenderStats},
    scheduler::{CatalogEntry, Scheduler},
};

pub use self::{
    performer::{PerformError, PerformReport, Performance, Performer},
    scheduler::ScheduleRequest,
};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("no samples have been loaded")]
    NotInitialized,

    #[error("render queue full, note dropped")]
    QueueFull,
}

/// Result of one `load_sample_set` call.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Base pitches transferred to the engine, in load order.
    pub loaded: Vec<u8>,
    /// Base pitches declared more than once; only the first was kept.
    pub skipped: Vec<u8>,
    pub failures: Vec<LoadError>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct Sampler {
    tx: Producer<SamplerMessage>,
    clock: RenderClock,
    scheduler: Scheduler,
    release_time: f64,
    initialized: bool,
}

impl Sampler {
    pub(crate) fn new(config: &EngineConfig, tx: Producer<SamplerMessage>, clock: RenderClock) -> Self {
        Self {
            tx,
            clock,
            scheduler: Scheduler::new(config.sample_rate),
            release_time: config.envelope.release as f64,
            initialized: false,
        }
    }

    /// Fetch, decode and transfer every declared asset.
    ///
    /// Failures are collected per asset; the caller decides whether partial
    /// pitch coverage is acceptable. Once a call has loaded anything, later
    /// calls do nothing.
    pub fn load_sample_set(&mut self, assets: &[AssetDecl]) -> LoadReport {
        if self.initialized {
            debug!("Sample set already loaded, ignoring");
            return LoadReport::default();
        }

        info!(assets = assets.len(), "Loading sample set");
        let decoded = assets.iter().map(loader::load_asset);
        let report = self.transfer(decoded);

        info!(
            loaded = report.loaded.len(),
            skipped = report.skipped.len(),
            failed = report.failures.len(),
            "Sample set loaded"
        );
        report
    }

    /// Transfer assets that were decoded elsewhere. Follows the same
    /// once-only rule as [`load_sample_set`](Self::load_sample_set).
    pub fn load_assets(&mut self, assets: impl IntoIterator<Item = SampleAsset>) -> LoadReport {
        if self.initialized {
            debug!("Sample set already loaded, ignoring");
            return LoadReport::default();
        }
        self.transfer(assets.into_iter().map(Ok))
    }

    fn transfer(
        &mut self,
        assets: impl Iterator<Item = Result<SampleAsset, LoadError>>,
    ) -> LoadReport {
        let mut report = LoadReport::default();

        for result in assets {
            let asset = match result {
                Ok(asset) => asset,
                Err(e) => {
                    warn!(error = %e, "Failed to load sample");
                    report.failures.push(e);
                    continue;
                }
            };

            let entry = CatalogEntry {
                base_pitch: asset.base_pitch(),
                native_rate: asset.native_rate(),
            };
            if self
                .scheduler
                .catalog()
                .iter()
                .any(|e| e.base_pitch == entry.base_pitch)
            {
                warn!(base_pitch = entry.base_pitch, "Duplicate sample, skipping");
                report.skipped.push(entry.base_pitch);
                continue;
            }

            match self.tx.push(SamplerMessage::LoadSample(Box::new(asset))) {
                Ok(()) => {
                    self.scheduler.register(entry);
                    report.loaded.push(entry.base_pitch);
                }
                Err(PushError::Full(_)) => {
                    let e = LoadError::QueueFull {
                        base_pitch: entry.base_pitch,
                    };
                    warn!(error = %e, "Failed to transfer sample");
                    report.failures.push(e);
                }
            }
        }

        if !report.loaded.is_empty() {
            self.initialized = true;
        }
        report
    }

    /// Current render time in seconds.
    pub fn clock_now(&self) -> f64 {
        self.clock.now()
    }

    /// Resolve and post one note. Never blocks.
    pub fn schedule_note(&mut self, request: ScheduleRequest) -> Result<NoteOn, ScheduleError> {
        let note = self
            .scheduler
            .plan(request, self.clock_now())
            .ok_or(ScheduleError::NotInitialized)?;

        match self.tx.push(SamplerMessage::NoteOn(note)) {
            Ok(()) => {
                debug!(
                    pitch = request.pitch,
                    base_pitch = note.base_pitch,
                    rate = note.rate,
                    at_time = note.at_time,
                    "Note scheduled"
                );
                Ok(note)
            }
            Err(PushError::Full(_)) => {
                warn!(pitch = request.pitch, "Render queue full, note dropped");
                Err(ScheduleError::QueueFull)
            }
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn clock(&self) -> &RenderClock {
        &self.clock
    }

    pub fn stats(&self) -> RenderStats {
        self.clock.stats()
    }

    /// Longest a released note keeps sounding, in seconds.
    pub fn release_time(&self) -> f64 {
        self.release_time
    }

    /// Commands that can still be queued without dropping.
    pub fn queue_slots(&self) -> usize {
        self.tx.slots()
    }
}

impl std::fmt::Debug for Sampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sampler")
            .field("catalog", &self.scheduler.catalog().len())
            .field("initialized", &self.initialized)
            .field("now", &self.clock_now())
            .finish()
    }
}
