//! App - device setup, loading and playback

use std::{path::Path, path::PathBuf, thread, time::Duration};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{error, info, warn};

use melody_sampler::{
    control::Performer,
    io::{assets, NoteEvent},
    sampler, EngineConfig,
};

/// Read an engine configuration file, or fall back to defaults.
pub fn load_config(path: Option<&Path>) -> EyreResult<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };

    let contents = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read config {}", path.display()))?;
    let config: EngineConfig = toml::from_str(&contents)
        .wrap_err_with(|| format!("failed to parse config {}", path.display()))?;
    Ok(config)
}

/// Main application builder
pub struct App {
    config: EngineConfig,
    samples: PathBuf,
    bpm: f64,
    strict: bool,
}

impl App {
    pub fn new(config: EngineConfig, samples: PathBuf) -> Self {
        Self {
            config,
            samples,
            bpm: 120.0,
            strict: false,
        }
    }

    /// Set the tempo in beats per minute
    pub fn bpm(mut self, bpm: f64) -> Self {
        self.bpm = bpm;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Open the output device, load the instrument and play `events` once.
    pub fn run(self, events: &[NoteEvent]) -> EyreResult<()> {
        let performer = Performer::new(self.bpm)?;

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let stream_config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = stream_config.sample_rate().0 as f32;
        let channels = stream_config.channels() as usize;

        let config = self.config.with_sample_rate(sample_rate);
        config.validate().wrap_err("invalid engine configuration")?;

        info!(
            device = %device.name().unwrap_or_default(),
            sample_rate,
            channels,
            max_voices = config.max_voices,
            "Audio output ready"
        );

        let (mut control, mut engine) = sampler(&config);

        let stream = device.build_output_stream(
            &stream_config.into(),
            move |data: &mut [f32], _| engine.render_interleaved(data, channels),
            |err| error!(error = %err, "Audio stream error"),
            None,
        )?;
        stream.play()?;

        let report = control.load_sample_set(&assets::piano_set(&self.samples));
        if report.loaded.is_empty() {
            return Err(eyre!("no samples could be loaded from {}", self.samples.display()));
        }
        if !report.is_complete() {
            for failure in &report.failures {
                warn!(error = %failure, "Missing pitch coverage");
            }
            if self.strict {
                return Err(eyre!(
                    "{} of {} samples failed to load",
                    report.failures.len(),
                    report.failures.len() + report.loaded.len()
                ));
            }
        }

        let performance = performer
            .perform(&mut control, events)
            .wrap_err("failed to schedule phrase")?;

        // Wait for the last release tail, then a little extra
        let finish_at = performance.end_time + control.release_time() + 0.25;
        while control.clock_now() < finish_at {
            thread::sleep(Duration::from_millis(50));
        }

        let stats = control.stats();
        info!(
            frames = stats.frame,
            evictions = stats.evictions,
            unmapped = stats.unmapped_drops,
            "Playback finished"
        );
        Ok(())
    }
}
