//! melody-sampler - play a phrase through a multisampled instrument
//!
//! Run with: cargo run -- --samples ./samples/piano_mf

mod app;
mod phrase;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(version, about = "Renders note events through a pitch-shifting sampler.")]
struct Cli {
    /// Directory holding one WAV per semitone, named C3.wav .. B4.wav.
    #[clap(long)]
    samples: PathBuf,

    /// Engine configuration (TOML). Defaults are used for missing keys.
    #[clap(long)]
    config: Option<PathBuf>,

    /// Phrase to play (TOML with [[notes]] tables). A built-in phrase otherwise.
    #[clap(long)]
    phrase: Option<PathBuf>,

    /// Tempo in beats per minute.
    #[clap(long, default_value_t = 120.0)]
    bpm: f64,

    /// Stop loading if any sample fails instead of playing with gaps.
    #[clap(long)]
    strict: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = app::load_config(cli.config.as_deref())?;
    let events = match cli.phrase.as_deref() {
        Some(path) => phrase::load(path)?,
        None => phrase::demo(),
    };

    app::App::new(config, cli.samples)
        .bpm(cli.bpm)
        .strict(cli.strict)
        .run(&events)
}
