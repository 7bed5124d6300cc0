//! Sample fetching and decoding.
//!
//! Recordings are read from disk once at startup and decoded to stereo `f32`
//! PCM at their native rate. No resampling happens here: the engine
//! compensates for the native/render rate ratio through the playback rate.

use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use hound::{SampleFormat, WavReader};
use tracing::{debug, info};

use crate::{io::assets::AssetDecl, synth::bank::SampleAsset};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read sample {path} for pitch {base_pitch}: {source}")]
    Fetch {
        base_pitch: u8,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode sample {path} for pitch {base_pitch}: {source}")]
    Decode {
        base_pitch: u8,
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    #[error("sample {path} for pitch {base_pitch} contains no audio")]
    Empty { base_pitch: u8, path: PathBuf },

    #[error("render queue full, sample for pitch {base_pitch} was not transferred")]
    QueueFull { base_pitch: u8 },
}

impl LoadError {
    /// Pitch of the asset that failed.
    pub fn base_pitch(&self) -> u8 {
        match self {
            LoadError::Fetch { base_pitch, .. }
            | LoadError::Decode { base_pitch, .. }
            | LoadError::Empty { base_pitch, .. }
            | LoadError::QueueFull { base_pitch } => *base_pitch,
        }
    }
}

/// Fetch and decode one declared asset.
pub fn load_asset(decl: &AssetDecl) -> Result<SampleAsset, LoadError> {
    debug!(path = ?decl.path, base_pitch = decl.base_pitch, "Loading sample");

    let file = File::open(&decl.path).map_err(|source| LoadError::Fetch {
        base_pitch: decl.base_pitch,
        path: decl.path.clone(),
        source,
    })?;
    let asset = decode_wav(BufReader::new(file), decl.base_pitch, &decl.path)?;

    info!(
        path = ?decl.path,
        base_pitch = asset.base_pitch(),
        native_rate = asset.native_rate(),
        frames = asset.frames(),
        memory_kb = asset.memory_size() / 1024,
        "Sample loaded"
    );
    Ok(asset)
}

/// Decode WAV data into a stereo asset.
///
/// Integer formats are scaled to -1.0..1.0. Mono sources are duplicated to
/// both channels; anything past the second channel is ignored. `path` is
/// only used to label errors.
pub fn decode_wav<R: Read>(
    reader: R,
    base_pitch: u8,
    path: &Path,
) -> Result<SampleAsset, LoadError> {
    let decode_err = |source| LoadError::Decode {
        base_pitch,
        path: path.to_path_buf(),
        source,
    };

    let reader = WavReader::new(reader).map_err(decode_err)?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(decode_err)?,
        SampleFormat::Int => {
            let full_scale = (1_i64 << spec.bits_per_sample.saturating_sub(1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / full_scale))
                .collect::<Result<_, _>>()
                .map_err(decode_err)?
        }
    };

    let channels = spec.channels.max(1) as usize;
    let frames = interleaved.len() / channels;
    if frames == 0 {
        return Err(LoadError::Empty {
            base_pitch,
            path: path.to_path_buf(),
        });
    }

    let mut left = Vec::with_capacity(frames);
    let mut right = Vec::with_capacity(frames);
    for frame in interleaved.chunks_exact(channels) {
        left.push(frame[0]);
        right.push(if channels > 1 { frame[1] } else { frame[0] });
    }

    Ok(SampleAsset::stereo(base_pitch, left, right, spec.sample_rate))
}
