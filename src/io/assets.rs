/*
Asset Declarations
==================

The instrument is a fixed enumeration of recordings, one file per semitone,
named after the note it contains:

  C3.wav  Db3.wav  D3.wav  Eb3.wav ... B4.wav

Note naming follows the MIDI convention used throughout the crate:

    note_number = 12 * (octave + 1) + semitone

so middle C (C4) is 60 and the default piano set C3..B4 covers 48..=71.
Accidentals are spelled as flats, matching the sample library's file names.
*/

use std::{
    ops::RangeInclusive,
    path::{Path, PathBuf},
};

const NOTE_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Lowest and highest pitch of the default piano sample set.
pub const PIANO_RANGE: RangeInclusive<u8> = 48..=71;

/// One recording the loader should fetch, tagged with its pitch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDecl {
    pub base_pitch: u8,
    pub path: PathBuf,
}

impl AssetDecl {
    pub fn new(base_pitch: u8, path: impl Into<PathBuf>) -> Self {
        Self {
            base_pitch,
            path: path.into(),
        }
    }
}

/// Note name for a MIDI pitch, e.g. 60 → "C4", 70 → "Bb4".
pub fn note_name(pitch: u8) -> String {
    let octave = (pitch / 12) as i32 - 1;
    format!("{}{}", NOTE_NAMES[(pitch % 12) as usize], octave)
}

/// One `<note name>.<extension>` file per semitone in `pitches`, in
/// ascending pitch order.
pub fn chromatic_set(dir: &Path, pitches: RangeInclusive<u8>, extension: &str) -> Vec<AssetDecl> {
    pitches
        .map(|pitch| {
            let file = format!("{}.{}", note_name(pitch), extension);
            AssetDecl::new(pitch, dir.join(file))
        })
        .collect()
}

/// The 24-file piano set (C3..B4) stored as WAV under `dir`.
pub fn piano_set(dir: &Path) -> Vec<AssetDecl> {
    chromatic_set(dir, PIANO_RANGE, "wav")
}
