//! Phrase files - the note events to perform

use std::path::Path;

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use melody_sampler::io::NoteEvent;
use serde::Deserialize;

#[derive(Deserialize)]
struct PhraseFile {
    #[serde(default)]
    notes: Vec<NoteEvent>,
}

pub fn load(path: &Path) -> EyreResult<Vec<NoteEvent>> {
    let contents = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read phrase {}", path.display()))?;
    parse(&contents).wrap_err_with(|| format!("failed to parse phrase {}", path.display()))
}

fn parse(contents: &str) -> Result<Vec<NoteEvent>, toml::de::Error> {
    toml::from_str::<PhraseFile>(contents).map(|file| file.notes)
}

/// A short I-V-I figure in C, with a couple of grace notes.
pub fn demo() -> Vec<NoteEvent> {
    const NOTES: &[(i32, f64, f64, u8)] = &[
        (60, 0.0, 1.0, 110),
        (64, 1.0, 0.5, 85),
        (67, 1.5, 0.5, 85),
        (72, 2.0, 1.0, 115),
        (71, 3.0, 0.125, 70),
        (72, 3.125, 0.375, 85),
        (67, 3.5, 0.5, 85),
        (62, 4.0, 1.0, 110),
        (65, 5.0, 0.5, 85),
        (69, 5.5, 0.5, 85),
        (67, 6.0, 1.0, 110),
        (64, 7.0, 0.5, 85),
        (62, 7.5, 0.5, 85),
        (60, 8.0, 2.0, 115),
        (48, 8.0, 2.0, 90),
    ];

    NOTES
        .iter()
        .map(|&(pitch, start, duration, velocity)| NoteEvent::new(pitch, start, duration, velocity))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_note_tables() {
        let notes = parse(
            r#"
            [[notes]]
            pitch = 60
            start_beat = 0.0
            duration = 1.0
            velocity = 100

            [[notes]]
            pitch = 67
            start_beat = 1.0
            duration = 0.5
            velocity = 80
            "#,
        )
        .unwrap();

        assert_eq!(notes.len(), 2);
        assert_eq!(notes[1], NoteEvent::new(67, 1.0, 0.5, 80));
    }

    #[test]
    fn demo_is_sorted_by_start() {
        let notes = demo();
        assert!(notes.windows(2).all(|w| w[0].start_beat <= w[1].start_beat));
    }
}
