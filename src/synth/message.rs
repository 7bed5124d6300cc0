use rtrb::Consumer;

use crate::synth::bank::SampleAsset;

/// A fully resolved note, ready for the render side.
///
/// Everything here has already been normalised by the scheduler: the base
/// pitch names a loaded asset, `rate` folds in the native/render rate ratio,
/// and `velocity` is within 0.0..=1.0.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NoteOn {
    pub base_pitch: u8,
    pub rate: f64,
    /// Onset in render-clock seconds.
    pub at_time: f64,
    /// Gate length in seconds.
    pub duration: f64,
    pub velocity: f32,
}

/// Commands flowing control → render. There is no reverse direction.
#[derive(Debug)]
pub enum SamplerMessage {
    /// Hands ownership of a decoded asset to the engine's bank.
    LoadSample(Box<SampleAsset>),
    NoteOn(NoteOn),
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SamplerMessage>;
}

impl MessageReceiver for Consumer<SamplerMessage> {
    fn pop(&mut self) -> Option<SamplerMessage> {
        Consumer::pop(self).ok()
    }
}
