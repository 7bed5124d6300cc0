//! Decoded instrument samples, keyed by base pitch.

/// Number of addressable base pitches (MIDI 0..=127).
pub const PITCH_SLOTS: usize = 128;

/// One recorded note of the instrument, as stereo PCM.
///
/// Immutable once built. Both channels always have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleAsset {
    base_pitch: u8,
    left: Vec<f32>,
    right: Vec<f32>,
    native_rate: u32,
}

impl SampleAsset {
    /// Build from two channels. The longer channel is truncated to match.
    pub fn stereo(base_pitch: u8, mut left: Vec<f32>, mut right: Vec<f32>, native_rate: u32) -> Self {
        let frames = left.len().min(right.len());
        left.truncate(frames);
        right.truncate(frames);
        Self {
            base_pitch,
            left,
            right,
            native_rate,
        }
    }

    /// Build from a single channel, duplicated to both sides.
    pub fn mono(base_pitch: u8, data: Vec<f32>, native_rate: u32) -> Self {
        let right = data.clone();
        Self::stereo(base_pitch, data, right, native_rate)
    }

    pub fn base_pitch(&self) -> u8 {
        self.base_pitch
    }

    pub fn native_rate(&self) -> u32 {
        self.native_rate
    }

    pub fn left(&self) -> &[f32] {
        &self.left
    }

    pub fn right(&self) -> &[f32] {
        &self.right
    }

    pub fn frames(&self) -> usize {
        self.left.len()
    }

    pub fn memory_size(&self) -> usize {
        (self.left.len() + self.right.len()) * std::mem::size_of::<f32>()
    }
}

/// Render-side store of every loaded asset.
///
/// A fixed table of [`PITCH_SLOTS`] entries, allocated once, so inserting a
/// transferred asset and looking one up never allocate.
pub struct SampleBank {
    slots: Vec<Option<Box<SampleAsset>>>,
    loaded: usize,
}

impl SampleBank {
    pub fn new() -> Self {
        Self {
            slots: (0..PITCH_SLOTS).map(|_| None).collect(),
            loaded: 0,
        }
    }

    /// Take ownership of an asset. The first asset for a pitch wins; a
    /// duplicate, or a pitch outside MIDI range, is handed back so the
    /// caller decides where it is freed.
    pub fn insert(&mut self, asset: Box<SampleAsset>) -> Result<(), Box<SampleAsset>> {
        let slot = match self.slots.get_mut(asset.base_pitch as usize) {
            Some(slot) if slot.is_none() => slot,
            _ => return Err(asset),
        };
        *slot = Some(asset);
        self.loaded += 1;
        Ok(())
    }

    pub fn get(&self, base_pitch: u8) -> Option<&SampleAsset> {
        self.slots.get(base_pitch as usize)?.as_deref()
    }

    pub fn contains(&self, base_pitch: u8) -> bool {
        self.get(base_pitch).is_some()
    }

    pub fn len(&self) -> usize {
        self.loaded
    }

    pub fn is_empty(&self) -> bool {
        self.loaded == 0
    }
}

impl Default for SampleBank {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SampleBank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleBank")
            .field("loaded", &self.loaded)
            .finish()
    }
}
