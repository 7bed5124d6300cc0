use crate::{
    dsp::{interpolate, Envelope},
    synth::bank::SampleAsset,
};

/// One sounding instance of a sample, from onset through release.
///
/// The asset itself lives in the bank; a voice only remembers which base
/// pitch it reads from.
#[derive(Debug, Clone)]
pub struct Voice {
    base_pitch: u8,
    /// Fractional read position in source frames. Never decreases.
    position: f64,
    rate: f64,
    start_frame: u64,
    stop_frame: u64,
    velocity: f32,
    envelope: Envelope,
    /// Admission order, breaks ties between equal start frames.
    sequence: u64,
    finished: bool,
}

impl Voice {
    pub fn new(
        base_pitch: u8,
        rate: f64,
        start_frame: u64,
        stop_frame: u64,
        velocity: f32,
        mut envelope: Envelope,
        sequence: u64,
    ) -> Self {
        envelope.note_on();
        Self {
            base_pitch,
            position: 0.0,
            rate,
            start_frame,
            stop_frame: stop_frame.max(start_frame),
            velocity,
            envelope,
            sequence,
            finished: false,
        }
    }

    /// Mix this voice into a block that begins at absolute frame `block_start`.
    ///
    /// Frames render in increasing order. The voice finishes on the first
    /// frame where its envelope has fully released or the read position has
    /// run past the sample data; that frame and everything after it is left
    /// untouched.
    pub fn render(
        &mut self,
        asset: &SampleAsset,
        block_start: u64,
        left: &mut [f32],
        right: &mut [f32],
    ) {
        if self.finished {
            return;
        }
        if !self.rate.is_finite() {
            self.finish();
            return;
        }

        let frames = left.len().min(right.len());
        let block_end = block_start + frames as u64;
        if self.start_frame >= block_end {
            return;
        }

        let begin = self.start_frame.saturating_sub(block_start) as usize;
        for i in begin..frames {
            let frame = block_start + i as u64;
            let level = self
                .envelope
                .next_sample(frame - self.start_frame, frame < self.stop_frame);
            if !self.envelope.is_active() {
                self.finish();
                return;
            }

            let Some((l, r)) =
                interpolate::linear_stereo(asset.left(), asset.right(), self.position)
            else {
                self.finish();
                return;
            };

            let amp = self.velocity * level;
            left[i] += l * amp;
            right[i] += r * amp;

            self.position += self.rate;
        }
    }

    /// Silence this voice; the pool reclaims it after the current block.
    pub fn finish(&mut self) {
        self.finished = true;
        self.envelope.reset();
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn base_pitch(&self) -> u8 {
        self.base_pitch
    }

    pub fn start_frame(&self) -> u64 {
        self.start_frame
    }

    pub fn stop_frame(&self) -> u64 {
        self.stop_frame
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn envelope_level(&self) -> f32 {
        self.envelope.level()
    }

    /// Eviction key: smaller is older.
    pub(crate) fn age_key(&self) -> (u64, u64) {
        (self.start_frame, self.sequence)
    }
}
