use rtrb::Consumer;

use crate::{
    config::EngineConfig,
    control::clock::RenderClock,
    dsp::Envelope,
    synth::{
        bank::SampleBank,
        message::{MessageReceiver, NoteOn, SamplerMessage},
        pool::{Admission, VoicePool},
        voice::Voice,
    },
    MAX_BLOCK_SIZE,
};

/// The render-side voice engine.
///
/// Owns the sample bank and the voice pool. Each call to [`render_block`]
/// drains pending control messages, then mixes every voice that overlaps the
/// block into a stereo output. Nothing on this path allocates, blocks, logs
/// or returns an error; a voice that cannot render goes silent on its own.
///
/// [`render_block`]: PolySampler::render_block
pub struct PolySampler<R: MessageReceiver = Consumer<SamplerMessage>> {
    bank: SampleBank,
    pool: VoicePool,
    rx: R,
    clock: RenderClock,
    sample_rate: f64,
    safety_frames: u64,
    min_hold_frames: u64,
    envelope: Envelope,
    frame_counter: u64,
    scratch_left: Vec<f32>,
    scratch_right: Vec<f32>,
}

impl<R: MessageReceiver> PolySampler<R> {
    pub fn new(config: &EngineConfig, rx: R, clock: RenderClock) -> Self {
        Self {
            bank: SampleBank::new(),
            pool: VoicePool::with_capacity(config.max_voices),
            rx,
            clock,
            sample_rate: config.sample_rate as f64,
            safety_frames: config.safety_frames(),
            min_hold_frames: config.min_hold_frames(),
            envelope: Envelope::from_config(&config.envelope, config.sample_rate),
            frame_counter: 0,
            scratch_left: vec![0.0; MAX_BLOCK_SIZE],
            scratch_right: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    /// Render `min(left.len(), right.len())` frames, overwriting the output.
    pub fn render_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        let frames = left.len().min(right.len());
        let left = &mut left[..frames];
        let right = &mut right[..frames];
        left.fill(0.0);
        right.fill(0.0);

        self.drain_messages();

        // Mix voices in slot order
        let block_start = self.frame_counter;
        let bank = &self.bank;
        for voice in self.pool.iter_mut() {
            match bank.get(voice.base_pitch()) {
                Some(asset) => voice.render(asset, block_start, left, right),
                None => voice.finish(),
            }
        }
        self.pool.sweep();

        self.frame_counter += frames as u64;
        self.clock.publish(self.frame_counter, self.pool.len());
    }

    /// Render into a host-interleaved buffer of `channels` channels.
    ///
    /// Channel 0 gets left, channel 1 right, and any further channel (or a
    /// mono host) the average of both.
    pub fn render_interleaved(&mut self, data: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        let total_frames = data.len() / channels;

        // Scratch buffers are swapped out for the loop so `render_block` can
        // borrow `self` mutably.
        let mut left = std::mem::take(&mut self.scratch_left);
        let mut right = std::mem::take(&mut self.scratch_right);
        let chunk = left.len().min(right.len()).max(1);

        let mut frames_written = 0;
        while frames_written < total_frames {
            let frames_to_render = (total_frames - frames_written).min(chunk);
            let block_left = &mut left[..frames_to_render];
            let block_right = &mut right[..frames_to_render];
            self.render_block(block_left, block_right);

            let out_off = frames_written * channels;
            for (i, (&l, &r)) in block_left.iter().zip(block_right.iter()).enumerate() {
                let frame = &mut data[out_off + i * channels..out_off + (i + 1) * channels];
                match frame {
                    [mono] => *mono = 0.5 * (l + r),
                    [first, second, rest @ ..] => {
                        *first = l;
                        *second = r;
                        rest.fill(0.5 * (l + r));
                    }
                    [] => {}
                }
            }

            frames_written += frames_to_render;
        }

        // Trailing samples that do not make up a whole frame stay silent.
        data[total_frames * channels..].fill(0.0);

        self.scratch_left = left;
        self.scratch_right = right;
    }

    fn drain_messages(&mut self) {
        while let Some(msg) = self.rx.pop() {
            match msg {
                SamplerMessage::LoadSample(asset) => {
                    // No deallocation on the audio thread. The control side
                    // filters duplicates, so this only leaks if it is bypassed.
                    if let Err(rejected) = self.bank.insert(asset) {
                        std::mem::forget(rejected);
                    }
                }
                SamplerMessage::NoteOn(note) => self.note_on(note),
            }
        }
    }

    fn note_on(&mut self, note: NoteOn) {
        if !self.bank.contains(note.base_pitch) {
            self.clock.record_unmapped();
            return;
        }

        // Float → int casts saturate, so garbage times land at 0 or far away.
        let desired_start = (note.at_time * self.sample_rate).round() as u64;
        let earliest_start = self.frame_counter.saturating_add(self.safety_frames);
        let start_frame = desired_start.max(earliest_start);

        let hold_frames = ((note.duration * self.sample_rate).round() as u64)
            .max(self.min_hold_frames);
        let stop_frame = start_frame.saturating_add(hold_frames);

        let sequence = self.pool.next_sequence();
        let voice = Voice::new(
            note.base_pitch,
            note.rate,
            start_frame,
            stop_frame,
            note.velocity.clamp(0.0, 1.0),
            self.envelope.clone(),
            sequence,
        );

        match self.pool.insert(voice) {
            Admission::Inserted => {}
            Admission::Evicted => self.clock.record_eviction(),
        }
    }

    /// Absolute frame at which the next block starts.
    pub fn current_frame(&self) -> u64 {
        self.frame_counter
    }

    pub fn active_voices(&self) -> usize {
        self.pool.len()
    }

    pub fn voices(&self) -> impl Iterator<Item = &Voice> {
        self.pool.iter()
    }

    pub fn bank(&self) -> &SampleBank {
        &self.bank
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }
}

impl<R: MessageReceiver> std::fmt::Debug for PolySampler<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolySampler")
            .field("bank", &self.bank)
            .field("pool", &self.pool)
            .field("frame", &self.frame_counter)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::synth::bank::SampleAsset;

    impl MessageReceiver for VecDeque<SamplerMessage> {
        fn pop(&mut self) -> Option<SamplerMessage> {
            self.pop_front()
        }
    }

    const SAMPLE_RATE: f32 = 1_000.0;

    fn config() -> EngineConfig {
        let mut config = EngineConfig::default().with_sample_rate(SAMPLE_RATE);
        config.max_voices = 4;
        config
    }

    fn engine(config: &EngineConfig) -> PolySampler<VecDeque<SamplerMessage>> {
        let mut queue = VecDeque::new();
        queue.push_back(SamplerMessage::LoadSample(Box::new(SampleAsset::mono(
            60,
            vec![0.5; 4_000],
            1_000,
        ))));
        PolySampler::new(config, queue, RenderClock::new(config.sample_rate))
    }

    fn note(at_time: f64, duration: f64) -> NoteOn {
        NoteOn {
            base_pitch: 60,
            rate: 1.0,
            at_time,
            duration,
            velocity: 1.0,
        }
    }

    fn render(engine: &mut PolySampler<VecDeque<SamplerMessage>>, frames: usize) -> Vec<f32> {
        let mut left = vec![0.0; frames];
        let mut right = vec![0.0; frames];
        engine.render_block(&mut left, &mut right);
        left
    }

    #[test]
    fn silent_without_notes() {
        let config = config();
        let mut engine = engine(&config);
        let out = render(&mut engine, 256);
        assert!(out.iter().all(|s| *s == 0.0));
        assert_eq!(engine.bank().len(), 1);
        assert_eq!(engine.current_frame(), 256);
    }

    #[test]
    fn late_note_is_clamped_forward() {
        let config = config();
        let mut engine = engine(&config);
        render(&mut engine, 100);

        engine.rx.push_back(SamplerMessage::NoteOn(note(0.0, 1.0)));
        render(&mut engine, 1);

        let voice = engine.voices().next().expect("voice admitted");
        assert_eq!(voice.start_frame(), 100 + config.safety_frames());
    }

    #[test]
    fn short_note_holds_for_minimum() {
        let config = config();
        let mut engine = engine(&config);
        engine.rx.push_back(SamplerMessage::NoteOn(note(1.0, 0.001)));
        render(&mut engine, 1);

        let voice = engine.voices().next().expect("voice admitted");
        assert_eq!(voice.start_frame(), 1_000);
        assert_eq!(voice.stop_frame() - voice.start_frame(), config.min_hold_frames());
    }

    #[test]
    fn unmapped_pitch_is_dropped_quietly() {
        let config = config();
        let clock = RenderClock::new(config.sample_rate);
        let mut queue = VecDeque::new();
        queue.push_back(SamplerMessage::NoteOn(NoteOn {
            base_pitch: 72,
            ..note(0.0, 1.0)
        }));
        let mut engine = PolySampler::new(&config, queue, clock.clone());

        let out = render(&mut engine, 64);
        assert!(out.iter().all(|s| *s == 0.0));
        assert_eq!(engine.active_voices(), 0);
        assert_eq!(clock.stats().unmapped_drops, 1);
    }

    #[test]
    fn polyphony_cap_evicts_oldest() {
        let config = config();
        let clock = RenderClock::new(config.sample_rate);
        let mut queue = VecDeque::new();
        queue.push_back(SamplerMessage::LoadSample(Box::new(SampleAsset::mono(
            60,
            vec![0.5; 100],
            1_000,
        ))));
        for i in 0..6 {
            queue.push_back(SamplerMessage::NoteOn(note(1.0 + i as f64 * 0.01, 0.5)));
        }
        let mut engine = PolySampler::new(&config, queue, clock.clone());
        render(&mut engine, 16);

        let mut starts: Vec<u64> = engine.voices().map(Voice::start_frame).collect();
        starts.sort_unstable();
        assert_eq!(starts, vec![1_020, 1_030, 1_040, 1_050]);
        assert_eq!(clock.stats().evictions, 2);
        assert_eq!(clock.stats().active_voices, 4);
    }

    #[test]
    fn late_note_displaces_future_voice_when_full() {
        let config = config();
        let clock = RenderClock::new(config.sample_rate);
        let mut queue = VecDeque::new();
        queue.push_back(SamplerMessage::LoadSample(Box::new(SampleAsset::mono(
            60,
            vec![0.5; 4_000],
            1_000,
        ))));
        for i in 0..4 {
            queue.push_back(SamplerMessage::NoteOn(note(2.0 + i as f64, 0.5)));
        }
        // Overdue by the time it arrives, so it clamps ahead of every resident.
        queue.push_back(SamplerMessage::NoteOn(note(0.0, 0.5)));
        let mut engine = PolySampler::new(&config, queue, clock.clone());
        render(&mut engine, 16);

        let mut starts: Vec<u64> = engine.voices().map(Voice::start_frame).collect();
        starts.sort_unstable();
        assert_eq!(starts, vec![config.safety_frames(), 3_000, 4_000, 5_000]);
        assert_eq!(clock.stats().evictions, 1);

        let out = render(&mut engine, 64);
        assert!(out.iter().any(|s| *s > 0.0));
    }

    #[test]
    fn duplicate_load_keeps_first_asset() {
        let config = config();
        let mut engine = engine(&config);
        engine.rx.push_back(SamplerMessage::LoadSample(Box::new(SampleAsset::mono(
            60,
            vec![0.25; 10],
            1_000,
        ))));
        render(&mut engine, 1);

        assert_eq!(engine.bank().len(), 1);
        assert_eq!(engine.bank().get(60).map(|a| a.frames()), Some(4_000));
    }

    #[test]
    fn corrupted_voice_does_not_silence_others() {
        let config = config();
        let mut engine = engine(&config);
        engine.rx.push_back(SamplerMessage::NoteOn(NoteOn {
            rate: f64::INFINITY,
            ..note(0.0, 1.0)
        }));
        engine.rx.push_back(SamplerMessage::NoteOn(note(0.0, 1.0)));

        let out = render(&mut engine, 128);
        assert!(out.iter().any(|s| *s > 0.0));
        assert!(out.iter().all(|s| s.is_finite()));
        assert_eq!(engine.active_voices(), 1);
    }

    #[test]
    fn interleaved_output_spreads_channels() {
        let config = config();
        let mut engine = engine(&config);
        engine.rx.push_back(SamplerMessage::NoteOn(note(0.0, 1.0)));

        let mut data = vec![1.0; 3 * 64 + 1];
        engine.render_interleaved(&mut data, 3);

        for frame in data[..3 * 64].chunks_exact(3) {
            assert_eq!(frame[0], frame[1]);
            assert_eq!(frame[2], frame[0]);
        }
        assert!(data.iter().any(|s| *s > 0.0));
        assert_eq!(data[3 * 64], 0.0);
        assert_eq!(engine.current_frame(), 64);
    }
}
