use crate::{config::EnvelopeConfig, MIN_TIME};

/*
Sampler ADSR Envelope
=====================

A linear ADSR whose attack/decay/sustain stage is a pure function of how many
frames have elapsed since the voice's start frame, and whose release is a
per-frame countdown from wherever the level happened to be.

Vocabulary
----------

  elapsed     Frames since the voice's start frame. Drives Attack/Decay/Sustain.

  gate        High while the current frame is before the voice's stop frame.
              The first frame with the gate low starts Release.

  level       Envelope output (0.0 to 1.0), multiplied with the sample.


The Shape
---------

  Level
    1.0 ┐  ╱╲
        │ ╱  ╲___________
    S   │╱               ╲
        │                 ╲
    0.0 └──────────────────╲──→ Frames
         A   D   Sustain    R
                       ↑
                   stop frame

While the gate is high:

    elapsed < A           level = elapsed / A
    elapsed < A + D       level = 1 + (S - 1) * (elapsed - A) / D
    otherwise             level = S

Once the gate drops:

    level -= 1 / (R * sample_rate)        every frame, until level <= 0

Release starts from the CURRENT level, not from S. A note whose stop frame
lands inside Attack or Decay releases from that partial level, so the ramp is
never reset upward and there is no click.

Release is terminal: once entered, the gate is ignored and the envelope can
only fall to Idle.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,    // Finished or never triggered, level = 0
    Attack,  // Ramping up to 1.0
    Decay,   // Ramping down to sustain level
    Sustain, // Holding at sustain level until the gate drops
    Release, // Gate dropped, counting down to 0
}

#[derive(Debug, Clone)]
pub struct Envelope {
    attack_frames: f64,
    decay_frames: f64,
    sustain_level: f32,
    release_step: f32, // level lost per frame during release

    stage: EnvelopeState,
    level: f32,
}

impl Envelope {
    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32, sample_rate: f32) -> Self {
        let rate = sample_rate as f64;
        Self {
            attack_frames: attack.max(MIN_TIME) as f64 * rate,
            decay_frames: decay.max(MIN_TIME) as f64 * rate,
            sustain_level: sustain.clamp(0.0, 1.0),
            release_step: 1.0 / (release.max(MIN_TIME) * sample_rate),

            stage: EnvelopeState::Idle,
            level: 0.0,
        }
    }

    pub fn from_config(config: &EnvelopeConfig, sample_rate: f32) -> Self {
        Self::adsr(
            config.attack,
            config.decay,
            config.sustain,
            config.release,
            sample_rate,
        )
    }

    /// Arm the envelope for a fresh voice.
    pub fn note_on(&mut self) {
        self.level = 0.0;
        self.stage = EnvelopeState::Attack;
    }

    /// Advance by one frame and return the level for that frame.
    pub fn next_sample(&mut self, elapsed: u64, gate: bool) -> f32 {
        match self.stage {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }

            EnvelopeState::Release => self.step_release(),

            EnvelopeState::Attack | EnvelopeState::Decay | EnvelopeState::Sustain if !gate => {
                self.stage = EnvelopeState::Release;
                self.step_release();
            }

            EnvelopeState::Attack | EnvelopeState::Decay | EnvelopeState::Sustain => {
                let t = elapsed as f64;
                if t < self.attack_frames {
                    self.stage = EnvelopeState::Attack;
                    self.level = (t / self.attack_frames) as f32;
                } else if t < self.attack_frames + self.decay_frames {
                    self.stage = EnvelopeState::Decay;
                    let progress = ((t - self.attack_frames) / self.decay_frames) as f32;
                    self.level = 1.0 + (self.sustain_level - 1.0) * progress;
                } else {
                    self.stage = EnvelopeState::Sustain;
                    self.level = self.sustain_level;
                }
                self.level = self.level.clamp(0.0, 1.0);
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    fn step_release(&mut self) {
        self.level -= self.release_step;
        if self.level <= 0.0 {
            self.level = 0.0;
            self.stage = EnvelopeState::Idle;
        }
    }

    /// Returns true while the envelope can still produce output.
    pub fn is_active(&self) -> bool {
        !matches!(self.stage, EnvelopeState::Idle)
    }

    pub fn reset(&mut self) {
        self.stage = EnvelopeState::Idle;
        self.level = 0.0;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn state(&self) -> EnvelopeState {
        self.stage
    }
}
