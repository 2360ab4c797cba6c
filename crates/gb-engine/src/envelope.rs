//! ADSR envelope runtime.
//!
//! Stages run Attack -> Decay -> Sustain -> Release -> Done with linear
//! ramps. `trigger` restarts the attack from the current level rather than
//! zero, so a retrigger mid-ramp never produces a discontinuity.

use gb_ir::EnvelopeDef;

/// Envelope lifecycle stage. `Done` is terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnvelopeStage {
    Attack,
    Decay,
    Sustain,
    Release,
    #[default]
    Done,
}

/// Runtime state of one envelope instance.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvelopeState {
    stage: EnvelopeStage,
    level: f32,
    /// Level units per second during release, fixed at release time so the
    /// ramp always reaches zero within the definition's release time.
    release_rate: f32,
}

impl EnvelopeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    /// Current output level in [0, 1].
    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn is_done(&self) -> bool {
        self.stage == EnvelopeStage::Done
    }

    /// Start (or restart) the attack from the current level.
    pub fn trigger(&mut self) {
        self.stage = EnvelopeStage::Attack;
    }

    /// Enter the release stage from wherever the envelope currently is.
    pub fn release(&mut self, def: &EnvelopeDef) {
        if self.level <= 0.0 || def.release <= 0.0 {
            self.level = 0.0;
            self.stage = EnvelopeStage::Done;
            return;
        }
        self.release_rate = self.level / def.release;
        self.stage = EnvelopeStage::Release;
    }

    /// Advance by `dt` seconds and return the new level.
    pub fn advance(&mut self, def: &EnvelopeDef, dt: f32) -> f32 {
        match self.stage {
            EnvelopeStage::Attack => {
                if def.attack <= 0.0 {
                    self.level = 1.0;
                } else {
                    self.level += dt / def.attack;
                }
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = EnvelopeStage::Decay;
                }
            }
            EnvelopeStage::Decay => {
                if def.decay <= 0.0 {
                    self.level = def.sustain;
                } else {
                    self.level -= dt * (1.0 - def.sustain) / def.decay;
                }
                if self.level <= def.sustain {
                    self.level = def.sustain;
                    self.stage = EnvelopeStage::Sustain;
                }
            }
            EnvelopeStage::Sustain => {
                self.level = def.sustain;
            }
            EnvelopeStage::Release => {
                self.level -= dt * self.release_rate;
                if self.level <= 0.0 {
                    self.level = 0.0;
                    self.stage = EnvelopeStage::Done;
                }
            }
            EnvelopeStage::Done => {
                self.level = 0.0;
            }
        }
        self.level
    }
}
