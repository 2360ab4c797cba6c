//! Low-frequency oscillator runtime.

use gb_ir::LfoDef;

use crate::osc::{waveform_value, wrap_phase};

/// Runtime state of one LFO instance. Free-running; never terminates.
#[derive(Clone, Copy, Debug, Default)]
pub struct LfoState {
    phase: f32,
}

impl LfoState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by `dt` seconds and return the value in [-depth, depth].
    pub fn advance(&mut self, def: &LfoDef, dt: f32) -> f32 {
        self.phase = wrap_phase(self.phase + def.rate * dt);
        waveform_value(def.shape, self.phase) * def.depth
    }
}
