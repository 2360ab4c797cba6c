//! Voice: one sounding note with latched synthesis and modulation state.
//!
//! A voice copies everything it needs out of the `Instrument` when it is
//! triggered. Later edits to the instrument are only picked up by voices
//! allocated after the edit; sounding voices keep playing the old patch.

use arrayvec::ArrayVec;
use gb_ir::{
    pitch_to_frequency, EnvelopeDef, FmOperatorDef, Instrument, LfoDef, LfoTarget, SampleBank,
    SampleKey, SynthSpec, Waveform, MAX_ENVELOPES, MAX_FM_OPERATORS, MAX_LFOS,
};

use crate::envelope::EnvelopeState;
use crate::lfo::LfoState;
use crate::osc::{blep_saw, blep_square, waveform_value, wrap_phase, TWO_PI};

/// Per-voice synthesis state: latched parameters plus the phase or read
/// position that advances every sample. Enum dispatch keeps the render
/// path free of virtual calls.
#[derive(Clone, Debug)]
pub enum SynthState {
    Osc {
        waveform: Waveform,
        phase: f32,
    },
    Sample {
        key: SampleKey,
        looped: bool,
        position: f32,
    },
    Fm {
        operators: ArrayVec<FmOperatorDef, MAX_FM_OPERATORS>,
        phases: [f32; MAX_FM_OPERATORS],
    },
    Blep {
        waveform: Waveform,
        phase: f32,
        /// Leaky integrator used for the triangle shape.
        integrator: f32,
    },
}

impl SynthState {
    fn from_spec(spec: &SynthSpec) -> Self {
        match spec {
            SynthSpec::Oscillator { waveform } => Self::Osc { waveform: *waveform, phase: 0.0 },
            SynthSpec::Sample { sample, looped } => {
                Self::Sample { key: *sample, looped: *looped, position: 0.0 }
            }
            SynthSpec::Fm { operators } => Self::Fm {
                operators: operators.clone(),
                phases: [0.0; MAX_FM_OPERATORS],
            },
            SynthSpec::Blep { waveform } => {
                Self::Blep { waveform: *waveform, phase: 0.0, integrator: 0.0 }
            }
        }
    }
}

/// A single voice slot. Slots are allocated once and reused; `active`
/// marks whether the slot is currently sounding.
#[derive(Clone, Debug)]
pub struct Voice {
    pub active: bool,
    pub released: bool,
    pub pitch: u8,
    pub velocity: u8,
    /// Frame the voice was triggered on, for oldest-first stealing.
    pub started_at: u64,
    synth: SynthState,
    env_defs: ArrayVec<EnvelopeDef, MAX_ENVELOPES>,
    envs: ArrayVec<EnvelopeState, MAX_ENVELOPES>,
    lfo_defs: ArrayVec<LfoDef, MAX_LFOS>,
    lfos: ArrayVec<LfoState, MAX_LFOS>,
    /// Summed LFO outputs, refreshed by `advance_modulation`.
    pitch_mod: f32,
    amp_mod: f32,
    pan_mod: f32,
}

impl Default for Voice {
    fn default() -> Self {
        Self {
            active: false,
            released: false,
            pitch: 0,
            velocity: 0,
            started_at: 0,
            synth: SynthState::Osc { waveform: Waveform::Sine, phase: 0.0 },
            env_defs: ArrayVec::new(),
            envs: ArrayVec::new(),
            lfo_defs: ArrayVec::new(),
            lfos: ArrayVec::new(),
            pitch_mod: 0.0,
            amp_mod: 0.0,
            pan_mod: 0.0,
        }
    }
}

impl Voice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hard-reset the slot and start a note with the given instrument.
    /// Copies the instrument's synthesis and modulation definitions.
    pub fn trigger(&mut self, instrument: &Instrument, pitch: u8, velocity: u8, timestamp: u64) {
        self.active = true;
        self.released = false;
        self.pitch = pitch;
        self.velocity = velocity;
        self.started_at = timestamp;
        self.synth = SynthState::from_spec(&instrument.synth);
        self.env_defs.clear();
        self.envs.clear();
        for def in &instrument.envelopes {
            self.env_defs.push(*def);
            let mut env = EnvelopeState::new();
            env.trigger();
            self.envs.push(env);
        }
        self.lfo_defs.clear();
        self.lfos.clear();
        for def in &instrument.lfos {
            self.lfo_defs.push(*def);
            self.lfos.push(LfoState::new());
        }
        self.pitch_mod = 0.0;
        self.amp_mod = 0.0;
        self.pan_mod = 0.0;
    }

    /// Start the release ramp on every envelope. Idempotent.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        for (env, def) in self.envs.iter_mut().zip(&self.env_defs) {
            env.release(def);
        }
    }

    /// Whether the slot can be reclaimed. A voice with no envelopes is
    /// done once it has been released.
    pub fn is_finished(&self) -> bool {
        if !self.active {
            return true;
        }
        if self.envs.is_empty() {
            self.released
        } else {
            self.envs.iter().all(EnvelopeState::is_done)
        }
    }

    /// Product of envelope levels, for quietest-first stealing.
    pub fn current_level(&self) -> f32 {
        self.envs.iter().map(EnvelopeState::level).product()
    }

    /// Stereo position in [-1, 1] from the pan LFOs.
    pub fn pan(&self) -> f32 {
        self.pan_mod.clamp(-1.0, 1.0)
    }

    /// Render one output sample in [-1, 1] and advance the synthesis
    /// phase. Call once per output sample, before `advance_modulation`.
    pub fn render_sample(&mut self, bank: &SampleBank, sample_rate: f32) -> f32 {
        if !self.active {
            return 0.0;
        }
        let freq = pitch_to_frequency(self.pitch) * libm::powf(2.0, self.pitch_mod / 12.0);
        let mut ended = false;
        let raw = match &mut self.synth {
            SynthState::Osc { waveform, phase } => {
                let v = waveform_value(*waveform, *phase);
                *phase = wrap_phase(*phase + freq / sample_rate);
                v
            }
            SynthState::Sample { key, looped, position } => match bank.get(*key) {
                Some(sample) => {
                    let v = sample.value_at(*position);
                    let rate = freq / pitch_to_frequency(sample.root_pitch)
                        * (sample.sample_rate as f32 / sample_rate);
                    *position += rate;
                    let loop_range = sample.loop_range.filter(|_| *looped && sample.has_loop());
                    if let Some(lr) = loop_range {
                        if *position >= lr.end as f32 {
                            *position -= (lr.end - lr.start) as f32;
                        }
                    } else if *position >= sample.len() as f32 {
                        ended = true;
                    }
                    v
                }
                None => {
                    ended = true;
                    0.0
                }
            },
            SynthState::Fm { operators, phases } => {
                // Serial chain: each operator phase-modulates the next,
                // carrier last. The carrier's index scales the output.
                let mut signal = 0.0;
                for (op, phase) in operators.iter().zip(phases.iter_mut()) {
                    signal = libm::sinf(TWO_PI * *phase + signal) * op.index;
                    *phase = wrap_phase(*phase + freq * op.ratio / sample_rate);
                }
                signal
            }
            SynthState::Blep { waveform, phase, integrator } => {
                let dt = freq / sample_rate;
                let v = match waveform {
                    Waveform::Sine => libm::sinf(TWO_PI * *phase),
                    Waveform::Saw => blep_saw(*phase, dt),
                    Waveform::Square => blep_square(*phase, dt),
                    Waveform::Triangle => {
                        let sq = blep_square(*phase, dt);
                        *integrator = dt * sq + (1.0 - dt) * *integrator;
                        *integrator
                    }
                };
                *phase = wrap_phase(*phase + dt);
                v
            }
        };
        if ended {
            self.release();
        }
        let amp_scale = (1.0 + self.amp_mod).max(0.0);
        let amp = self.current_level() * (self.velocity as f32 / 127.0) * amp_scale;
        (raw * amp).clamp(-1.0, 1.0)
    }

    /// Advance envelopes and LFOs by `dt` seconds and refresh the cached
    /// modulation sums.
    pub fn advance_modulation(&mut self, dt: f32) {
        if !self.active {
            return;
        }
        for (env, def) in self.envs.iter_mut().zip(&self.env_defs) {
            env.advance(def, dt);
        }
        self.pitch_mod = 0.0;
        self.amp_mod = 0.0;
        self.pan_mod = 0.0;
        for (lfo, def) in self.lfos.iter_mut().zip(&self.lfo_defs) {
            let v = lfo.advance(def, dt);
            match def.target {
                LfoTarget::Pitch => self.pitch_mod += v,
                LfoTarget::Amplitude => self.amp_mod += v,
                LfoTarget::Pan => self.pan_mod += v,
            }
        }
    }
}
