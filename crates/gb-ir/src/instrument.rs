//! Instrument definitions: synthesis kind, parameters, modulation.
//!
//! An `Instrument` is an immutable patch. The render path never reads one
//! directly: a voice copies what it needs at trigger time, so editing an
//! instrument only affects voices allocated afterwards.

use arrayvec::{ArrayString, ArrayVec};

use crate::note::Waveform;
use crate::sample::{SampleBank, SampleKey};

/// Envelope slots per instrument.
pub const MAX_ENVELOPES: usize = 6;

/// LFO slots per instrument.
pub const MAX_LFOS: usize = 8;

/// Operators in an FM chain.
pub const MAX_FM_OPERATORS: usize = 4;

/// Which synthesis algorithm a voice runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SynthKind {
    Oscillator,
    Sample,
    Fm,
    Blep,
}

/// An ADSR envelope definition. Times in seconds, sustain as a level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnvelopeDef {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl EnvelopeDef {
    pub const fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self { attack, decay, sustain, release }
    }
}

impl Default for EnvelopeDef {
    fn default() -> Self {
        Self::adsr(0.01, 0.1, 0.7, 0.3)
    }
}

/// What parameter an LFO modulates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LfoTarget {
    /// Pitch offset in semitones
    #[default]
    Pitch,
    /// Amplitude scaling around unity
    Amplitude,
    /// Stereo position offset
    Pan,
}

/// An LFO definition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LfoDef {
    pub shape: Waveform,
    /// Cycles per second
    pub rate: f32,
    /// Peak deviation in the target's unit
    pub depth: f32,
    pub target: LfoTarget,
}

impl LfoDef {
    pub const fn new(shape: Waveform, rate: f32, depth: f32, target: LfoTarget) -> Self {
        Self { shape, rate, depth, target }
    }
}

/// One operator in a serial FM chain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FmOperatorDef {
    /// Frequency ratio relative to the voice pitch
    pub ratio: f32,
    /// Modulation index applied to this operator's output
    pub index: f32,
}

/// Kind-specific synthesis parameters.
#[derive(Clone, Debug)]
pub enum SynthSpec {
    Oscillator {
        waveform: Waveform,
    },
    Sample {
        sample: SampleKey,
        looped: bool,
    },
    Fm {
        /// Serial chain, modulators first, carrier last
        operators: ArrayVec<FmOperatorDef, MAX_FM_OPERATORS>,
    },
    Blep {
        waveform: Waveform,
    },
}

/// An instrument patch: synthesis spec plus bounded modulation definitions.
#[derive(Clone, Debug)]
pub struct Instrument {
    pub name: ArrayString<26>,
    pub synth: SynthSpec,
    pub envelopes: ArrayVec<EnvelopeDef, MAX_ENVELOPES>,
    pub lfos: ArrayVec<LfoDef, MAX_LFOS>,
}

impl Instrument {
    /// Create an instrument with a single default amplitude envelope.
    pub fn new(name: &str, synth: SynthSpec) -> Self {
        let mut inst = Self {
            name: ArrayString::new(),
            synth,
            envelopes: ArrayVec::new(),
            lfos: ArrayVec::new(),
        };
        let _ = inst.name.try_push_str(name);
        inst.envelopes.push(EnvelopeDef::default());
        inst
    }

    pub fn kind(&self) -> SynthKind {
        match self.synth {
            SynthSpec::Oscillator { .. } => SynthKind::Oscillator,
            SynthSpec::Sample { .. } => SynthKind::Sample,
            SynthSpec::Fm { .. } => SynthKind::Fm,
            SynthSpec::Blep { .. } => SynthKind::Blep,
        }
    }

    /// Validate the patch against the sample bank.
    ///
    /// Configuration errors are rejected here so the render path never has
    /// to handle them (division by a zero sample rate and friends).
    pub fn validate(&self, samples: &SampleBank) -> Result<(), InstrumentError> {
        for env in &self.envelopes {
            if env.attack < 0.0 || env.decay < 0.0 || env.release < 0.0 {
                return Err(InstrumentError::NegativeEnvelopeTime);
            }
            if !(0.0..=1.0).contains(&env.sustain) {
                return Err(InstrumentError::SustainOutOfRange);
            }
        }
        for lfo in &self.lfos {
            if lfo.rate <= 0.0 {
                return Err(InstrumentError::NonPositiveLfoRate);
            }
            if lfo.depth < 0.0 {
                return Err(InstrumentError::NegativeLfoDepth);
            }
        }
        match &self.synth {
            SynthSpec::Sample { sample, .. } => {
                let s = samples.get(*sample).ok_or(InstrumentError::MissingSample)?;
                if s.sample_rate == 0 {
                    return Err(InstrumentError::ZeroSampleRate);
                }
                if let Some(lr) = s.loop_range {
                    if lr.start >= lr.end || lr.end > s.len() {
                        return Err(InstrumentError::InvalidLoopRegion);
                    }
                }
            }
            SynthSpec::Fm { operators } => {
                if operators.is_empty() {
                    return Err(InstrumentError::EmptyFmChain);
                }
                if operators.iter().any(|op| op.ratio <= 0.0) {
                    return Err(InstrumentError::NonPositiveFmRatio);
                }
            }
            SynthSpec::Oscillator { .. } | SynthSpec::Blep { .. } => {}
        }
        Ok(())
    }
}

/// Why an instrument patch was rejected at validation time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstrumentError {
    NegativeEnvelopeTime,
    SustainOutOfRange,
    NonPositiveLfoRate,
    NegativeLfoDepth,
    MissingSample,
    ZeroSampleRate,
    InvalidLoopRegion,
    EmptyFmChain,
    NonPositiveFmRatio,
}
