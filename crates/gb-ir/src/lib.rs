//! Core data model for the groovebox engine.
//!
//! This crate defines the types shared between the sequencer, the
//! synthesis engine and the persistence layer: notes, instruments,
//! patterns, the arranger timeline and note events. The engine consumes
//! these types; the format crate serializes them.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod event;
mod instrument;
mod note;
mod pattern;
mod sample;
mod settings;
mod song;

pub use event::{NoteEvent, NoteKind};
pub use instrument::{
    EnvelopeDef, FmOperatorDef, Instrument, InstrumentError, LfoDef, LfoTarget, SynthKind,
    SynthSpec, MAX_ENVELOPES, MAX_FM_OPERATORS, MAX_LFOS,
};
pub use note::{pitch_from_parts, pitch_to_frequency, Note, Waveform, MAX_PITCH, NOTES_PER_OCTAVE};
pub use pattern::{Pattern, Step, MAX_PATTERN_STEPS};
pub use sample::{LoopRange, Sample, SampleBank, SampleKey};
pub use settings::{ColourScheme, Rgb, Settings, COLOUR_SLOTS};
pub use song::{Arranger, Song, MAX_PATTERNS, MAX_SONG_ROWS};

/// Number of sequencer channels the engine provisions at startup.
pub const MAX_CHANNELS: usize = 16;

/// Fixed voice-pool capacity per channel. Never resized at runtime.
pub const MAX_VOICES_PER_CHANNEL: usize = 8;
