//! Real-time synthesis and sequencing engine for groovebox.
//!
//! Drives the arranger and patterns from the audio clock, allocates voices
//! from fixed per-channel pools and renders them with one of four synthesis
//! algorithms. Nothing on the render path allocates, blocks or does I/O.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod engine;
mod envelope;
mod frame;
mod lfo;
mod osc;
mod transport;
mod voice;
mod voice_pool;

pub use engine::Engine;
pub use envelope::{EnvelopeStage, EnvelopeState};
pub use frame::Frame;
pub use lfo::LfoState;
pub use osc::{poly_blep, waveform_value};
pub use transport::{EventBuffer, StopMode, Transport, TransportState};
pub use voice::{SynthState, Voice};
pub use voice_pool::{StealPolicy, VoiceHandle, VoiceManager};
