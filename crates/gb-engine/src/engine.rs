//! Engine: the single context object tying the pieces together.

use arrayvec::ArrayVec;
use gb_ir::{
    FmOperatorDef, Instrument, SampleBank, Settings, Song, SynthKind, SynthSpec, Waveform,
};

use crate::frame::Frame;
use crate::transport::{EventBuffer, StopMode, Transport};
use crate::voice_pool::VoiceManager;

/// The whole playback engine: settings, song, sample bank, voice pools and
/// the transport. Created once at startup; there are no globals.
pub struct Engine {
    pub settings: Settings,
    pub song: Song,
    pub samples: SampleBank,
    pub voices: VoiceManager,
    pub transport: Transport,
    sample_rate: u32,
}

impl Engine {
    /// Build an engine from startup settings. Every voice slot the engine
    /// will ever use is allocated here.
    pub fn new(settings: Settings, sample_rate: u32) -> Self {
        let channels = settings.enabled_channels as usize;
        let mut voices = VoiceManager::new(channels, settings.default_voice_count as usize);
        for (ch, kind) in settings.channel_kinds.iter().enumerate().take(channels) {
            voices.set_instrument(ch, default_patch(*kind));
        }
        let mut song = Song::new(channels);
        song.arranger.bpm = settings.default_bpm;
        Self {
            settings,
            song,
            samples: SampleBank::with_key(),
            voices,
            transport: Transport::new(sample_rate),
            sample_rate,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn play(&mut self) {
        self.transport.play(&self.song);
    }

    pub fn stop(&mut self, mode: StopMode) {
        self.transport.stop(mode, &mut self.voices);
    }

    pub fn pause(&mut self) {
        self.transport.pause();
    }

    /// Jump all channels to an arranger row, flushing note-offs first.
    pub fn seek(&mut self, row: usize) {
        let mut events = EventBuffer::new();
        self.transport.seek(&self.song, row, &mut events);
        for event in &events {
            self.voices.handle_event(event);
        }
    }

    /// Fill a stereo buffer. Runs the sequencer clock, dispatches events
    /// at step boundaries and mixes every channel. Never allocates.
    pub fn render(&mut self, out: &mut [Frame]) {
        let sr = self.sample_rate as f32;
        for frame in out.iter_mut() {
            let mut events = EventBuffer::new();
            self.transport.tick(&self.song, &mut events);
            for event in &events {
                self.voices.handle_event(event);
            }
            *frame = self.voices.mix_all(&self.samples, sr).clamped();
        }
    }
}

/// Default patch for a channel's configured synth kind. Sample channels
/// start on a plain oscillator until a sample is assigned.
fn default_patch(kind: SynthKind) -> Instrument {
    let spec = match kind {
        SynthKind::Oscillator | SynthKind::Sample => SynthSpec::Oscillator { waveform: Waveform::Saw },
        SynthKind::Blep => SynthSpec::Blep { waveform: Waveform::Saw },
        SynthKind::Fm => {
            let mut operators = ArrayVec::new();
            operators.push(FmOperatorDef { ratio: 2.0, index: 1.0 });
            operators.push(FmOperatorDef { ratio: 1.0, index: 1.0 });
            SynthSpec::Fm { operators }
        }
    };
    Instrument::new("init", spec)
}
