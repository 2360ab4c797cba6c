//! VoiceManager: fixed per-channel voice pools with stealing.
//!
//! All slots are allocated once at engine start and never resized. The
//! allocate/release/mix paths touch no heap and never fail: running out of
//! free slots invokes the stealing policy instead.

use alloc::vec::Vec;
use gb_ir::{
    Instrument, NoteEvent, NoteKind, SampleBank, SynthSpec, Waveform, MAX_CHANNELS,
    MAX_VOICES_PER_CHANNEL,
};

use crate::frame::Frame;
use crate::voice::Voice;

/// Identifier for a voice slot within a channel.
pub type VoiceHandle = usize;

/// Which voice to evict when a channel's pool is full.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StealPolicy {
    /// Evict the longest-sounding voice.
    #[default]
    Oldest,
    /// Evict the voice with the lowest envelope level.
    Quietest,
}

struct ChannelPool {
    voices: Vec<Voice>,
    instrument: Instrument,
}

/// Owns every voice slot and the per-channel instrument definitions.
pub struct VoiceManager {
    channels: Vec<ChannelPool>,
    pub steal_policy: StealPolicy,
}

impl VoiceManager {
    /// Allocate `channel_count` pools of `voices_per_channel` slots each.
    /// Both are clamped to the engine maxima. This is the only allocation
    /// the manager ever performs.
    pub fn new(channel_count: usize, voices_per_channel: usize) -> Self {
        let channel_count = channel_count.min(MAX_CHANNELS);
        let voices_per_channel = voices_per_channel.clamp(1, MAX_VOICES_PER_CHANNEL);
        let default_patch =
            Instrument::new("init", SynthSpec::Oscillator { waveform: Waveform::Saw });
        let channels = (0..channel_count)
            .map(|_| ChannelPool {
                voices: (0..voices_per_channel).map(|_| Voice::new()).collect(),
                instrument: default_patch.clone(),
            })
            .collect();
        Self { channels, steal_policy: StealPolicy::default() }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Replace a channel's instrument. Control path only; sounding voices
    /// keep their latched copy of the old patch.
    pub fn set_instrument(&mut self, channel: usize, instrument: Instrument) {
        if let Some(pool) = self.channels.get_mut(channel) {
            pool.instrument = instrument;
        }
    }

    pub fn instrument(&self, channel: usize) -> Option<&Instrument> {
        self.channels.get(channel).map(|p| &p.instrument)
    }

    /// Number of currently sounding voices on a channel.
    pub fn active_voices(&self, channel: usize) -> usize {
        self.channels
            .get(channel)
            .map(|p| p.voices.iter().filter(|v| v.active).count())
            .unwrap_or(0)
    }

    /// Start a note. Always succeeds: an already-sounding voice at the
    /// same pitch is released first, then a free slot is taken, else the
    /// stealing policy picks a victim to hard-reset.
    pub fn allocate(
        &mut self,
        channel: usize,
        pitch: u8,
        velocity: u8,
        timestamp: u64,
    ) -> VoiceHandle {
        let policy = self.steal_policy;
        let Some(pool) = self.channels.get_mut(channel) else {
            return 0;
        };
        for voice in pool.voices.iter_mut() {
            if voice.active && !voice.released && voice.pitch == pitch {
                voice.release();
            }
        }
        let slot = pool
            .voices
            .iter()
            .position(|v| !v.active)
            .unwrap_or_else(|| steal_candidate(&pool.voices, policy));
        pool.voices[slot].trigger(&pool.instrument, pitch, velocity, timestamp);
        slot
    }

    /// Release the sounding voice at (channel, pitch). Silent no-op when
    /// no such voice exists.
    pub fn release(&mut self, channel: usize, pitch: u8) {
        if let Some(pool) = self.channels.get_mut(channel) {
            for voice in pool.voices.iter_mut() {
                if voice.active && !voice.released && voice.pitch == pitch {
                    voice.release();
                }
            }
        }
    }

    /// Release every sounding voice on every channel.
    pub fn release_all(&mut self) {
        for pool in &mut self.channels {
            for voice in pool.voices.iter_mut() {
                if voice.active {
                    voice.release();
                }
            }
        }
    }

    /// Silence everything immediately, skipping release ramps.
    pub fn kill_all(&mut self) {
        for pool in &mut self.channels {
            for voice in pool.voices.iter_mut() {
                voice.active = false;
            }
        }
    }

    /// Apply one sequencer event.
    pub fn handle_event(&mut self, event: &NoteEvent) {
        match event.kind {
            NoteKind::On => {
                self.allocate(event.channel as usize, event.pitch, event.velocity, event.frame);
            }
            NoteKind::Off => self.release(event.channel as usize, event.pitch),
        }
    }

    /// Render and sum one frame from every active voice on a channel,
    /// advancing modulation and reclaiming finished voices.
    pub fn mix_channel(&mut self, channel: usize, bank: &SampleBank, sample_rate: f32) -> Frame {
        let mut out = Frame::silence();
        let dt = 1.0 / sample_rate;
        let Some(pool) = self.channels.get_mut(channel) else {
            return out;
        };
        for voice in pool.voices.iter_mut() {
            if !voice.active {
                continue;
            }
            let value = voice.render_sample(bank, sample_rate);
            voice.advance_modulation(dt);
            let pan = voice.pan();
            out.left += value * (1.0 - pan).min(1.0);
            out.right += value * (1.0 + pan).min(1.0);
            if voice.is_finished() {
                voice.active = false;
            }
        }
        out
    }

    /// Render one summed frame across all channels.
    pub fn mix_all(&mut self, bank: &SampleBank, sample_rate: f32) -> Frame {
        let mut out = Frame::silence();
        for channel in 0..self.channels.len() {
            out.mix(self.mix_channel(channel, bank, sample_rate));
        }
        out
    }
}

/// Pick the slot to steal. Ties break toward the lowest slot index, which
/// `min_by` gives us since it keeps the first minimum.
fn steal_candidate(voices: &[Voice], policy: StealPolicy) -> usize {
    let chosen = match policy {
        StealPolicy::Oldest => voices
            .iter()
            .enumerate()
            .min_by_key(|(_, v)| v.started_at),
        StealPolicy::Quietest => voices
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.current_level()
                    .partial_cmp(&b.current_level())
                    .unwrap_or(core::cmp::Ordering::Equal)
            }),
    };
    chosen.map(|(i, _)| i).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gb_ir::EnvelopeDef;

    const SR: f32 = 44_100.0;

    fn manager(voices: usize) -> VoiceManager {
        let mut mgr = VoiceManager::new(2, voices);
        let mut inst = Instrument::new("test", SynthSpec::Oscillator { waveform: Waveform::Saw });
        inst.envelopes[0] = EnvelopeDef::adsr(0.001, 0.001, 1.0, 0.005);
        mgr.set_instrument(0, inst.clone());
        mgr.set_instrument(1, inst);
        mgr
    }

    fn run_frames(mgr: &mut VoiceManager, bank: &SampleBank, n: usize) {
        for _ in 0..n {
            mgr.mix_all(bank, SR);
        }
    }

    #[test]
    fn allocate_uses_free_slots() {
        let mut mgr = manager(4);
        mgr.allocate(0, 40, 100, 0);
        mgr.allocate(0, 41, 100, 1);
        mgr.allocate(0, 42, 100, 2);
        assert_eq!(mgr.active_voices(0), 3);
    }

    #[test]
    fn capacity_never_exceeded() {
        let mut mgr = manager(4);
        for i in 0..20 {
            mgr.allocate(0, 30 + i, 100, i as u64);
        }
        assert_eq!(mgr.active_voices(0), 4);
    }

    #[test]
    fn oldest_is_stolen_first() {
        let mut mgr = manager(2);
        let first = mgr.allocate(0, 40, 100, 0);
        mgr.allocate(0, 41, 100, 10);
        let stolen = mgr.allocate(0, 42, 100, 20);
        assert_eq!(stolen, first);
    }

    #[test]
    fn steal_ties_break_to_lowest_slot() {
        let mut mgr = manager(3);
        mgr.allocate(0, 40, 100, 5);
        mgr.allocate(0, 41, 100, 5);
        mgr.allocate(0, 42, 100, 5);
        let stolen = mgr.allocate(0, 43, 100, 6);
        assert_eq!(stolen, 0);
    }

    #[test]
    fn quietest_is_stolen_first() {
        let bank = SampleBank::with_key();
        let mut mgr = manager(2);
        mgr.steal_policy = StealPolicy::Quietest;
        mgr.allocate(0, 40, 100, 0);
        let released = mgr.allocate(0, 41, 100, 1);
        run_frames(&mut mgr, &bank, 100);
        mgr.release(0, 41);
        run_frames(&mut mgr, &bank, 100); // envelope 41 ramps down
        let stolen = mgr.allocate(0, 42, 100, 2);
        assert_eq!(stolen, released);
    }

    #[test]
    fn single_voice_channel_steals_in_place() {
        let mut mgr = manager(1);
        mgr.allocate(0, 40, 100, 0);
        let slot = mgr.allocate(0, 45, 100, 1);
        assert_eq!(slot, 0);
        assert_eq!(mgr.active_voices(0), 1);
        // the surviving voice plays the second pitch
        assert!(mgr.channels[0].voices[0].pitch == 45);
    }

    #[test]
    fn same_pitch_reallocation_releases_old_voice() {
        let mut mgr = manager(4);
        mgr.allocate(0, 40, 100, 0);
        mgr.allocate(0, 40, 100, 100);
        let releasing = mgr.channels[0]
            .voices
            .iter()
            .filter(|v| v.active && v.released)
            .count();
        assert_eq!(releasing, 1);
        assert_eq!(mgr.active_voices(0), 2);
    }

    #[test]
    fn release_unknown_pitch_is_noop() {
        let mut mgr = manager(4);
        mgr.allocate(0, 40, 100, 0);
        mgr.release(0, 99);
        mgr.release(1, 40);
        assert_eq!(mgr.active_voices(0), 1);
        assert!(!mgr.channels[0].voices[0].released);
    }

    #[test]
    fn finished_voices_are_reclaimed() {
        let bank = SampleBank::with_key();
        let mut mgr = manager(2);
        mgr.allocate(0, 40, 100, 0);
        mgr.release(0, 40);
        run_frames(&mut mgr, &bank, 1000);
        assert_eq!(mgr.active_voices(0), 0);
    }

    #[test]
    fn kill_all_silences_immediately() {
        let bank = SampleBank::with_key();
        let mut mgr = manager(4);
        mgr.allocate(0, 40, 100, 0);
        mgr.allocate(1, 50, 100, 0);
        mgr.kill_all();
        assert_eq!(mgr.active_voices(0), 0);
        assert_eq!(mgr.active_voices(1), 0);
        let frame = mgr.mix_all(&bank, SR);
        assert_eq!(frame, Frame::silence());
    }

    #[test]
    fn mix_output_stays_bounded_per_voice() {
        let bank = SampleBank::with_key();
        let mut mgr = manager(4);
        for i in 0..4 {
            mgr.allocate(0, 40 + i, 127, i as u64);
        }
        for _ in 0..2000 {
            let frame = mgr.mix_channel(0, &bank, SR);
            assert!(frame.left.abs() <= 4.0 * 2.0);
            assert!(frame.right.abs() <= 4.0 * 2.0);
        }
    }

    #[test]
    fn events_drive_allocation() {
        let mut mgr = manager(4);
        mgr.handle_event(&NoteEvent::note_on(0, 0, 48, 100));
        assert_eq!(mgr.active_voices(0), 1);
        mgr.handle_event(&NoteEvent::note_off(10, 0, 48));
        assert!(mgr.channels[0].voices[0].released);
    }
}
