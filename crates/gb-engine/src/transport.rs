//! Sequencer playback driver.
//!
//! Walks the arranger and patterns against the sample clock, one tick per
//! step, and emits timestamped note events for the voice manager. Each
//! channel keeps its own cursor, so patterns of different lengths drift
//! against each other the way the arranger laid them out.

use alloc::vec::Vec;

use gb_ir::{Arranger, Note, NoteEvent, Song, MAX_CHANNELS, MAX_SONG_ROWS};

use crate::voice_pool::VoiceManager;

/// Bounded per-buffer event queue. Worst case is one off and one on per
/// channel at a step boundary.
pub type EventBuffer = heapless::Vec<NoteEvent, 64>;

/// Playback state. `Paused` keeps the read position; `Stopped` rewinds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransportState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// How `stop` silences sounding notes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StopMode {
    /// Release every voice and let envelopes ring out.
    #[default]
    Graceful,
    /// Cut all voices immediately.
    Hard,
}

#[derive(Clone, Copy, Debug, Default)]
struct ChannelCursor {
    running: bool,
    row: usize,
    pattern: Option<u8>,
    step: usize,
    /// Pitch of the last note-on, for emitting the matching note-off.
    last_pitch: Option<u8>,
}

/// The playback driver. One per engine; all commands come through here so
/// they are serialized with respect to each other.
pub struct Transport {
    state: TransportState,
    sample_rate: u32,
    /// Absolute frame counter, monotonic across transport commands.
    frame: u64,
    /// Samples until the next step boundary.
    countdown: u32,
    /// Step parity for swing; even steps take the longer half of the pair.
    even_step: bool,
    cursors: Vec<ChannelCursor>,
}

impl Transport {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            state: TransportState::Stopped,
            sample_rate,
            frame: 0,
            countdown: 0,
            even_step: true,
            cursors: alloc::vec![ChannelCursor::default(); MAX_CHANNELS],
        }
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn current_frame(&self) -> u64 {
        self.frame
    }

    /// Arranger row a channel's cursor is on.
    pub fn row(&self, channel: usize) -> usize {
        self.cursors.get(channel).map(|c| c.row).unwrap_or(0)
    }

    /// Start playback. From `Stopped` the cursors rewind to row zero;
    /// from `Paused` they stay where they are.
    pub fn play(&mut self, song: &Song) {
        if self.state == TransportState::Stopped {
            self.rewind(&song.arranger);
        }
        self.state = TransportState::Playing;
    }

    /// Stop playback and rewind. `Graceful` lets envelopes ring out,
    /// `Hard` cuts voices at once.
    pub fn stop(&mut self, mode: StopMode, voices: &mut VoiceManager) {
        match mode {
            StopMode::Graceful => voices.release_all(),
            StopMode::Hard => voices.kill_all(),
        }
        for cursor in &mut self.cursors {
            cursor.last_pitch = None;
        }
        self.state = TransportState::Stopped;
    }

    /// Pause, keeping the read position.
    pub fn pause(&mut self) {
        if self.state == TransportState::Playing {
            self.state = TransportState::Paused;
        }
    }

    /// Move every channel cursor to an arranger row. While playing or
    /// paused, a note-off for each sounding note is queued ahead of any new
    /// note-on. Paused voices are still sounding, so skipping the flush
    /// there would orphan them with no note-off left to emit.
    pub fn seek(&mut self, song: &Song, row: usize, events: &mut EventBuffer) {
        let row = row.min(MAX_SONG_ROWS - 1);
        let arranger = &song.arranger;
        for (ch, cursor) in self.cursors.iter_mut().enumerate() {
            if self.state != TransportState::Stopped {
                if let Some(pitch) = cursor.last_pitch {
                    let _ = events.push(NoteEvent::note_off(self.frame, ch as u8, pitch));
                }
            }
            cursor.last_pitch = None;
            cursor.step = 0;
            cursor.row = row;
            if ch < arranger.enabled_channels() {
                cursor.pattern = arranger.pattern_at(ch, row);
                cursor.running = cursor.pattern.is_some();
            } else {
                cursor.pattern = None;
                cursor.running = false;
            }
        }
        self.countdown = 0;
        self.even_step = true;
    }

    /// Advance one sample frame, queuing the events of any step boundary
    /// crossed. Call once per output frame while rendering.
    pub fn tick(&mut self, song: &Song, events: &mut EventBuffer) {
        if self.state != TransportState::Playing {
            return;
        }
        if self.countdown == 0 {
            self.emit_step(song, events);
            self.countdown = self.step_samples(&song.arranger).max(1);
            self.even_step = !self.even_step;
        }
        self.countdown -= 1;
        self.frame += 1;
    }

    fn rewind(&mut self, arranger: &Arranger) {
        for (ch, cursor) in self.cursors.iter_mut().enumerate() {
            cursor.row = 0;
            cursor.step = 0;
            cursor.last_pitch = None;
            if ch < arranger.enabled_channels() {
                cursor.pattern = arranger.pattern_at(ch, 0);
                cursor.running = cursor.pattern.is_some();
            } else {
                cursor.pattern = None;
                cursor.running = false;
            }
        }
        self.countdown = 0;
        self.even_step = true;
    }

    /// Length of the current step in samples. Steps are sixteenths; swing
    /// redistributes each even/odd pair, 50 percent meaning straight time.
    fn step_samples(&self, arranger: &Arranger) -> u32 {
        let bpm = arranger.bpm.max(1) as u32;
        let pair = self.sample_rate * 30 / bpm;
        let swing = (arranger.swing as u32).clamp(1, 99);
        let even = pair * swing / 100;
        if self.even_step {
            even
        } else {
            pair - even
        }
    }

    /// Fire the current step on every running channel and advance the
    /// cursors, looping or halting channels that hit the end of their
    /// arranger column.
    fn emit_step(&mut self, song: &Song, events: &mut EventBuffer) {
        let arranger = &song.arranger;
        for (ch, cursor) in self.cursors.iter_mut().enumerate() {
            if !cursor.running {
                continue;
            }
            let Some(pattern) = cursor.pattern.and_then(|id| song.pattern(id)) else {
                cursor.running = false;
                continue;
            };
            let step = pattern.step(cursor.step.min(pattern.len() - 1));
            match step.note {
                Note::On(pitch) => {
                    if let Some(prev) = cursor.last_pitch {
                        let _ = events.push(NoteEvent::note_off(self.frame, ch as u8, prev));
                    }
                    let _ =
                        events.push(NoteEvent::note_on(self.frame, ch as u8, pitch, step.velocity));
                    cursor.last_pitch = Some(pitch);
                }
                Note::Off => {
                    if let Some(prev) = cursor.last_pitch.take() {
                        let _ = events.push(NoteEvent::note_off(self.frame, ch as u8, prev));
                    }
                }
                Note::None => {}
            }
            cursor.step += 1;
            if cursor.step >= pattern.len() {
                cursor.step = 0;
                let next = cursor.row + 1;
                let next_pattern = if next < MAX_SONG_ROWS {
                    arranger.pattern_at(ch, next)
                } else {
                    None
                };
                if let Some(id) = next_pattern {
                    cursor.row = next;
                    cursor.pattern = Some(id);
                } else if arranger.looping {
                    let loop_row = arranger.loop_row(ch, cursor.row);
                    cursor.row = loop_row;
                    cursor.pattern = arranger.pattern_at(ch, loop_row);
                    cursor.running = cursor.pattern.is_some();
                } else {
                    cursor.running = false;
                    if let Some(prev) = cursor.last_pitch.take() {
                        let _ = events.push(NoteEvent::note_off(self.frame, ch as u8, prev));
                    }
                }
            }
        }
    }
}
