//! Note events passed from the sequencer driver to the voice manager.

/// Whether an event starts or releases a note.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteKind {
    On,
    Off,
}

/// A timestamped note event. Produced by the playback driver, consumed
/// exactly once by the voice manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoteEvent {
    /// Absolute sample frame the event fires on
    pub frame: u64,
    pub channel: u8,
    pub pitch: u8,
    pub velocity: u8,
    pub kind: NoteKind,
}

impl NoteEvent {
    pub const fn note_on(frame: u64, channel: u8, pitch: u8, velocity: u8) -> Self {
        Self { frame, channel, pitch, velocity, kind: NoteKind::On }
    }

    pub const fn note_off(frame: u64, channel: u8, pitch: u8) -> Self {
        Self { frame, channel, pitch, velocity: 0, kind: NoteKind::Off }
    }
}
