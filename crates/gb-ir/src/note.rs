//! Note and pitch types.
//!
//! A pitch is a single semitone index (`octave * 12 + semitone`), so the
//! full range of 9 octaves fits in a `u8`. Frequency conversion is 12-TET
//! from A4 = 440 Hz.

/// Semitones per octave.
pub const NOTES_PER_OCTAVE: u8 = 12;

/// Number of octaves in the pitch table.
const OCTAVES: u8 = 9;

/// Highest valid pitch (B of the top octave).
pub const MAX_PITCH: u8 = NOTES_PER_OCTAVE * OCTAVES - 1;

/// Pitch index of A4 (octave 4, semitone 9).
const A4_PITCH: i32 = 57;

const A4_FREQUENCY: f32 = 440.0;

/// A note value in a pattern step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Note {
    /// Empty step, nothing happens
    #[default]
    None,
    /// Note on with pitch index (0..=MAX_PITCH)
    On(u8),
    /// Note off / key release
    Off,
}

impl Note {
    /// Create a note from octave (0-8) and semitone (0-11).
    pub const fn from_octave_semitone(octave: u8, semitone: u8) -> Self {
        Note::On(octave * NOTES_PER_OCTAVE + semitone)
    }

    /// Get the octave if this is a note on.
    pub const fn octave(self) -> Option<u8> {
        match self {
            Note::On(p) => Some(p / NOTES_PER_OCTAVE),
            _ => None,
        }
    }

    /// Get the semitone (0-11) if this is a note on.
    pub const fn semitone(self) -> Option<u8> {
        match self {
            Note::On(p) => Some(p % NOTES_PER_OCTAVE),
            _ => None,
        }
    }
}

/// Combine octave and semitone into a pitch index, clamped to the table.
pub fn pitch_from_parts(octave: u8, semitone: u8) -> u8 {
    let p = octave as u16 * NOTES_PER_OCTAVE as u16 + semitone as u16;
    p.min(MAX_PITCH as u16) as u8
}

/// Convert a pitch index to a frequency in Hz.
///
/// The pitch is clamped to the audible table range before conversion, so
/// the result is always a positive, finite frequency.
pub fn pitch_to_frequency(pitch: u8) -> f32 {
    let p = pitch.min(MAX_PITCH) as i32;
    let semitones = (p - A4_PITCH) as f32;
    A4_FREQUENCY * libm::powf(2.0, semitones / 12.0)
}

/// Waveform shapes shared by the oscillator, BLEP and LFO units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Waveform {
    #[default]
    Sine,
    Saw,
    Square,
    Triangle,
}
