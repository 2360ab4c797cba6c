//! Pattern: an ordered sequence of note steps.

use alloc::vec::Vec;

use crate::note::Note;

/// Upper bound on steps per pattern.
pub const MAX_PATTERN_STEPS: usize = 64;

/// Default velocity for entered notes.
const DEFAULT_VELOCITY: u8 = 64;

/// A single step in a pattern.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Step {
    pub note: Note,
    pub velocity: u8,
}

impl Step {
    pub const fn empty() -> Self {
        Self { note: Note::None, velocity: DEFAULT_VELOCITY }
    }

    pub fn is_empty(&self) -> bool {
        self.note == Note::None
    }
}

/// A pattern: a fixed-length run of steps, read-only during playback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    steps: Vec<Step>,
}

impl Pattern {
    /// Create a pattern of `len` empty steps, capped at `MAX_PATTERN_STEPS`.
    pub fn new(len: usize) -> Self {
        let len = len.clamp(1, MAX_PATTERN_STEPS);
        Self { steps: alloc::vec![Step::empty(); len] }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step(&self, index: usize) -> &Step {
        &self.steps[index]
    }

    pub fn step_mut(&mut self, index: usize) -> &mut Step {
        &mut self.steps[index]
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Set a step's note, keeping its velocity.
    pub fn set_note(&mut self, index: usize, note: Note) {
        self.steps[index].note = note;
    }

    /// Transpose a step's note by semitones, clamped to the pitch table.
    pub fn transpose_step(&mut self, index: usize, semitones: i16) {
        if let Note::On(pitch) = self.steps[index].note {
            let p = (pitch as i16 + semitones).clamp(0, crate::note::MAX_PITCH as i16);
            self.steps[index].note = Note::On(p as u8);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::MAX_PITCH;

    #[test]
    fn new_pattern_is_all_empty() {
        let p = Pattern::new(16);
        assert_eq!(p.len(), 16);
        assert!(p.steps().iter().all(Step::is_empty));
    }

    #[test]
    fn length_is_capped() {
        assert_eq!(Pattern::new(1000).len(), MAX_PATTERN_STEPS);
        assert_eq!(Pattern::new(0).len(), 1);
    }

    #[test]
    fn set_and_read_note() {
        let mut p = Pattern::new(16);
        p.set_note(3, Note::On(48));
        assert_eq!(p.step(3).note, Note::On(48));
        assert_eq!(p.step(3).velocity, 64);
    }

    #[test]
    fn transpose_clamps_at_range_edges() {
        let mut p = Pattern::new(4);
        p.set_note(0, Note::On(MAX_PITCH - 1));
        p.transpose_step(0, 12);
        assert_eq!(p.step(0).note, Note::On(MAX_PITCH));

        p.set_note(1, Note::On(2));
        p.transpose_step(1, -12);
        assert_eq!(p.step(1).note, Note::On(0));
    }

    #[test]
    fn transpose_ignores_non_notes() {
        let mut p = Pattern::new(4);
        p.set_note(0, Note::Off);
        p.transpose_step(0, 5);
        assert_eq!(p.step(0).note, Note::Off);
    }
}
