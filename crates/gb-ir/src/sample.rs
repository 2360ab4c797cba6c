//! Sample data and the sample bank.

use alloc::vec::Vec;
use arrayvec::ArrayString;
use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Key into the sample bank.
    pub struct SampleKey;
}

/// The bank that owns all sample data. Voices hold `SampleKey`s into it.
pub type SampleBank = SlotMap<SampleKey, Sample>;

/// A loop region in sample frames, `start..end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoopRange {
    pub start: usize,
    pub end: usize,
}

/// A mono sample buffer with playback metadata.
#[derive(Clone, Debug)]
pub struct Sample {
    /// Sample name (for display and project files)
    pub name: ArrayString<26>,
    /// Normalized mono data in [-1, 1]
    pub data: Vec<f32>,
    /// Rate the data was recorded at, in Hz
    pub sample_rate: u32,
    /// Pitch at which the data plays back unshifted
    pub root_pitch: u8,
    /// Optional loop region
    pub loop_range: Option<LoopRange>,
}

impl Sample {
    /// Create an empty sample with default metadata.
    pub fn new(name: &str) -> Self {
        let mut s = Self {
            name: ArrayString::new(),
            data: Vec::new(),
            sample_rate: 44_100,
            root_pitch: 48, // C4
            loop_range: None,
        };
        let _ = s.name.try_push_str(name);
        s
    }

    /// Number of frames in the sample.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether a usable loop region is defined.
    pub fn has_loop(&self) -> bool {
        matches!(self.loop_range, Some(lr) if lr.start < lr.end)
    }

    /// Read the sample at a fractional position with linear interpolation.
    /// Positions past the end hold the final frame.
    pub fn value_at(&self, position: f32) -> f32 {
        if self.data.is_empty() || position < 0.0 {
            return 0.0;
        }
        let floor = position as usize;
        if floor + 1 >= self.data.len() {
            return self.data.last().copied().unwrap_or(0.0);
        }
        let frac = position - floor as f32;
        self.data[floor] * (1.0 - frac) + self.data[floor + 1] * frac
    }
}
