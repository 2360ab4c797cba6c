//! Song structure: the pattern list and the arranger grid.

use alloc::vec::Vec;

use crate::pattern::Pattern;
use crate::MAX_CHANNELS;

/// Upper bound on patterns in a song.
pub const MAX_PATTERNS: usize = 255;

/// Rows in each arranger column.
pub const MAX_SONG_ROWS: usize = 255;

/// The arranger: one column of optional pattern ids per channel, plus the
/// tempo and loop settings that drive playback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Arranger {
    grid: Vec<[Option<u8>; MAX_SONG_ROWS]>,
    enabled_channels: usize,
    pub looping: bool,
    pub bpm: u16,
    /// Swing amount in percent, 50 = straight time.
    pub swing: u8,
}

impl Default for Arranger {
    fn default() -> Self {
        Self::new(4)
    }
}

impl Arranger {
    pub fn new(enabled_channels: usize) -> Self {
        Self {
            grid: alloc::vec![[None; MAX_SONG_ROWS]; MAX_CHANNELS],
            enabled_channels: enabled_channels.min(MAX_CHANNELS),
            looping: true,
            bpm: 120,
            swing: 50,
        }
    }

    pub fn enabled_channels(&self) -> usize {
        self.enabled_channels
    }

    /// Cell contents, `None` for empty or out-of-range coordinates.
    pub fn pattern_at(&self, channel: usize, row: usize) -> Option<u8> {
        self.grid
            .get(channel)
            .and_then(|column| column.get(row))
            .copied()
            .flatten()
    }

    /// Set a cell. Out-of-range coordinates are a no-op.
    pub fn set_pattern(&mut self, channel: usize, row: usize, pattern: Option<u8>) {
        if let Some(cell) = self.grid.get_mut(channel).and_then(|column| column.get_mut(row)) {
            *cell = pattern;
        }
    }

    /// Insert an empty channel column at `index`, shifting later columns
    /// right. No-op when all channels are already enabled.
    pub fn add_channel(&mut self, index: usize) {
        if self.enabled_channels >= MAX_CHANNELS || index > self.enabled_channels {
            return;
        }
        for ch in (index..self.enabled_channels).rev() {
            self.grid[ch + 1] = self.grid[ch];
        }
        self.grid[index] = [None; MAX_SONG_ROWS];
        self.enabled_channels += 1;
    }

    /// Remove the channel column at `index`, shifting later columns left.
    pub fn remove_channel(&mut self, index: usize) {
        if index >= self.enabled_channels {
            return;
        }
        for ch in index..self.enabled_channels - 1 {
            self.grid[ch] = self.grid[ch + 1];
        }
        self.grid[self.enabled_channels - 1] = [None; MAX_SONG_ROWS];
        self.enabled_channels -= 1;
    }

    /// Find the row a channel loops back to from `row`: the start of the
    /// most recent contiguous run of filled cells ending at `row`.
    pub fn loop_row(&self, channel: usize, row: usize) -> usize {
        let Some(column) = self.grid.get(channel) else {
            return row;
        };
        let row = row.min(MAX_SONG_ROWS - 1);
        let mut loop_row = row;
        for r in (1..=row).rev() {
            if column[r - 1].is_none() {
                break;
            }
            loop_row = r - 1;
        }
        loop_row
    }
}

/// A song: the owned pattern list plus the arranger that sequences it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Song {
    pub patterns: Vec<Pattern>,
    pub arranger: Arranger,
}

impl Song {
    pub fn new(enabled_channels: usize) -> Self {
        Self { patterns: Vec::new(), arranger: Arranger::new(enabled_channels) }
    }

    /// Append a pattern, returning its id, or `None` when the list is full.
    pub fn add_pattern(&mut self, pattern: Pattern) -> Option<u8> {
        if self.patterns.len() >= MAX_PATTERNS {
            return None;
        }
        self.patterns.push(pattern);
        Some((self.patterns.len() - 1) as u8)
    }

    pub fn pattern(&self, id: u8) -> Option<&Pattern> {
        self.patterns.get(id as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song_with_patterns(n: usize) -> Song {
        let mut song = Song::new(4);
        for _ in 0..n {
            song.add_pattern(Pattern::new(16));
        }
        song
    }

    #[test]
    fn add_pattern_returns_sequential_ids() {
        let mut song = Song::new(4);
        assert_eq!(song.add_pattern(Pattern::new(16)), Some(0));
        assert_eq!(song.add_pattern(Pattern::new(16)), Some(1));
    }

    #[test]
    fn add_pattern_fails_when_full() {
        let mut song = song_with_patterns(MAX_PATTERNS);
        assert_eq!(song.add_pattern(Pattern::new(16)), None);
        assert_eq!(song.patterns.len(), MAX_PATTERNS);
    }

    #[test]
    fn loop_row_finds_start_of_contiguous_run() {
        let mut arr = Arranger::new(2);
        // rows 0..2 empty, rows 3..6 filled
        for row in 3..=6 {
            arr.set_pattern(0, row, Some(0));
        }
        assert_eq!(arr.loop_row(0, 6), 3);
    }

    #[test]
    fn loop_row_from_row_zero() {
        let mut arr = Arranger::new(2);
        arr.set_pattern(0, 0, Some(0));
        arr.set_pattern(0, 1, Some(1));
        assert_eq!(arr.loop_row(0, 1), 0);
    }

    #[test]
    fn loop_row_stops_at_gap() {
        let mut arr = Arranger::new(2);
        arr.set_pattern(0, 0, Some(0));
        // row 1 empty
        arr.set_pattern(0, 2, Some(1));
        arr.set_pattern(0, 3, Some(2));
        assert_eq!(arr.loop_row(0, 3), 2);
    }

    #[test]
    fn out_of_range_cells_are_empty_and_inert() {
        let mut arr = Arranger::new(2);
        arr.set_pattern(MAX_CHANNELS, 0, Some(1));
        arr.set_pattern(0, MAX_SONG_ROWS, Some(1));
        assert_eq!(arr.pattern_at(MAX_CHANNELS, 0), None);
        assert_eq!(arr.pattern_at(0, MAX_SONG_ROWS), None);
        assert_eq!(arr.loop_row(MAX_CHANNELS, 3), 3);
        assert_eq!(arr.loop_row(0, MAX_SONG_ROWS + 7), MAX_SONG_ROWS - 1);
    }

    #[test]
    fn add_channel_shifts_columns_right() {
        let mut arr = Arranger::new(2);
        arr.set_pattern(0, 0, Some(10));
        arr.set_pattern(1, 0, Some(11));
        arr.add_channel(1);
        assert_eq!(arr.enabled_channels(), 3);
        assert_eq!(arr.pattern_at(0, 0), Some(10));
        assert_eq!(arr.pattern_at(1, 0), None);
        assert_eq!(arr.pattern_at(2, 0), Some(11));
    }

    #[test]
    fn remove_channel_shifts_columns_left() {
        let mut arr = Arranger::new(3);
        arr.set_pattern(0, 0, Some(10));
        arr.set_pattern(1, 0, Some(11));
        arr.set_pattern(2, 0, Some(12));
        arr.remove_channel(1);
        assert_eq!(arr.enabled_channels(), 2);
        assert_eq!(arr.pattern_at(0, 0), Some(10));
        assert_eq!(arr.pattern_at(1, 0), Some(12));
    }

    #[test]
    fn add_channel_at_capacity_is_noop() {
        let mut arr = Arranger::new(crate::MAX_CHANNELS);
        arr.add_channel(0);
        assert_eq!(arr.enabled_channels(), crate::MAX_CHANNELS);
    }

    #[test]
    fn remove_invalid_channel_is_noop() {
        let mut arr = Arranger::new(2);
        arr.remove_channel(5);
        assert_eq!(arr.enabled_channels(), 2);
    }
}
