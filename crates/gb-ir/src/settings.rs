//! Engine settings and display colours.

use crate::instrument::SynthKind;
use crate::MAX_CHANNELS;

/// Colour slots in a scheme, in file order.
pub const COLOUR_SLOTS: usize = 9;

/// Startup settings, persisted separately from songs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settings {
    pub enabled_channels: u8,
    pub default_pattern_len: u8,
    /// Default synth kind per channel
    pub channel_kinds: [SynthKind; MAX_CHANNELS],
    pub default_voice_count: u8,
    pub default_bpm: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled_channels: 4,
            default_pattern_len: 16,
            channel_kinds: [SynthKind::Oscillator; MAX_CHANNELS],
            default_voice_count: crate::MAX_VOICES_PER_CHANNEL as u8,
            default_bpm: 120,
        }
    }
}

/// An 8-bit RGB colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Display colour scheme. Slot order is fixed and matches the on-disk
/// layout: background, secondary font, font, outline, default cell, blank
/// cell, highlighted cell, selected cell, accent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColourScheme {
    pub colours: [Rgb; COLOUR_SLOTS],
}

impl Default for ColourScheme {
    fn default() -> Self {
        Self {
            colours: [
                Rgb::new(17, 7, 8),
                Rgb::new(120, 120, 120),
                Rgb::new(230, 230, 230),
                Rgb::new(80, 80, 80),
                Rgb::new(40, 40, 48),
                Rgb::new(24, 24, 28),
                Rgb::new(90, 90, 140),
                Rgb::new(200, 160, 60),
                Rgb::new(190, 50, 50),
            ],
        }
    }
}
