//! Settings (`SET1`) and colour scheme (`CSC1`) files.
//!
//! Colour schemes also load from a plain text format with one `r,g,b`
//! line per slot, which is easier to hand-edit than the binary file.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use binrw::{binrw, BinRead, BinWrite};
use gb_ir::{ColourScheme, Rgb, Settings, SynthKind, MAX_CHANNELS, COLOUR_SLOTS};

/// Why a settings or colour scheme file operation failed.
#[derive(Debug, PartialEq, Eq)]
pub enum FileError {
    Open,
    Read,
    Write,
    Format,
}

#[binrw]
#[brw(little, magic = b"SET1")]
struct SettingsFile {
    enabled_channels: u8,
    default_pattern_len: u8,
    default_voice_count: u8,
    default_bpm: u16,
    channel_kinds: [u8; MAX_CHANNELS],
}

#[binrw]
#[brw(little, magic = b"CSC1")]
struct ColourFile {
    colours: [[u8; 3]; COLOUR_SLOTS],
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<(), FileError> {
    let mut kinds = [0u8; MAX_CHANNELS];
    for (slot, kind) in kinds.iter_mut().zip(&settings.channel_kinds) {
        *slot = encode_kind(*kind);
    }
    let record = SettingsFile {
        enabled_channels: settings.enabled_channels,
        default_pattern_len: settings.default_pattern_len,
        default_voice_count: settings.default_voice_count,
        default_bpm: settings.default_bpm,
        channel_kinds: kinds,
    };
    write_record(path, &record)
}

pub fn load_settings(path: &Path) -> Result<Settings, FileError> {
    let record: SettingsFile = read_record(path)?;
    if record.enabled_channels as usize > MAX_CHANNELS || record.default_bpm == 0 {
        return Err(FileError::Format);
    }
    let mut settings = Settings {
        enabled_channels: record.enabled_channels,
        default_pattern_len: record.default_pattern_len,
        default_voice_count: record.default_voice_count,
        default_bpm: record.default_bpm,
        ..Settings::default()
    };
    for (kind, &raw) in settings.channel_kinds.iter_mut().zip(&record.channel_kinds) {
        *kind = decode_kind(raw)?;
    }
    Ok(settings)
}

pub fn save_colour_scheme(path: &Path, scheme: &ColourScheme) -> Result<(), FileError> {
    let mut colours = [[0u8; 3]; COLOUR_SLOTS];
    for (slot, c) in colours.iter_mut().zip(&scheme.colours) {
        *slot = [c.r, c.g, c.b];
    }
    write_record(path, &ColourFile { colours })
}

pub fn load_colour_scheme(path: &Path) -> Result<ColourScheme, FileError> {
    let record: ColourFile = read_record(path)?;
    let mut scheme = ColourScheme::default();
    for (slot, &[r, g, b]) in scheme.colours.iter_mut().zip(&record.colours) {
        *slot = Rgb::new(r, g, b);
    }
    Ok(scheme)
}

/// Load a colour scheme from text: one `r,g,b` line per slot, blank lines
/// ignored. Fewer or more lines than slots is a format error.
pub fn load_colour_scheme_txt(path: &Path) -> Result<ColourScheme, FileError> {
    let text = fs::read_to_string(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => FileError::Open,
        _ => FileError::Read,
    })?;
    let mut scheme = ColourScheme::default();
    let mut slot = 0;
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if slot >= COLOUR_SLOTS {
            return Err(FileError::Format);
        }
        scheme.colours[slot] = parse_rgb_line(line)?;
        slot += 1;
    }
    if slot != COLOUR_SLOTS {
        return Err(FileError::Format);
    }
    Ok(scheme)
}

fn parse_rgb_line(line: &str) -> Result<Rgb, FileError> {
    let mut parts = line.split(',').map(str::trim);
    let mut next = || -> Result<u8, FileError> {
        parts
            .next()
            .and_then(|p| p.parse::<u8>().ok())
            .ok_or(FileError::Format)
    };
    let rgb = Rgb::new(next()?, next()?, next()?);
    if parts.next().is_some() {
        return Err(FileError::Format);
    }
    Ok(rgb)
}

fn write_record<T: BinWrite>(path: &Path, record: &T) -> Result<(), FileError>
where
    for<'a> <T as BinWrite>::Args<'a>: Default,
{
    let file = File::create(path).map_err(|_| FileError::Open)?;
    let mut writer = BufWriter::new(file);
    record.write_le(&mut writer).map_err(|_| FileError::Write)
}

fn read_record<T: BinRead>(path: &Path) -> Result<T, FileError>
where
    for<'a> <T as BinRead>::Args<'a>: Default,
{
    let file = File::open(path).map_err(|_| FileError::Open)?;
    let mut reader = BufReader::new(file);
    // classify on the root cause so binrw backtrace wrappers do not turn
    // device errors into format errors; end of file means truncation
    T::read_le(&mut reader).map_err(|err| match err.root_cause() {
        binrw::Error::Io(io) if io.kind() != std::io::ErrorKind::UnexpectedEof => FileError::Read,
        _ => FileError::Format,
    })
}

fn encode_kind(kind: SynthKind) -> u8 {
    match kind {
        SynthKind::Oscillator => 0,
        SynthKind::Sample => 1,
        SynthKind::Fm => 2,
        SynthKind::Blep => 3,
    }
}

fn decode_kind(raw: u8) -> Result<SynthKind, FileError> {
    match raw {
        0 => Ok(SynthKind::Oscillator),
        1 => Ok(SynthKind::Sample),
        2 => Ok(SynthKind::Fm),
        3 => Ok(SynthKind::Blep),
        _ => Err(FileError::Format),
    }
}
