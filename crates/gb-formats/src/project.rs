//! Project files: magic `SEQ1`, a `PATT` section with the pattern list,
//! then an `ARRG` section with the arranger grid and tempo settings.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use binrw::{binrw, BinRead, BinWrite};
use gb_ir::{
    Note, Pattern, Song, MAX_CHANNELS, MAX_PATTERNS, MAX_PATTERN_STEPS, MAX_SONG_ROWS,
};

/// Empty arranger cell on disk.
const EMPTY_CELL: u8 = 0xFF;

/// Step note encoding: 0 = empty, 1 = note off, 2+pitch = note on.
const NOTE_ON_BASE: u8 = 2;

/// Why a project file operation failed.
#[derive(Debug, PartialEq, Eq)]
pub enum ProjectFileError {
    /// The file could not be opened or created.
    Open,
    Read,
    Write,
    /// Bad magic, bad section tag or malformed data.
    Format,
    /// Counts in the file exceed the engine limits.
    Memory,
}

#[binrw]
#[brw(little, magic = b"SEQ1")]
#[derive(Debug)]
struct ProjectFile {
    patterns: PatternSection,
    arranger: ArrangerSection,
}

#[binrw]
#[brw(little, magic = b"PATT")]
#[derive(Debug)]
struct PatternSection {
    #[br(temp)]
    #[bw(calc = patterns.len() as u8)]
    count: u8,
    #[br(count = count)]
    patterns: Vec<PatternRecord>,
}

#[binrw]
#[brw(little)]
#[derive(Debug)]
struct PatternRecord {
    #[br(temp)]
    #[bw(calc = steps.len() as u8)]
    len: u8,
    #[br(count = len)]
    steps: Vec<StepRecord>,
}

#[binrw]
#[brw(little)]
#[derive(Debug)]
struct StepRecord {
    note: u8,
    velocity: u8,
}

#[binrw]
#[brw(little, magic = b"ARRG")]
#[derive(Debug)]
struct ArrangerSection {
    enabled_channels: u8,
    looping: u8,
    bpm: u16,
    swing: u8,
    #[br(count = enabled_channels)]
    columns: Vec<ColumnRecord>,
}

#[binrw]
#[brw(little)]
#[derive(Debug)]
struct ColumnRecord {
    #[br(count = MAX_SONG_ROWS)]
    rows: Vec<u8>,
}

/// Write a song to disk. The file is laid out section by section so a
/// truncated write is detectable as a format error on the next load.
pub fn save_project(path: &Path, song: &Song) -> Result<(), ProjectFileError> {
    let file = File::create(path).map_err(|_| ProjectFileError::Open)?;
    let mut writer = BufWriter::new(file);
    let record = encode(song);
    record.write(&mut writer).map_err(|_| ProjectFileError::Write)
}

/// Read a song from disk. Parses into a fresh `Song`, so on any error the
/// caller's current song is untouched.
pub fn load_project(path: &Path) -> Result<Song, ProjectFileError> {
    let file = File::open(path).map_err(|_| ProjectFileError::Open)?;
    let mut reader = BufReader::new(file);
    let record = ProjectFile::read(&mut reader).map_err(read_error)?;
    decode(record)
}

/// Failures inside a nested section arrive wrapped in a binrw backtrace, so
/// classification looks at the root cause. Hitting end of file is a
/// truncated file, not a device error.
fn read_error(err: binrw::Error) -> ProjectFileError {
    match err.root_cause() {
        binrw::Error::Io(io) if io.kind() != std::io::ErrorKind::UnexpectedEof => {
            ProjectFileError::Read
        }
        _ => ProjectFileError::Format,
    }
}

fn encode(song: &Song) -> ProjectFile {
    let patterns = song
        .patterns
        .iter()
        .map(|p| PatternRecord {
            steps: p
                .steps()
                .iter()
                .map(|s| StepRecord { note: encode_note(s.note), velocity: s.velocity })
                .collect(),
        })
        .collect();
    let arranger = &song.arranger;
    let columns = (0..arranger.enabled_channels())
        .map(|ch| ColumnRecord {
            rows: (0..MAX_SONG_ROWS)
                .map(|row| arranger.pattern_at(ch, row).unwrap_or(EMPTY_CELL))
                .collect(),
        })
        .collect();
    ProjectFile {
        patterns: PatternSection { patterns },
        arranger: ArrangerSection {
            enabled_channels: arranger.enabled_channels() as u8,
            looping: arranger.looping as u8,
            bpm: arranger.bpm,
            swing: arranger.swing,
            columns,
        },
    }
}

fn decode(record: ProjectFile) -> Result<Song, ProjectFileError> {
    if record.patterns.patterns.len() > MAX_PATTERNS {
        return Err(ProjectFileError::Memory);
    }
    let channels = record.arranger.enabled_channels as usize;
    if channels > MAX_CHANNELS {
        return Err(ProjectFileError::Memory);
    }
    if record.arranger.bpm == 0 || !(1..100).contains(&(record.arranger.swing as usize)) {
        return Err(ProjectFileError::Format);
    }

    let mut song = Song::new(channels);
    for pattern_record in &record.patterns.patterns {
        if pattern_record.steps.is_empty() {
            return Err(ProjectFileError::Format);
        }
        if pattern_record.steps.len() > MAX_PATTERN_STEPS {
            return Err(ProjectFileError::Memory);
        }
        let mut pattern = Pattern::new(pattern_record.steps.len());
        for (i, step) in pattern_record.steps.iter().enumerate() {
            pattern.step_mut(i).note = decode_note(step.note)?;
            pattern.step_mut(i).velocity = step.velocity;
        }
        let _ = song.add_pattern(pattern);
    }

    song.arranger.looping = record.arranger.looping != 0;
    song.arranger.bpm = record.arranger.bpm;
    song.arranger.swing = record.arranger.swing;
    for (ch, column) in record.arranger.columns.iter().enumerate() {
        for (row, &cell) in column.rows.iter().enumerate() {
            if cell != EMPTY_CELL {
                if cell as usize >= song.patterns.len() {
                    return Err(ProjectFileError::Format);
                }
                song.arranger.set_pattern(ch, row, Some(cell));
            }
        }
    }
    Ok(song)
}

fn encode_note(note: Note) -> u8 {
    match note {
        Note::None => 0,
        Note::Off => 1,
        // clamp keeps `step_mut` edits beyond the pitch table encodable
        Note::On(pitch) => NOTE_ON_BASE + pitch.min(gb_ir::MAX_PITCH),
    }
}

fn decode_note(raw: u8) -> Result<Note, ProjectFileError> {
    match raw {
        0 => Ok(Note::None),
        1 => Ok(Note::Off),
        _ => {
            let pitch = raw - NOTE_ON_BASE;
            if pitch > gb_ir::MAX_PITCH {
                return Err(ProjectFileError::Format);
            }
            Ok(Note::On(pitch))
        }
    }
}
