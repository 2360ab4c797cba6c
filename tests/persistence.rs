//! Integration test: project save/load round-trips, checked both on the
//! data model and on the event sequence the sequencer actually emits.

use gb_engine::{EventBuffer, Transport};
use gb_formats::{load_project, save_project, ProjectFileError};
use gb_ir::{Note, NoteEvent, Pattern, Song};
use std::fs;
use tempfile::tempdir;

const SR: u32 = 44_100;

fn demo_song() -> Song {
    let mut song = Song::new(2);
    let mut bass = Pattern::new(16);
    bass.set_note(0, Note::On(24));
    bass.set_note(6, Note::On(31));
    bass.set_note(7, Note::Off);
    bass.step_mut(10).note = Note::On(26);
    bass.step_mut(10).velocity = 90;
    let mut lead = Pattern::new(8);
    lead.set_note(0, Note::On(60));
    lead.set_note(4, Note::On(67));
    let b = song.add_pattern(bass).unwrap();
    let l = song.add_pattern(lead).unwrap();
    song.arranger.set_pattern(0, 0, Some(b));
    song.arranger.set_pattern(0, 1, Some(b));
    song.arranger.set_pattern(1, 0, Some(l));
    song.arranger.bpm = 128;
    song.arranger.swing = 55;
    song
}

/// Play a song for two seconds and collect every event the driver emits.
fn event_trace(song: &Song) -> Vec<NoteEvent> {
    let mut transport = Transport::new(SR);
    transport.play(song);
    let mut trace = Vec::new();
    for _ in 0..(SR as usize * 2) {
        let mut events = EventBuffer::new();
        transport.tick(song, &mut events);
        trace.extend(events.iter().copied());
    }
    trace
}

#[test]
fn round_trip_is_identical() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("project.seq");
    let song = demo_song();
    save_project(&path, &song).unwrap();
    assert_eq!(load_project(&path).unwrap(), song);
}

#[test]
fn round_trip_preserves_event_sequence() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("project.seq");
    let song = demo_song();
    save_project(&path, &song).unwrap();
    let loaded = load_project(&path).unwrap();

    assert_eq!(event_trace(&song), event_trace(&loaded));
}

#[test]
fn bad_magic_leaves_state_untouched() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("project.seq");
    fs::write(&path, b"JUNKJUNKJUNKJUNK").unwrap();

    let current = demo_song();
    let result = load_project(&path);
    assert_eq!(result, Err(ProjectFileError::Format));
    // the song we were holding is unchanged by the failed load
    assert_eq!(current, demo_song());
}

#[test]
fn load_failure_modes() {
    let dir = tempdir().unwrap();
    assert_eq!(
        load_project(&dir.path().join("missing.seq")),
        Err(ProjectFileError::Open)
    );
    let truncated = dir.path().join("short.seq");
    fs::write(&truncated, b"SEQ1PA").unwrap();
    assert!(load_project(&truncated).is_err());
}
