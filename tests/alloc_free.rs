//! Allocation-free render path tests.
//!
//! These verify that `Engine::render` does not touch the heap during the
//! realtime phase: all voice slots and cursors are allocated up front, so
//! rendering a busy song for several seconds must not allocate once.
//!
//! Just run `cargo test` — no feature flags needed.

use assert_no_alloc::{assert_no_alloc, AllocDisabler};

#[cfg(debug_assertions)]
#[global_allocator]
static A: AllocDisabler = AllocDisabler;

use gb_engine::{Engine, Frame};
use gb_ir::{Note, Pattern, Sample, Settings, SynthSpec};

const SR: u32 = 44_100;

fn busy_engine() -> Engine {
    let mut engine = Engine::new(Settings::default(), SR);
    for ch in 0..engine.settings.enabled_channels as usize {
        let mut pat = Pattern::new(16);
        for step in 0..16 {
            if step % 3 != 2 {
                pat.set_note(step, Note::On(30 + (ch * 12 + step * 5) as u8 % 60));
            }
        }
        let id = engine.song.add_pattern(pat).unwrap();
        engine.song.arranger.set_pattern(ch, 0, Some(id));
    }
    engine
}

fn assert_render_alloc_free(mut engine: Engine, duration_frames: usize) {
    engine.play();
    let mut buf = [Frame::silence(); 256];
    assert_no_alloc(|| {
        for _ in 0..duration_frames / buf.len() {
            engine.render(&mut buf);
        }
    });
}

#[test]
fn oscillator_song_alloc_free() {
    assert_render_alloc_free(busy_engine(), SR as usize * 3);
}

#[test]
fn sample_song_alloc_free() {
    let mut engine = busy_engine();
    let mut sample = Sample::new("noise");
    sample.data = (0..4096).map(|i| ((i * 37) % 200) as f32 / 100.0 - 1.0).collect();
    sample.loop_range = Some(gb_ir::LoopRange { start: 0, end: 4096 });
    let key = engine.samples.insert(sample);
    let inst = gb_ir::Instrument::new("smp", SynthSpec::Sample { sample: key, looped: true });
    engine.voices.set_instrument(0, inst);
    assert_render_alloc_free(engine, SR as usize * 3);
}

#[test]
fn seek_and_stop_alloc_free() {
    let mut engine = busy_engine();
    engine.play();
    let mut buf = [Frame::silence(); 256];
    assert_no_alloc(|| {
        for i in 0..200 {
            engine.render(&mut buf);
            if i == 100 {
                engine.seek(0);
            }
        }
        engine.stop(gb_engine::StopMode::Graceful);
        for _ in 0..100 {
            engine.render(&mut buf);
        }
    });
}
