//! groovebox: a pattern-based polyphonic synthesis and sequencing engine.
//!
//! Facade over the workspace crates: [`gb_ir`] holds the data model,
//! [`gb_engine`] the real-time engine, [`gb_formats`] the file formats and
//! [`gb_input`] the input layer.

pub use gb_engine as engine;
pub use gb_formats as formats;
pub use gb_input as input;
pub use gb_ir as ir;

pub use gb_engine::{Engine, Frame, StopMode, TransportState};
pub use gb_ir::{Instrument, Note, Pattern, Settings, Song};
