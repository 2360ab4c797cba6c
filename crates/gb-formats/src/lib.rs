//! File formats for groovebox.
//!
//! Section-tagged binary files for projects (`SEQ1` with `PATT` and `ARRG`
//! sections), settings (`SET1`) and colour schemes (`CSC1`), plus the
//! plain-text colour scheme format. Every loader parses into fresh values,
//! so a failed load leaves the caller's state untouched.

mod project;
mod settings_format;

pub use project::{load_project, save_project, ProjectFileError};
pub use settings_format::{
    load_colour_scheme, load_colour_scheme_txt, load_settings, save_colour_scheme, save_settings,
    FileError,
};
