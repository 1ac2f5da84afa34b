//! Command-line interface for feedback-annotate.

mod commands;
pub mod helpers;
pub mod icons;

pub use commands::{is_verbose, run};
