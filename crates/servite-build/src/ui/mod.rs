//! Terminal output for the build: the islands spinner and size/duration
//! formatting.
//!
//! Everything here writes to the terminal directly; diagnostics go through
//! `tracing` instead.

mod format;
mod spinner;

pub use format::{format_duration, format_kib};
pub use spinner::IslandSpinner;
