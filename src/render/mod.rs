//! Terminal rendering helpers.
//!
//! - `progress`: MM:SS formatting, progress bar with segment ticks, click-to-seek mapping
//! - `paragraph`: width-aware word wrapping for the highlighted paragraph
//! - `help`: keyboard shortcut overlay

pub mod help;
pub mod paragraph;
pub mod progress;

pub use progress::format_duration;
