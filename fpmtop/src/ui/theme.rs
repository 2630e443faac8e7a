//! Shared UI theme constants.

use ratatui::style::Color;

// Summary values
pub const VALUE: Color = Color::Green;

// Worker state indicator cell
pub const STATE_RUNNING: Color = Color::Magenta;
pub const STATE_IDLE: Color = Color::Green;
pub const STATE_OTHER: Color = Color::Red;

// Column header row
pub const HEADER_FG: Color = Color::White;
pub const HEADER_BG: Color = Color::Blue;

// Slow request flags
pub const SLOW: Color = Color::Yellow;
pub const VERY_SLOW: Color = Color::Red;

pub const SPARK: Color = Color::Cyan;
pub const ERROR: Color = Color::Red;
