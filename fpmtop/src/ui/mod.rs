//! UI module root: exposes drawing functions for the dashboard rows.

pub mod header;
pub mod theme;
pub mod util;
pub mod workers;
