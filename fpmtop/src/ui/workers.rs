//! Worker table: one row per process in ranked order, flagged when slow.

use std::time::Duration;

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Cell, Row, Table},
};

use crate::ranking::is_corrupted;
use crate::types::{RequestDuration, StatusSnapshot, WorkerProcess, WorkerState};
use crate::ui::theme::{
    HEADER_BG, HEADER_FG, SLOW, STATE_IDLE, STATE_OTHER, STATE_RUNNING, VERY_SLOW,
};
use crate::ui::util::{fmt_elapsed, fmt_uptime, human};

pub const SLOW_AFTER: Duration = Duration::from_millis(500);
pub const VERY_SLOW_AFTER: Duration = Duration::from_millis(1000);

const COLS: [Constraint; 8] = [
    Constraint::Length(1),  // state indicator
    Constraint::Length(7),  // PID
    Constraint::Length(10), // Uptime
    Constraint::Length(15), // State
    Constraint::Length(10), // Mem
    Constraint::Length(10), // Duration
    Constraint::Length(7),  // Method
    Constraint::Min(10),    // URI
];

pub fn state_color(state: &WorkerState) -> Color {
    match state {
        WorkerState::Running => STATE_RUNNING,
        WorkerState::Idle => STATE_IDLE,
        _ => STATE_OTHER,
    }
}

/// Yellow above [`SLOW_AFTER`], red above [`VERY_SLOW_AFTER`]. Overflowed
/// durations carry no information and are never flagged.
pub fn duration_color(d: &RequestDuration) -> Option<Color> {
    if is_corrupted(d) {
        return None;
    }
    let dur = d.to_duration()?;
    if dur > VERY_SLOW_AFTER {
        Some(VERY_SLOW)
    } else if dur > SLOW_AFTER {
        Some(SLOW)
    } else {
        None
    }
}

pub fn row_style(w: &WorkerProcess) -> Style {
    let mut style = Style::default();
    if w.state.is_running() {
        style = style.add_modifier(Modifier::BOLD);
    }
    if let Some(fg) = duration_color(&w.request_duration) {
        style = style.fg(fg);
    }
    style
}

pub fn fmt_request_duration(d: &RequestDuration) -> String {
    if is_corrupted(d) {
        return "overflow".into();
    }
    fmt_elapsed(d.to_duration().unwrap_or_default())
}

fn worker_row(w: &WorkerProcess) -> Row<'static> {
    Row::new(vec![
        Cell::from(" ").style(Style::default().bg(state_color(&w.state))),
        Cell::from(format!("{:>7}", w.pid)),
        Cell::from(format!("{:>10}", fmt_uptime(w.start_since))),
        Cell::from(w.state.to_string()),
        Cell::from(format!("{:>10}", human(w.last_request_memory))),
        Cell::from(format!("{:>10}", fmt_request_duration(&w.request_duration))),
        Cell::from(w.request_method.clone()),
        Cell::from(w.request_uri.clone()),
    ])
    .style(row_style(w))
}

pub fn draw_workers(f: &mut ratatui::Frame<'_>, area: Rect, s: Option<&StatusSnapshot>) {
    if area.height == 0 {
        return;
    }
    let header = Row::new(vec![
        "",
        "    PID",
        "    Uptime",
        "State",
        "       Mem",
        "  Duration",
        "Method",
        "URI",
    ])
    .style(Style::default().fg(HEADER_FG).bg(HEADER_BG));

    // Whatever fits under the header row
    let fit = area.height.saturating_sub(1) as usize;
    let rows: Vec<Row> = s
        .map(|s| s.processes.iter().take(fit).map(worker_row).collect())
        .unwrap_or_default();

    let table = Table::new(rows, COLS.to_vec())
        .header(header)
        .column_spacing(1);
    f.render_widget(table, area);
}
