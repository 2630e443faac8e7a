//! Summary lines above the worker table, the rate sparkline, and the error banner.

use std::time::Duration;

use chrono::{DateTime, Local};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

use crate::history::SparkRing;
use crate::types::StatusSnapshot;
use crate::ui::theme::{ERROR, SPARK, VALUE};
use crate::ui::util::{fmt_delay, fmt_uptime};

fn label(s: &str) -> Span<'static> {
    Span::raw(format!("{s}: "))
}

fn value(s: String) -> Span<'static> {
    Span::styled(s, Style::default().fg(VALUE))
}

fn gap() -> Span<'static> {
    Span::raw("   ")
}

pub fn fmt_start_time(ts: i64) -> Option<String> {
    if ts <= 0 {
        return None;
    }
    DateTime::from_timestamp(ts, 0)
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
}

/// `current/max`, plus the backlog size when the pool reports one.
pub fn fmt_queue(s: &StatusSnapshot) -> String {
    if s.listen_queue_len > 0 {
        format!("{}/{} of {}", s.listen_queue, s.max_listen_queue, s.listen_queue_len)
    } else {
        format!("{}/{}", s.listen_queue, s.max_listen_queue)
    }
}

pub fn draw_summary(f: &mut ratatui::Frame<'_>, area: Rect, s: Option<&StatusSnapshot>) {
    let Some(s) = s else {
        f.render_widget(
            Paragraph::new("fpmtop: connecting... (press 'q' to quit)"),
            area,
        );
        return;
    };
    let mut spans = vec![
        label("Pool"),
        value(s.pool.clone()),
        gap(),
        label("Uptime"),
        value(fmt_uptime(s.start_since)),
        gap(),
        label("Manager"),
        value(s.process_manager.clone()),
        gap(),
        label("Accepted Connections"),
        value(s.accepted_conn.to_string()),
    ];
    if let Some(started) = fmt_start_time(s.start_time) {
        spans.extend([gap(), label("Since"), value(started)]);
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn draw_rates(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    s: Option<&StatusSnapshot>,
    rate: f64,
    delay: Duration,
) {
    let mut spans = Vec::new();
    if let Some(s) = s {
        let total = if s.total_processes > 0 {
            s.total_processes
        } else {
            s.active_processes + s.idle_processes
        };
        spans.extend([
            label("Active/Total"),
            value(format!("{:>4}", s.active_processes)),
            Span::raw("/"),
            value(format!("{total:<4}")),
            gap(),
            label("Queue"),
            value(fmt_queue(s)),
            gap(),
            label("Requests per Second"),
            value(format!("{rate:.1}")),
            gap(),
        ]);
        if s.max_children_reached > 0 {
            spans.extend([
                label("Max Children Reached"),
                value(s.max_children_reached.to_string()),
                gap(),
            ]);
        }
        if s.slow_requests > 0 {
            spans.extend([
                label("Slow Requests"),
                value(s.slow_requests.to_string()),
                gap(),
            ]);
        }
    }
    spans.extend([label("Delay"), value(fmt_delay(delay))]);
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn draw_spark(f: &mut ratatui::Frame<'_>, area: Rect, spark: &SparkRing) {
    // Newest samples sit on the right; drop the oldest ones that do not fit.
    let line = spark.render();
    let skip = line.chars().count().saturating_sub(area.width as usize);
    let visible: String = line.chars().skip(skip).collect();
    f.render_widget(
        Paragraph::new(visible).style(Style::default().fg(SPARK)),
        area,
    );
}

pub fn draw_error(f: &mut ratatui::Frame<'_>, area: Rect, msg: &str, delay: Duration) {
    let lines = vec![
        Line::from(Span::styled(
            format!("Error: {msg}"),
            Style::default().fg(ERROR).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("retrying every {} (press 'q' to quit)", fmt_delay(delay)),
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}
