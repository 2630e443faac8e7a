//! Small UI helpers: human-readable sizes and durations.

use std::time::Duration;

pub fn human(b: u64) -> String {
    const K: f64 = 1024.0;
    let b = b as f64;
    if b < K { return format!("{b:.0}B"); }
    let kb = b / K;
    if kb < K { return format!("{kb:.1}KB"); }
    let mb = kb / K;
    if mb < K { return format!("{mb:.1}MB"); }
    let gb = mb / K;
    if gb < K { return format!("{gb:.1}GB"); }
    let tb = gb / K;
    format!("{tb:.2}TB")
}

/// Request durations: `850µs`, `12.3ms`, `1.50s`, `4m05s`.
pub fn fmt_elapsed(d: Duration) -> String {
    let us = d.as_micros();
    if us < 1_000 { return format!("{us}µs"); }
    if us < 1_000_000 { return format!("{:.1}ms", us as f64 / 1_000.0); }
    let secs = d.as_secs();
    if secs < 60 { return format!("{:.2}s", d.as_secs_f64()); }
    fmt_uptime(secs)
}

/// Whole-second spans: `42s`, `3m07s`, `2h05m10s`, `3d04h12m`.
pub fn fmt_uptime(secs: u64) -> String {
    let (d, h, m, s) = (secs / 86_400, secs / 3_600 % 24, secs / 60 % 60, secs % 60);
    if d > 0 { return format!("{d}d{h:02}h{m:02}m"); }
    if h > 0 { return format!("{h}h{m:02}m{s:02}s"); }
    if m > 0 { return format!("{m}m{s:02}s"); }
    format!("{s}s")
}

/// Refresh delays, which are always round table values: `250ms`, `5s`, `15m`, `1d`.
pub fn fmt_delay(d: Duration) -> String {
    let ms = d.as_millis();
    if ms < 1_000 || ms % 1_000 != 0 { return format!("{ms}ms"); }
    let secs = d.as_secs();
    if secs % 86_400 == 0 { return format!("{}d", secs / 86_400); }
    if secs % 3_600 == 0 { return format!("{}h", secs / 3_600); }
    if secs % 60 == 0 { return format!("{}m", secs / 60); }
    format!("{secs}s")
}
