//! Display order for the worker table: busy and slow workers first.

use std::cmp::Ordering;

use crate::types::{RequestDuration, WorkerProcess};

/// Durations above this many microseconds (about 33 minutes) are treated as
/// the upstream 32-bit overflow artifact rather than a real slow request.
pub const OVERFLOW_THRESHOLD_MICROS: f64 = 2_000_000_000.0;

pub fn is_corrupted(d: &RequestDuration) -> bool {
    d.as_f64() > OVERFLOW_THRESHOLD_MICROS
}

/// Running workers before everything else.
fn by_state(a: &WorkerProcess, b: &WorkerProcess) -> Ordering {
    b.state.is_running().cmp(&a.state.is_running())
}

/// Slowest valid duration first, corrupted durations last.
fn by_duration(a: &RequestDuration, b: &RequestDuration) -> Ordering {
    match (is_corrupted(a), is_corrupted(b)) {
        (false, false) => b.as_f64().total_cmp(&a.as_f64()),
        (true, true) => Ordering::Equal,
        (bad_a, bad_b) => bad_a.cmp(&bad_b),
    }
}

pub fn compare(a: &WorkerProcess, b: &WorkerProcess) -> Ordering {
    by_state(a, b)
        .then_with(|| by_duration(&a.request_duration, &b.request_duration))
        .then_with(|| a.pid.cmp(&b.pid))
}

/// Sort `workers` in place into display order.
pub fn rank(workers: &mut [WorkerProcess]) {
    workers.sort_unstable_by(compare);
}
