//! Types that mirror the PHP-FPM `?full&json` status document.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Number;

/// Worker state as reported by the pool. Unknown states pass through.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum WorkerState {
    Running,
    #[default]
    Idle,
    ReadingHeaders,
    Other(String),
}

impl From<String> for WorkerState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Running" => Self::Running,
            "Idle" => Self::Idle,
            "Reading headers" => Self::ReadingHeaders,
            _ => Self::Other(s),
        }
    }
}

impl WorkerState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Running => "Running",
            Self::Idle => "Idle",
            Self::ReadingHeaders => "Reading headers",
            Self::Other(s) => s,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request duration in microseconds, kept as the literal JSON number.
///
/// Some PHP-FPM versions overflow this counter and print values far outside
/// the i64 range, so it is only converted to a float when compared or shown.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct RequestDuration(pub Number);

impl RequestDuration {
    pub fn from_micros(us: u64) -> Self {
        Self(Number::from(us))
    }

    pub fn as_f64(&self) -> f64 {
        self.0.as_f64().unwrap_or(f64::INFINITY)
    }

    /// The duration, or `None` when it is negative or not finite.
    pub fn to_duration(&self) -> Option<Duration> {
        let us = self.as_f64();
        (us.is_finite() && us >= 0.0).then(|| Duration::from_micros(us as u64))
    }
}

impl Default for RequestDuration {
    fn default() -> Self {
        Self::from_micros(0)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorkerProcess {
    pub pid: u32,
    pub state: WorkerState,
    #[serde(rename = "start time")]
    pub start_time: i64,
    #[serde(rename = "start since")]
    pub start_since: u64,
    pub requests: u64,
    #[serde(rename = "request duration")]
    pub request_duration: RequestDuration,
    #[serde(rename = "request method")]
    pub request_method: String,
    #[serde(rename = "request uri")]
    pub request_uri: String,
    #[serde(rename = "content length")]
    pub content_length: u64,
    pub user: String,
    pub script: String,
    #[serde(rename = "last request cpu")]
    pub last_request_cpu: f64,
    #[serde(rename = "last request memory")]
    pub last_request_memory: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatusSnapshot {
    pub pool: String,
    #[serde(rename = "process manager")]
    pub process_manager: String,
    #[serde(rename = "start time")]
    pub start_time: i64,
    #[serde(rename = "start since")]
    pub start_since: u64,
    #[serde(rename = "accepted conn")]
    pub accepted_conn: u64,
    #[serde(rename = "listen queue")]
    pub listen_queue: u64,
    #[serde(rename = "max listen queue")]
    pub max_listen_queue: u64,
    #[serde(rename = "listen queue len")]
    pub listen_queue_len: u64,
    #[serde(rename = "idle processes")]
    pub idle_processes: u64,
    #[serde(rename = "active processes")]
    pub active_processes: u64,
    #[serde(rename = "total processes")]
    pub total_processes: u64,
    #[serde(rename = "max active processes")]
    pub max_active_processes: u64,
    #[serde(rename = "max children reached")]
    pub max_children_reached: u64,
    #[serde(rename = "slow requests")]
    pub slow_requests: u64,
    pub processes: Vec<WorkerProcess>,
}
