//! App state and main loop: tick scheduling, key commands, fetching, ranking, drawing.

use std::future::Future;
use std::io;
use std::time::Duration;

use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    Terminal,
};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{sleep_until, Instant};
use tracing::{info, warn};

use crate::errors::FetchError;
use crate::events::{spawn_input_reader, termination, Command};
use crate::history::SparkRing;
use crate::ranking::rank;
use crate::status::StatusSource;
use crate::types::StatusSnapshot;
use crate::ui::{
    header::{draw_error, draw_rates, draw_spark, draw_summary},
    workers::draw_workers,
};

/// Selectable refresh delays, fastest first.
pub const DELAYS: [Duration; 15] = [
    Duration::from_millis(50),
    Duration::from_millis(100),
    Duration::from_millis(250),
    Duration::from_millis(500),
    Duration::from_secs(1),
    Duration::from_secs(2),
    Duration::from_secs(5),
    Duration::from_secs(10),
    Duration::from_secs(30),
    Duration::from_secs(60),
    Duration::from_secs(5 * 60),
    Duration::from_secs(15 * 60),
    Duration::from_secs(60 * 60),
    Duration::from_secs(6 * 60 * 60),
    Duration::from_secs(24 * 60 * 60),
];

pub const DEFAULT_DELAY_INDEX: usize = 2;

pub const DEFAULT_SPARK_WIDTH: usize = 70;

// Below this the counter delta is noise, not a rate.
const MIN_RATE_WINDOW: Duration = Duration::from_millis(1);

/// Position in [`DELAYS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelaySchedule {
    index: usize,
}

impl DelaySchedule {
    pub fn new(index: usize) -> Self {
        Self {
            index: index.min(DELAYS.len() - 1),
        }
    }

    /// The first table entry that is at least `d`, or the slowest one.
    pub fn at_least(d: Duration) -> Self {
        let index = DELAYS
            .iter()
            .position(|&x| x >= d)
            .unwrap_or(DELAYS.len() - 1);
        Self { index }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Duration {
        DELAYS[self.index]
    }

    /// Step to the next shorter delay. Returns false at the fast end.
    pub fn faster(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }

    /// Step to the next longer delay. Returns false at the slow end.
    pub fn slower(&mut self) -> bool {
        if self.index + 1 >= DELAYS.len() {
            return false;
        }
        self.index += 1;
        true
    }
}

impl Default for DelaySchedule {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY_INDEX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    AwaitingTick,
    Fetching,
    Rendering,
    ErrorDisplay,
    Shutdown,
}

/// Requests per second between two readings of the accepted-connections
/// counter. Zero when the window is too short or the counter went backwards.
pub fn request_rate(prev: u64, curr: u64, elapsed: Duration) -> f64 {
    if elapsed < MIN_RATE_WINDOW {
        return 0.0;
    }
    curr.saturating_sub(prev) as f64 / elapsed.as_secs_f64()
}

/// Leave raw mode and the alternate screen and show the cursor. Every step
/// runs even if an earlier one fails; the first error is returned.
pub fn restore_terminal<W, F>(out: &mut W, disable_raw: F) -> io::Result<()>
where
    W: io::Write,
    F: FnOnce() -> io::Result<()>,
{
    let raw = disable_raw();
    let screen = execute!(out, LeaveAlternateScreen, Show);
    raw.and(screen)
}

pub struct App {
    // Latest good snapshot, workers already ranked
    last: Option<StatusSnapshot>,
    last_sample_at: Option<Instant>,

    // Request rate history
    rate: f64,
    spark: SparkRing,

    delay: DelaySchedule,
    next_tick: Instant,

    // Message of the last failed fetch, cleared by the next good one
    error: Option<String>,
    phase: Phase,
}

impl App {
    pub fn new(initial: Option<StatusSnapshot>, delay: DelaySchedule, spark_width: usize) -> Self {
        let now = Instant::now();
        let last = initial.map(|mut s| {
            rank(&mut s.processes);
            s
        });
        Self {
            last_sample_at: last.as_ref().map(|_| now),
            last,
            rate: 0.0,
            spark: SparkRing::new(spark_width),
            delay,
            next_tick: now,
            error: None,
            phase: Phase::Idle,
        }
    }

    pub fn last(&self) -> Option<&StatusSnapshot> {
        self.last.as_ref()
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn spark(&self) -> &SparkRing {
        &self.spark
    }

    pub fn delay(&self) -> DelaySchedule {
        self.delay
    }

    pub fn next_tick(&self) -> Instant {
        self.next_tick
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub async fn run<S: StatusSource>(&mut self, source: &mut S) -> anyhow::Result<()> {
        // Terminal setup
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        // Main loop
        let res = match spawn_input_reader() {
            Ok(commands) => {
                self.event_loop(&mut terminal, source, commands, termination())
                    .await
            }
            Err(e) => Err(e.into()),
        };

        // Teardown
        restore_terminal(terminal.backend_mut(), disable_raw_mode)?;

        res
    }

    /// Wait for whichever comes first: shutdown, a key command, or the tick.
    /// A tick runs fetch, rank and draw to completion before waiting again.
    pub async fn event_loop<B, S, F>(
        &mut self,
        terminal: &mut Terminal<B>,
        source: &mut S,
        mut commands: UnboundedReceiver<Command>,
        shutdown: F,
    ) -> anyhow::Result<()>
    where
        B: Backend,
        S: StatusSource,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        // With a baseline sample already in hand, show it and wait a full
        // delay so the first rate covers a real interval.
        let now = Instant::now();
        if self.last.is_some() {
            terminal.draw(|f| self.draw(f))?;
            self.next_tick = now + self.delay.current();
        } else {
            self.next_tick = now;
        }
        self.phase = Phase::AwaitingTick;
        info!(delay_ms = self.delay.current().as_millis() as u64, "refresh loop started");

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("termination signal received");
                    break;
                }
                Some(cmd) = commands.recv() => {
                    if !self.handle_command(cmd, Instant::now()) {
                        break;
                    }
                }
                _ = sleep_until(self.next_tick) => {
                    let started = Instant::now();
                    self.phase = Phase::Fetching;
                    let fetched = source.fetch().await;
                    self.apply(fetched, started);
                    terminal.draw(|f| self.draw(f))?;
                    self.next_tick = started + self.delay.current();
                    self.phase = Phase::AwaitingTick;
                }
            }
        }

        self.phase = Phase::Shutdown;
        Ok(())
    }

    /// React to a key command. Returns false when the loop should stop.
    pub fn handle_command(&mut self, cmd: Command, now: Instant) -> bool {
        match cmd {
            Command::Quit => {
                self.phase = Phase::Shutdown;
                return false;
            }
            Command::Faster => {
                if self.delay.faster() {
                    info!(delay_ms = self.delay.current().as_millis() as u64, "delay decreased");
                }
            }
            Command::Slower => {
                if self.delay.slower() {
                    info!(delay_ms = self.delay.current().as_millis() as u64, "delay increased");
                }
            }
            Command::Refresh => {}
        }
        self.next_tick = now;
        true
    }

    /// Fold one fetch result into the state. `now` is when the tick started.
    pub fn apply(&mut self, fetched: Result<StatusSnapshot, FetchError>, now: Instant) {
        match fetched {
            Err(e) => {
                warn!(error = %e, "status fetch failed");
                self.error = Some(e.to_string());
                self.phase = Phase::ErrorDisplay;
            }
            Ok(mut snap) => {
                self.rate = match (&self.last, self.last_sample_at) {
                    (Some(prev), Some(at)) => request_rate(
                        prev.accepted_conn,
                        snap.accepted_conn,
                        now.saturating_duration_since(at),
                    ),
                    _ => 0.0,
                };
                self.spark.push(self.rate);
                rank(&mut snap.processes);
                self.last = Some(snap);
                self.last_sample_at = Some(now);
                self.error = None;
                self.phase = Phase::Rendering;
            }
        }
    }

    pub fn draw(&self, f: &mut ratatui::Frame<'_>) {
        let area = f.area();

        if let Some(msg) = &self.error {
            draw_error(f, area, msg, self.delay.current());
            return;
        }

        // Root rows: summary, rates, sparkline, worker table
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(area);

        draw_summary(f, rows[0], self.last.as_ref());
        draw_rates(f, rows[1], self.last.as_ref(), self.rate, self.delay.current());
        draw_spark(f, rows[2], &self.spark);
        draw_workers(f, rows[3], self.last.as_ref());
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(None, DelaySchedule::default(), DEFAULT_SPARK_WIDTH)
    }
}
