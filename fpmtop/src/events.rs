//! Keyboard commands and termination signals feeding the main loop.

use std::io;
use std::thread;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    /// Shorter delay between refreshes.
    Faster,
    /// Longer delay between refreshes.
    Slower,
    Refresh,
}

pub fn command_for_key(k: KeyEvent) -> Option<Command> {
    if k.kind == KeyEventKind::Release {
        return None;
    }
    if k.modifiers.contains(KeyModifiers::CONTROL) && k.code == KeyCode::Char('c') {
        return Some(Command::Quit);
    }
    match k.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Command::Quit),
        KeyCode::Char('+') | KeyCode::Char('>') => Some(Command::Slower),
        KeyCode::Char('-') | KeyCode::Char('<') => Some(Command::Faster),
        KeyCode::Char('r') | KeyCode::Char('R') | KeyCode::Char(' ') => Some(Command::Refresh),
        _ => None,
    }
}

/// Start the input thread. It blocks on terminal reads and forwards each
/// recognised key as a [`Command`]; it stops once the receiver is dropped
/// and the next key arrives.
pub fn spawn_input_reader() -> io::Result<UnboundedReceiver<Command>> {
    let (tx, rx) = mpsc::unbounded_channel();
    thread::Builder::new()
        .name("fpmtop-input".into())
        .spawn(move || loop {
            match event::read() {
                Ok(Event::Key(k)) => {
                    if let Some(cmd) = command_for_key(k) {
                        debug!(?cmd, "key command");
                        if tx.send(cmd).is_err() {
                            break;
                        }
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        })?;
    Ok(rx)
}

/// Resolves on SIGINT or SIGTERM.
#[cfg(unix)]
pub async fn termination() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
            }
        }
        Err(_) => {
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
pub async fn termination() {
    let _ = tokio::signal::ctrl_c().await;
}
