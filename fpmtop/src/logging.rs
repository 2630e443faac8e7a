//! Opt-in file logging. The dashboard owns the terminal, so logs only go to
//! the file named by `FPMTOP_LOG_FILE`; without it nothing is installed.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const LOG_FILE_ENV: &str = "FPMTOP_LOG_FILE";
pub const LOG_FILTER_ENV: &str = "FPMTOP_LOG";

pub fn init_logging() -> std::io::Result<bool> {
    let Some(path) = std::env::var_os(LOG_FILE_ENV) else {
        return Ok(false);
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new("fpmtop=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(true)
}
