//! Entry point for the fpmtop TUI. Parses args, resolves the profile and runs the App.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use fpmtop::app::{App, DelaySchedule, DEFAULT_SPARK_WIDTH};
use fpmtop::errors::ProfileError;
use fpmtop::fcgi::Target;
use fpmtop::logging::init_logging;
use fpmtop::profiles::{
    load_profiles, profiles_path, select_profile, DEFAULT_CONFIG, DEFAULT_PROFILE,
};
use fpmtop::status::{PoolStatus, StatusSource};

struct ParsedArgs {
    config: Option<PathBuf>,
    delay_ms: Option<u64>,
    width: Option<usize>,
    profile: Option<String>,
}

enum Cli {
    Run(ParsedArgs),
    Help(String),
}

fn usage(prog: &str) -> String {
    format!(
        "Usage: {prog} [--config PATH|-c PATH] [--delay MS|-d MS] [--width N|-w N] [PROFILE]\n\n\
         Keys: q quit, +/- slower/faster refresh, r refresh now"
    )
}

fn value_for(flag: &str, v: Option<String>) -> Result<String, String> {
    v.ok_or_else(|| format!("missing value for '{flag}'"))
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Cli, String> {
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "fpmtop".into());
    let mut config: Option<PathBuf> = None;
    let mut delay: Option<String> = None;
    let mut width: Option<String> = None;
    let mut profile: Option<String> = None;

    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Cli::Help(usage(&prog))),
            "--config" | "-c" => config = Some(PathBuf::from(value_for(&arg, it.next())?)),
            "--delay" | "-d" => delay = Some(value_for(&arg, it.next())?),
            "--width" | "-w" => width = Some(value_for(&arg, it.next())?),
            _ if arg.starts_with("--config=") => {
                if let Some((_, v)) = arg.split_once('=') {
                    if !v.is_empty() {
                        config = Some(PathBuf::from(v));
                    }
                }
            }
            _ if arg.starts_with("--delay=") => delay = arg.split_once('=').map(|(_, v)| v.to_string()),
            _ if arg.starts_with("--width=") => width = arg.split_once('=').map(|(_, v)| v.to_string()),
            _ if arg.starts_with('-') => {
                return Err(format!("Unknown option '{arg}'. {}", usage(&prog)));
            }
            _ => {
                if profile.is_none() {
                    profile = Some(arg);
                } else {
                    return Err(format!("Unexpected argument. {}", usage(&prog)));
                }
            }
        }
    }

    let delay_ms = delay
        .map(|v| v.parse::<u64>().map_err(|_| format!("Invalid delay '{v}' (milliseconds expected)")))
        .transpose()?;
    let width = width
        .map(|v| match v.parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(format!("Invalid width '{v}'")),
        })
        .transpose()?;

    Ok(Cli::Run(ParsedArgs {
        config,
        delay_ms,
        width,
        profile,
    }))
}

#[tokio::main]
async fn main() -> ExitCode {
    let parsed = match parse_args(env::args()) {
        Ok(Cli::Run(p)) => p,
        Ok(Cli::Help(text)) => {
            eprintln!("{text}");
            return ExitCode::SUCCESS;
        }
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging() {
        eprintln!("Cannot open log file: {e}");
    }

    let path = parsed.config.unwrap_or_else(profiles_path);
    let name = parsed.profile.as_deref().unwrap_or(DEFAULT_PROFILE);
    let entry = match load_profiles(&path).and_then(|pf| select_profile(&pf, name)) {
        Ok(entry) => entry,
        Err(e @ ProfileError::Bootstrapped { .. }) => {
            eprintln!("{e}\n\n{DEFAULT_CONFIG}");
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut source = PoolStatus::new(Target::parse(&entry.listen), entry.status);
    // A first sample gives the rate a baseline; failures surface on the first tick.
    let initial = source.fetch().await.ok();
    let delay = parsed
        .delay_ms
        .map(|ms| DelaySchedule::at_least(Duration::from_millis(ms)))
        .unwrap_or_default();

    let mut app = App::new(initial, delay, parsed.width.unwrap_or(DEFAULT_SPARK_WIDTH));
    match app.run(&mut source).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("fpmtop: {e:#}");
            ExitCode::FAILURE
        }
    }
}
