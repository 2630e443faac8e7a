//! fpmtop: a top-like dashboard for PHP-FPM pools, polled over FastCGI.

pub mod app;
pub mod errors;
pub mod events;
pub mod fcgi;
pub mod history;
pub mod logging;
pub mod params;
pub mod profiles;
pub mod ranking;
pub mod status;
pub mod types;
pub mod ui;
