//! Error types for a single status fetch and for profile lookup.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while fetching one status snapshot.
///
/// None of these are fatal to the dashboard: the app shows the message as a
/// banner and tries again on the next tick.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("cannot reach {target}: {source}")]
    Connection {
        target: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Could not get '{path}': {message}")]
    Application { path: String, message: String },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("request parameters too large for one record ({0} bytes)")]
    RequestTooLarge(usize),
}

/// Malformed or truncated response records.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("truncated record header: got {0} of 8 bytes")]
    TruncatedHeader(usize),

    #[error("short read: got {got}, expected {expected}")]
    ShortRead { got: usize, expected: usize },

    #[error("read failed: {0}")]
    Io(#[from] io::Error),
}

/// The response body did not contain a usable status document.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no JSON document in status response")]
    MissingDocument,

    #[error("invalid status document: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("error when opening {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error when parsing {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("new configuration file written to {path}. Please verify, and restart fpmtop.")]
    Bootstrapped { path: PathBuf },

    #[error("{0} not found in config file. Please fix.")]
    MissingProfile(String),
}
