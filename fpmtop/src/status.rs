//! Turns a raw status response into a [`StatusSnapshot`].

use crate::errors::{FetchError, ParseError};
use crate::fcgi::{fetch_status, Target};
use crate::types::StatusSnapshot;

/// Parse the response body. PHP-FPM prefixes the JSON with CGI headers
/// (`Content-Type: ...`), so decoding starts at the first `{`.
pub fn parse_status(body: &[u8]) -> Result<StatusSnapshot, ParseError> {
    let start = body
        .iter()
        .position(|&b| b == b'{')
        .ok_or(ParseError::MissingDocument)?;
    Ok(serde_json::from_slice(&body[start..])?)
}

/// Anything that can produce a fresh snapshot on demand.
#[allow(async_fn_in_trait)]
pub trait StatusSource {
    async fn fetch(&mut self) -> Result<StatusSnapshot, FetchError>;
}

/// Fetches snapshots from a live pool over FastCGI.
#[derive(Debug, Clone)]
pub struct PoolStatus {
    pub target: Target,
    pub status_path: String,
}

impl PoolStatus {
    pub fn new(target: Target, status_path: impl Into<String>) -> Self {
        Self {
            target,
            status_path: status_path.into(),
        }
    }
}

impl StatusSource for PoolStatus {
    async fn fetch(&mut self) -> Result<StatusSnapshot, FetchError> {
        let body = fetch_status(&self.target, &self.status_path).await?;
        Ok(parse_status(&body)?)
    }
}
