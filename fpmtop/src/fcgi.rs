//! Minimal FastCGI client: just enough to GET the pool status page.
//!
//! One request per connection, fixed request id, responder role. The peer's
//! stdout records are collected as the response body and stderr records as a
//! diagnostic message.

use std::fmt;
use std::io;
use std::path::PathBuf;

use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
#[cfg(unix)]
use tokio::net::UnixStream;
use tracing::debug;

use crate::errors::{DecodeError, FetchError};
use crate::params::Params;

pub const VERSION_1: u8 = 1;
pub const HEADER_LEN: usize = 8;
/// Only one request is ever in flight, so the id never changes.
pub const REQUEST_ID: u16 = 1;
pub const ROLE_RESPONDER: u16 = 1;
/// Asks the status page for every worker, JSON encoded.
pub const STATUS_QUERY: &str = "full&json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    BeginRequest,
    AbortRequest,
    EndRequest,
    Params,
    Stdin,
    Stdout,
    Stderr,
    Data,
    GetValues,
    GetValuesResult,
    UnknownType,
    Other(u8),
}

impl From<u8> for RecordType {
    fn from(v: u8) -> Self {
        match v {
            1 => Self::BeginRequest,
            2 => Self::AbortRequest,
            3 => Self::EndRequest,
            4 => Self::Params,
            5 => Self::Stdin,
            6 => Self::Stdout,
            7 => Self::Stderr,
            8 => Self::Data,
            9 => Self::GetValues,
            10 => Self::GetValuesResult,
            11 => Self::UnknownType,
            other => Self::Other(other),
        }
    }
}

impl From<RecordType> for u8 {
    fn from(t: RecordType) -> Self {
        match t {
            RecordType::BeginRequest => 1,
            RecordType::AbortRequest => 2,
            RecordType::EndRequest => 3,
            RecordType::Params => 4,
            RecordType::Stdin => 5,
            RecordType::Stdout => 6,
            RecordType::Stderr => 7,
            RecordType::Data => 8,
            RecordType::GetValues => 9,
            RecordType::GetValuesResult => 10,
            RecordType::UnknownType => 11,
            RecordType::Other(v) => v,
        }
    }
}

/// The fixed eight byte record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: u8,
    pub kind: RecordType,
    pub request_id: u16,
    pub content_length: u16,
    pub padding_length: u8,
}

impl Header {
    pub fn new(kind: RecordType, content_length: u16) -> Self {
        Self {
            version: VERSION_1,
            kind,
            request_id: REQUEST_ID,
            content_length,
            padding_length: 0,
        }
    }

    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u8(self.version);
        buf.put_u8(self.kind.into());
        buf.put_u16(self.request_id);
        buf.put_u16(self.content_length);
        buf.put_u8(self.padding_length);
        buf.put_u8(0); // reserved
    }

    pub fn decode(raw: &[u8; HEADER_LEN]) -> Self {
        Self {
            version: raw[0],
            kind: RecordType::from(raw[1]),
            request_id: u16::from_be_bytes([raw[2], raw[3]]),
            content_length: u16::from_be_bytes([raw[4], raw[5]]),
            padding_length: raw[6],
        }
    }
}

/// One decoded record with its padding already discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub header: Header,
    pub content: Vec<u8>,
}

/// Where the pool listens: a Unix socket path or a `host:port` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Unix(PathBuf),
    Tcp(String),
}

impl Target {
    pub fn parse(listen: &str) -> Self {
        if listen.starts_with('/') {
            Target::Unix(PathBuf::from(listen))
        } else {
            Target::Tcp(listen.to_string())
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Unix(p) => write!(f, "unix:{}", p.display()),
            Target::Tcp(a) => write!(f, "tcp:{a}"),
        }
    }
}

/// Params sent for a status request.
pub fn status_params(status_path: &str) -> Params {
    let mut p = Params::new();
    p.insert("SCRIPT_NAME", status_path);
    p.insert("SCRIPT_FILENAME", status_path);
    p.insert("REQUEST_METHOD", "GET");
    p.insert("QUERY_STRING", STATUS_QUERY);
    p
}

/// Encode the whole request: begin-request, params, empty params, empty stdin.
pub fn encode_request(status_path: &str) -> Result<Bytes, FetchError> {
    let params = status_params(status_path);
    let size = params.size();
    let params_len = u16::try_from(size).map_err(|_| FetchError::RequestTooLarge(size))?;

    let mut buf = BytesMut::with_capacity(HEADER_LEN * 4 + 8 + size);

    Header::new(RecordType::BeginRequest, 8).encode(&mut buf);
    buf.put_u16(ROLE_RESPONDER);
    buf.put_u8(0); // flags: close the connection when done
    buf.put_bytes(0, 5);

    Header::new(RecordType::Params, params_len).encode(&mut buf);
    params.write(&mut buf);

    Header::new(RecordType::Params, 0).encode(&mut buf);
    Header::new(RecordType::Stdin, 0).encode(&mut buf);

    Ok(buf.freeze())
}

// Like read_exact, but reports how much arrived before EOF instead of failing.
async fn read_full<R: AsyncRead + Unpin>(r: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]).await {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Read one record. `Ok(None)` means the peer closed the stream cleanly
/// between records.
pub async fn read_record<R: AsyncRead + Unpin>(r: &mut R) -> Result<Option<Record>, DecodeError> {
    let mut raw = [0u8; HEADER_LEN];
    let got = read_full(r, &mut raw).await?;
    if got == 0 {
        return Ok(None);
    }
    if got < HEADER_LEN {
        return Err(DecodeError::TruncatedHeader(got));
    }
    let header = Header::decode(&raw);

    let mut content = vec![0u8; header.content_length as usize];
    let got = read_full(r, &mut content).await?;
    if got < content.len() {
        return Err(DecodeError::ShortRead {
            got,
            expected: content.len(),
        });
    }

    let mut padding = [0u8; u8::MAX as usize];
    let padding = &mut padding[..header.padding_length as usize];
    let got = read_full(r, padding).await?;
    if got < padding.len() {
        return Err(DecodeError::ShortRead {
            got,
            expected: padding.len(),
        });
    }

    Ok(Some(Record { header, content }))
}

/// Collected stdout and stderr streams of one response.
#[derive(Debug, Default)]
pub struct Response {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

pub async fn read_response<R: AsyncRead + Unpin>(r: &mut R) -> Result<Response, DecodeError> {
    let mut resp = Response::default();
    while let Some(rec) = read_record(r).await? {
        match rec.header.kind {
            RecordType::Stdout => resp.stdout.extend_from_slice(&rec.content),
            RecordType::Stderr => resp.stderr.extend_from_slice(&rec.content),
            _ => {}
        }
    }
    Ok(resp)
}

/// Run the status request over an already connected stream.
pub async fn exchange<S>(stream: &mut S, target: &Target, status_path: &str) -> Result<Vec<u8>, FetchError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let request = encode_request(status_path)?;
    let write = async {
        stream.write_all(&request).await?;
        stream.flush().await
    };
    write.await.map_err(|source| FetchError::Connection {
        target: target.to_string(),
        source,
    })?;

    let resp = read_response(stream).await?;
    debug!(
        peer = %target,
        stdout = resp.stdout.len(),
        stderr = resp.stderr.len(),
        "status response received"
    );

    if !resp.stderr.is_empty() {
        return Err(FetchError::Application {
            path: status_path.to_string(),
            message: String::from_utf8_lossy(&resp.stderr).trim().to_string(),
        });
    }
    Ok(resp.stdout)
}

/// Open a fresh connection to `target`, GET `status_path`, return the body.
/// The connection is closed when this returns.
pub async fn fetch_status(target: &Target, status_path: &str) -> Result<Vec<u8>, FetchError> {
    let connect_err = |source: io::Error| FetchError::Connection {
        target: target.to_string(),
        source,
    };
    match target {
        #[cfg(unix)]
        Target::Unix(path) => {
            let mut stream = UnixStream::connect(path).await.map_err(connect_err)?;
            exchange(&mut stream, target, status_path).await
        }
        #[cfg(not(unix))]
        Target::Unix(_) => Err(connect_err(io::Error::new(
            io::ErrorKind::Unsupported,
            "unix sockets are not available on this platform",
        ))),
        Target::Tcp(addr) => {
            let mut stream = TcpStream::connect(addr.as_str()).await.map_err(connect_err)?;
            exchange(&mut stream, target, status_path).await
        }
    }
}
