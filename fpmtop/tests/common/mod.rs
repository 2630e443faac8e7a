//! Stub FastCGI peer shared by the integration tests.
#![allow(dead_code)]

use bytes::{BufMut, BytesMut};
use fpmtop::fcgi::{read_record, Header, RecordType};
use fpmtop::params::Params;
use fpmtop::types::{StatusSnapshot, WorkerProcess, WorkerState};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

pub const STATUS_BODY: &str = "X-Powered-By: PHP/8.2.7\r\n\
Content-Type: application/json\r\n\
\r\n\
{\"pool\":\"www\",\"process manager\":\"dynamic\",\"start time\":1700000000,\"start since\":3725,\
\"accepted conn\":42,\"listen queue\":0,\"max listen queue\":3,\"listen queue len\":511,\
\"idle processes\":1,\"active processes\":1,\"total processes\":2,\"max active processes\":2,\
\"max children reached\":0,\"slow requests\":0,\"processes\":[\
{\"pid\":1201,\"state\":\"Idle\",\"start time\":1700000000,\"start since\":3725,\"requests\":20,\
\"request duration\":412,\"request method\":\"GET\",\"request uri\":\"/status?full&json\",\
\"content length\":0,\"user\":\"-\",\"script\":\"-\",\"last request cpu\":0.00,\"last request memory\":2097152},\
{\"pid\":1202,\"state\":\"Running\",\"start time\":1700000000,\"start since\":3725,\"requests\":22,\
\"request duration\":1200000,\"request method\":\"POST\",\"request uri\":\"/checkout\",\
\"content length\":512,\"user\":\"-\",\"script\":\"/srv/www/index.php\",\"last request cpu\":12.5,\"last request memory\":0}\
]}";

/// One encoded record, with `padding` filler bytes after the content.
pub fn record(kind: RecordType, content: &[u8], padding: u8) -> Vec<u8> {
    let mut buf = BytesMut::new();
    let mut header = Header::new(kind, content.len() as u16);
    header.padding_length = padding;
    header.encode(&mut buf);
    buf.put_slice(content);
    buf.put_bytes(0xAA, padding as usize);
    buf.to_vec()
}

/// What a well-behaved pool sends back: stdout, end of stdout, end request.
pub fn stdout_reply(body: &str) -> Vec<u8> {
    let mut out = record(RecordType::Stdout, body.as_bytes(), 0);
    out.extend(record(RecordType::Stdout, b"", 0));
    out.extend(record(RecordType::EndRequest, &[0; 8], 0));
    out
}

pub fn stderr_reply(message: &str) -> Vec<u8> {
    let mut out = record(RecordType::Stderr, message.as_bytes(), 0);
    out.extend(record(RecordType::EndRequest, &[0; 8], 0));
    out
}

#[derive(Debug)]
pub struct SeenRequest {
    pub kinds: Vec<RecordType>,
    pub role: u16,
    pub params: Params,
    pub params_records: Vec<usize>,
}

/// Read one request up to its empty stdin record, answer with `reply` and
/// close the stream.
pub async fn serve_one<S>(mut stream: S, reply: Vec<u8>) -> SeenRequest
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut seen = SeenRequest {
        kinds: Vec::new(),
        role: 0,
        params: Params::new(),
        params_records: Vec::new(),
    };
    let mut params = Vec::new();
    while let Some(rec) = read_record(&mut stream).await.expect("request record") {
        seen.kinds.push(rec.header.kind);
        match rec.header.kind {
            RecordType::BeginRequest => {
                seen.role = u16::from_be_bytes([rec.content[0], rec.content[1]]);
            }
            RecordType::Params => {
                seen.params_records.push(rec.content.len());
                params.extend_from_slice(&rec.content);
            }
            RecordType::Stdin if rec.content.is_empty() => break,
            _ => {}
        }
    }
    seen.params = Params::decode(&params).expect("params payload");
    stream.write_all(&reply).await.expect("write reply");
    let _ = stream.shutdown().await;
    seen
}

pub fn snapshot(accepted: u64) -> StatusSnapshot {
    StatusSnapshot {
        pool: "www".into(),
        process_manager: "dynamic".into(),
        accepted_conn: accepted,
        ..Default::default()
    }
}

pub fn worker(pid: u32, state: WorkerState, micros: u64) -> WorkerProcess {
    WorkerProcess {
        pid,
        state,
        request_duration: fpmtop::types::RequestDuration::from_micros(micros),
        request_method: "GET".into(),
        request_uri: format!("/w/{pid}"),
        ..Default::default()
    }
}
