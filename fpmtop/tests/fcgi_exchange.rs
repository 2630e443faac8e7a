//! FastCGI client against stub peers: in-memory pipes, a Unix socket and TCP.

mod common;

use common::{record, serve_one, stderr_reply, stdout_reply, STATUS_BODY};
use fpmtop::errors::{DecodeError, FetchError};
use fpmtop::fcgi::{encode_request, exchange, fetch_status, read_response, RecordType, Target};
use fpmtop::status::{PoolStatus, StatusSource};
use tokio::io::{duplex, AsyncWriteExt};

fn pipe_target() -> Target {
    Target::Tcp("pipe:0".into())
}

#[test]
fn request_bytes_follow_record_layout() {
    let req = encode_request("/status").unwrap();
    // begin request: version 1, type 1, id 1, length 8, then role responder
    assert_eq!(&req[..8], &[1, 1, 0, 1, 0, 8, 0, 0]);
    assert_eq!(&req[8..16], &[0, 1, 0, 0, 0, 0, 0, 0]);
    // params header
    assert_eq!(&req[16..18], &[1, 4]);
    // trailing empty params and empty stdin
    let tail = &req[req.len() - 16..];
    assert_eq!(tail, &[1, 4, 0, 1, 0, 0, 0, 0, 1, 5, 0, 1, 0, 0, 0, 0]);
}

#[test]
fn target_is_chosen_by_leading_slash() {
    assert_eq!(
        Target::parse("/run/php/php8.2-fpm.sock"),
        Target::Unix("/run/php/php8.2-fpm.sock".into())
    );
    assert_eq!(
        Target::parse("127.0.0.1:9000"),
        Target::Tcp("127.0.0.1:9000".into())
    );
}

#[tokio::test]
async fn peer_sees_begin_params_and_stdin() {
    let (mut client, server) = duplex(64 * 1024);
    let peer = tokio::spawn(serve_one(server, stdout_reply(STATUS_BODY)));

    let body = exchange(&mut client, &pipe_target(), "/status").await.unwrap();
    let seen = peer.await.unwrap();

    assert_eq!(
        seen.kinds,
        vec![
            RecordType::BeginRequest,
            RecordType::Params,
            RecordType::Params,
            RecordType::Stdin
        ]
    );
    assert_eq!(seen.role, 1);
    assert_eq!(seen.params_records.len(), 2);
    assert_eq!(seen.params_records[1], 0, "second params record must be empty");
    assert_eq!(seen.params.get("SCRIPT_NAME"), Some("/status"));
    assert_eq!(seen.params.get("SCRIPT_FILENAME"), Some("/status"));
    assert_eq!(seen.params.get("REQUEST_METHOD"), Some("GET"));
    assert_eq!(seen.params.get("QUERY_STRING"), Some("full&json"));
    assert_eq!(body, STATUS_BODY.as_bytes());
}

#[tokio::test]
async fn stdout_records_are_joined_and_padding_skipped() {
    let (mut client, mut server) = duplex(4096);
    let mut reply = record(RecordType::Stdout, b"Content-Type: text/plain\r\n\r\n{\"po", 5);
    reply.extend(record(RecordType::Stdout, b"ol\":\"a\"}", 3));
    reply.extend(record(RecordType::EndRequest, &[0; 8], 0));
    server.write_all(&reply).await.unwrap();
    drop(server);

    let resp = read_response(&mut client).await.unwrap();
    assert_eq!(resp.stdout, b"Content-Type: text/plain\r\n\r\n{\"pool\":\"a\"}");
    assert!(resp.stderr.is_empty());
}

#[tokio::test]
async fn short_payload_is_a_decode_error() {
    let (mut client, mut server) = duplex(4096);
    let mut bytes = record(RecordType::Stdout, b"0123456789", 0);
    bytes.truncate(8 + 4);
    server.write_all(&bytes).await.unwrap();
    drop(server);

    let err = read_response(&mut client).await.unwrap_err();
    assert!(matches!(err, DecodeError::ShortRead { got: 4, expected: 10 }), "{err:?}");
}

#[tokio::test]
async fn short_padding_is_a_decode_error() {
    let (mut client, mut server) = duplex(4096);
    let mut bytes = record(RecordType::Stdout, b"abc", 6);
    bytes.truncate(8 + 3 + 2);
    server.write_all(&bytes).await.unwrap();
    drop(server);

    let err = read_response(&mut client).await.unwrap_err();
    assert!(matches!(err, DecodeError::ShortRead { got: 2, expected: 6 }), "{err:?}");
}

#[tokio::test]
async fn truncated_header_is_a_decode_error() {
    let (mut client, mut server) = duplex(4096);
    server.write_all(&[1, 6, 0]).await.unwrap();
    drop(server);

    let err = read_response(&mut client).await.unwrap_err();
    assert!(matches!(err, DecodeError::TruncatedHeader(3)), "{err:?}");
}

#[tokio::test]
async fn stderr_output_fails_with_peer_message() {
    let (mut client, server) = duplex(4096);
    let peer = tokio::spawn(serve_one(server, stderr_reply("Primary script unknown\n")));

    let err = exchange(&mut client, &pipe_target(), "/status").await.unwrap_err();
    peer.await.unwrap();

    match err {
        FetchError::Application { path, message } => {
            assert_eq!(path, "/status");
            assert_eq!(message, "Primary script unknown");
        }
        other => panic!("expected application error, got {other:?}"),
    }
}

#[cfg(unix)]
#[tokio::test]
async fn unix_socket_round_trip_yields_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let sock = dir.path().join("php-fpm.sock");
    let listener = tokio::net::UnixListener::bind(&sock).unwrap();
    let peer = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        serve_one(stream, stdout_reply(STATUS_BODY)).await
    });

    let mut source = PoolStatus::new(Target::Unix(sock), "/status");
    let snap = source.fetch().await.unwrap();
    peer.await.unwrap();

    assert_eq!(snap.pool, "www");
    assert_eq!(snap.accepted_conn, 42);
    assert_eq!(snap.processes.len(), 2);
}

#[tokio::test]
async fn tcp_round_trip_returns_body() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let peer = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        serve_one(stream, stdout_reply(STATUS_BODY)).await
    });

    let body = fetch_status(&Target::Tcp(addr.to_string()), "/fpm-status")
        .await
        .unwrap();
    let seen = peer.await.unwrap();

    assert_eq!(seen.params.get("SCRIPT_NAME"), Some("/fpm-status"));
    assert_eq!(body, STATUS_BODY.as_bytes());
}

#[cfg(unix)]
#[tokio::test]
async fn missing_socket_is_a_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let target = Target::Unix(dir.path().join("nobody-home.sock"));

    let err = fetch_status(&target, "/status").await.unwrap_err();
    assert!(matches!(err, FetchError::Connection { .. }), "{err:?}");
    assert!(err.to_string().contains("nobody-home.sock"));
}
