//! Full sender/receiver runs over loopback sockets.

use std::fs;
use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;
use std::thread;

use compress::CompressionLevel;
use compress::FrameHeader;
use compress::block::HEADER_LEN;
use protocol::write_token;
use session::{
    ReceiverServer, SendRequest, SessionError, ShutdownHandle, send_roots_with_progress,
    spawn_receiver,
};
use transfer::{SessionConfig, TransferError};

type Listener = thread::JoinHandle<Result<u64, SessionError>>;

fn loopback() -> SocketAddr {
    "127.0.0.1:0".parse().expect("addr")
}

fn start(target: &Path, config: SessionConfig) -> (SocketAddr, ShutdownHandle, Listener) {
    let server = ReceiverServer::bind(loopback(), target, Arc::new(config)).expect("bind");
    let addr = server.local_addr();
    let (shutdown, thread) = spawn_receiver(server).expect("spawn");
    (addr, shutdown, thread)
}

fn send(addr: SocketAddr, roots: &[&Path], config: SessionConfig) -> Result<transfer::SendSummary, SessionError> {
    let request = SendRequest::new(
        "127.0.0.1",
        addr.port(),
        roots.iter().map(|root| root.to_path_buf()).collect(),
    );
    send_roots_with_progress(&request, Arc::new(config), Vec::new())
}

fn stop(shutdown: &ShutdownHandle, thread: Listener) -> u64 {
    shutdown.shutdown();
    thread.join().expect("listener thread").expect("serve")
}

fn compressed() -> SessionConfig {
    SessionConfig::builder()
        .block_size(NonZeroUsize::new(16_384).expect("non-zero"))
        .compression(Some(CompressionLevel::Default))
        .build()
}

/// Forwards one connection to `upstream`, recording what the sender writes.
fn recording_relay(upstream: SocketAddr) -> (SocketAddr, thread::JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind(loopback()).expect("bind relay");
    let addr = listener.local_addr().expect("relay addr");
    let relay = thread::spawn(move || {
        let (mut downstream, _) = listener.accept().expect("accept sender");
        let mut forward = TcpStream::connect(upstream).expect("connect receiver");
        let mut replies_from = forward.try_clone().expect("clone receiver");
        let mut replies_to = downstream.try_clone().expect("clone sender");
        let replies = thread::spawn(move || {
            let _ = io::copy(&mut replies_from, &mut replies_to);
        });

        let mut recorded = Vec::new();
        let mut buffer = [0u8; 8192];
        loop {
            let n = downstream.read(&mut buffer).expect("read sender");
            if n == 0 {
                break;
            }
            recorded.extend_from_slice(&buffer[..n]);
            forward.write_all(&buffer[..n]).expect("forward");
        }
        let _ = forward.shutdown(Shutdown::Write);
        replies.join().expect("reply thread");
        recorded
    });
    (addr, relay)
}

/// Uncompressed length of every frame in a recorded compressed stream.
fn frame_sizes(mut stream: &[u8]) -> Vec<u32> {
    let mut sizes = Vec::new();
    while !stream.is_empty() {
        let header: [u8; HEADER_LEN] = stream[..HEADER_LEN].try_into().expect("header");
        let header = FrameHeader::decode(header);
        sizes.push(header.uncompressed_len());
        stream = &stream[HEADER_LEN + header.compressed_len() as usize..];
    }
    sizes
}

// ============================================================================
// Transfers
// ============================================================================

#[test]
fn three_roots_arrive_byte_identical() {
    let temp = tempfile::tempdir().expect("tempdir");
    let source = temp.path().join("source");
    let target = temp.path().join("target");
    fs::create_dir_all(source.join("empty")).expect("empty dir");

    let large: Vec<u8> = (0..40_000u32).map(|i| (i * 7 % 256) as u8).collect();
    fs::write(source.join("large.bin"), &large).expect("large");

    let mut binary = vec![0xAB; 1001];
    binary[500] = 0;
    fs::write(source.join("binary.dat"), &binary).expect("binary");

    let (addr, shutdown, thread) = start(&target, compressed());
    let (relay, recording) = recording_relay(addr);
    let summary = send(
        relay,
        &[
            &source.join("empty"),
            &source.join("large.bin"),
            &source.join("binary.dat"),
        ],
        compressed(),
    )
    .expect("send");
    let recorded = recording.join().expect("relay thread");
    assert_eq!(stop(&shutdown, thread), 1);

    // The 40000-byte body fills two frames; the rest shares a frame with
    // its digest token.
    let sizes = frame_sizes(&recorded);
    let first_full = sizes
        .iter()
        .position(|&size| size == 16_384)
        .expect("a full frame");
    assert_eq!(sizes.iter().filter(|&&size| size == 16_384).count(), 2);
    assert_eq!(sizes[first_full + 1], 16_384);
    assert!((7_232 + 2..=7_232 + 33).contains(&sizes[first_full + 2]));

    assert_eq!(summary.items, 3);
    assert_eq!(summary.files, 2);
    assert_eq!(summary.directories, 1);
    assert_eq!(summary.bytes, 41_001);
    assert_eq!(summary.digest_mismatches, 0);
    assert!(target.join("empty").is_dir());
    assert_eq!(fs::read(target.join("large.bin")).expect("large"), large);
    assert_eq!(fs::read(target.join("binary.dat")).expect("binary"), binary);
}

#[test]
fn directory_tree_is_mirrored_under_its_root_name() {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path().join("project");
    let target = temp.path().join("incoming");
    fs::create_dir_all(root.join("src/nested")).expect("dirs");
    fs::write(root.join("Cargo.toml"), b"[package]\n").expect("write");
    fs::write(root.join("src/nested/lib.rs"), b"pub fn f() {}\n").expect("write");

    let (addr, shutdown, thread) = start(&target, SessionConfig::default());
    send(addr, &[&root], SessionConfig::default()).expect("send");
    stop(&shutdown, thread);

    assert_eq!(
        fs::read(target.join("project/Cargo.toml")).expect("manifest"),
        b"[package]\n"
    );
    assert_eq!(
        fs::read(target.join("project/src/nested/lib.rs")).expect("lib"),
        b"pub fn f() {}\n"
    );
}

#[test]
fn missing_roots_are_skipped() {
    let temp = tempfile::tempdir().expect("tempdir");
    let file = temp.path().join("present.txt");
    fs::write(&file, b"here").expect("write");
    let target = temp.path().join("target");

    let (addr, shutdown, thread) = start(&target, SessionConfig::default());
    let summary = send(
        addr,
        &[&temp.path().join("absent"), &file],
        SessionConfig::default(),
    )
    .expect("send");
    stop(&shutdown, thread);

    assert_eq!(summary.files, 1);
    assert!(target.join("present.txt").is_file());
}

// ============================================================================
// Listener behaviour
// ============================================================================

#[test]
fn refused_peer_is_disconnected_before_handshake() {
    let temp = tempfile::tempdir().expect("tempdir");
    let file = temp.path().join("f");
    fs::write(&file, b"x").expect("write");
    let target = temp.path().join("target");

    let config = SessionConfig::builder().allowed_prefixes(["10.255."]).build();
    let (addr, shutdown, thread) = start(&target, config);
    let error = send(addr, &[&file], SessionConfig::default()).expect_err("refused");
    assert!(error.is_connection_failure(), "{error}");
    assert_eq!(stop(&shutdown, thread), 0);
    assert!(!target.join("f").exists());
}

#[test]
fn allowed_prefix_admits_loopback() {
    let temp = tempfile::tempdir().expect("tempdir");
    let file = temp.path().join("f");
    fs::write(&file, b"x").expect("write");
    let target = temp.path().join("target");

    let config = SessionConfig::builder()
        .allowed_prefixes(["10.255.", " 127.0."])
        .build();
    let (addr, shutdown, thread) = start(&target, config);
    send(addr, &[&file], SessionConfig::default()).expect("send");
    assert_eq!(stop(&shutdown, thread), 1);
    assert!(target.join("f").is_file());
}

#[test]
fn shutdown_unblocks_idle_listener() {
    let temp = tempfile::tempdir().expect("tempdir");
    let (_addr, shutdown, thread) = start(temp.path(), SessionConfig::default());
    assert!(!shutdown.is_shutdown());
    assert_eq!(stop(&shutdown, thread), 0);
    assert!(shutdown.is_shutdown());
}

#[test]
fn failed_session_does_not_stop_the_listener() {
    let temp = tempfile::tempdir().expect("tempdir");
    let target = temp.path().join("target");
    fs::create_dir_all(target.join("clash")).expect("dir in the way");
    let clash = temp.path().join("clash");
    fs::write(&clash, b"file").expect("write");
    let fine = temp.path().join("fine");
    fs::write(&fine, b"ok").expect("write");

    let (addr, shutdown, thread) = start(&target, SessionConfig::default());
    let first = send(addr, &[&clash], SessionConfig::default()).expect_err("collision");
    assert!(first.is_connection_failure(), "{first}");
    send(addr, &[&fine], SessionConfig::default()).expect("second session");
    assert_eq!(stop(&shutdown, thread), 2);
    assert_eq!(fs::read(target.join("fine")).expect("read"), b"ok");
}

#[test]
fn sender_rejects_foreign_version() {
    let listener = TcpListener::bind(loopback()).expect("bind");
    let addr = listener.local_addr().expect("addr");
    let peer = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        write_token(&mut stream, b"xfer1.0").expect("version");
        stream.flush().expect("flush");
        let mut rest = Vec::new();
        stream.read_to_end(&mut rest).expect("drain");
        rest
    });

    let temp = tempfile::tempdir().expect("tempdir");
    let error = send(addr, &[temp.path()], SessionConfig::default()).expect_err("mismatch");
    assert!(matches!(
        error,
        SessionError::Transfer(TransferError::VersionMismatch { .. })
    ));
    assert!(peer.join().expect("peer").is_empty());
}

#[test]
fn unreachable_receiver_is_a_connect_error() {
    let port = TcpListener::bind(loopback())
        .expect("bind")
        .local_addr()
        .expect("addr")
        .port();
    let request = SendRequest::new("127.0.0.1", port, Vec::new());
    let error = send_roots_with_progress(&request, Arc::new(SessionConfig::default()), Vec::new())
        .expect_err("nobody listening");
    assert!(matches!(error, SessionError::Connect { .. }));
}
