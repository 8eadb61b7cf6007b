// netprint/tests/print_and_scan.rs
// End-to-end tests against loopback listeners

use std::sync::{Arc, Mutex};
use std::time::Duration;

use netprint::{
    CancellationToken, PrintError, PrintRequest, PrinterAddress, QrErrorCorrection, ScanOptions,
    ScanRange, TransportErrorKind, encode, is_reachable, print, scan,
};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;

/// Accept one connection and return everything written to it
async fn capture_one(listener: TcpListener) -> Vec<u8> {
    let (mut socket, _) = listener.accept().await.unwrap();
    let mut buf = Vec::new();
    socket.read_to_end(&mut buf).await.unwrap();
    buf
}

async fn fake_printer() -> (TcpListener, PrinterAddress) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, PrinterAddress::new("127.0.0.1", port))
}

#[tokio::test]
async fn test_print_text_bytes_on_the_wire() {
    let (listener, addr) = fake_printer().await;
    let capture = tokio::spawn(capture_one(listener));

    print(&addr, &PrintRequest::text("Hello"), Duration::from_secs(2))
        .await
        .unwrap();

    let bytes = capture.await.unwrap();
    assert_eq!(
        bytes,
        vec![0x1B, 0x40, 0x48, 0x65, 0x6C, 0x6C, 0x6F, 0x0A, 0x0A, 0x1D, 0x56, 0x41]
    );
}

#[tokio::test]
async fn test_print_qr_bytes_on_the_wire() {
    let (listener, addr) = fake_printer().await;
    let capture = tokio::spawn(capture_one(listener));

    let request = PrintRequest::qr_with("https://example.com/t/42", 8, QrErrorCorrection::H);
    print(&addr, &request, Duration::from_secs(3)).await.unwrap();

    let bytes = capture.await.unwrap();
    assert_eq!(bytes, encode(&request).unwrap().into_inner());
    // module size, then level H
    assert_eq!(bytes[9], 8);
    assert_eq!(bytes[17], 51);
}

#[tokio::test]
async fn test_print_to_missing_printer() {
    let (listener, addr) = fake_printer().await;
    drop(listener);

    let err = print(&addr, &PrintRequest::text("x"), Duration::from_secs(2))
        .await
        .unwrap_err();
    match err {
        PrintError::Transport(e) => assert_eq!(e.kind(), TransportErrorKind::ConnectionFailed),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_reachability_matches_scan() {
    let (_listener, addr) = fake_printer().await;
    assert!(is_reachable(addr.host(), addr.port(), Duration::from_millis(500)).await);

    let found = Arc::new(Mutex::new(Vec::new()));
    let sink = found.clone();
    let range: ScanRange = "127.0.0.1-4".parse().unwrap();
    let options = ScanOptions::default()
        .with_port(addr.port())
        .with_concurrency(3)
        .with_cancel(CancellationToken::new());

    let summary = scan(&range, &options, move |r| sink.lock().unwrap().push(r)).await;

    assert_eq!(summary.total_probed, 4);
    assert_eq!(summary.total_found, 1);
    assert!(!summary.cancelled);
    let found = found.lock().unwrap();
    assert_eq!(found[0].address, addr);
    assert!(found[0].reachable);
}

#[tokio::test]
async fn test_scan_summary_json() {
    let range = ScanRange::new([127, 0, 0], 2, 2).unwrap();
    let (listener, _) = fake_printer().await;
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let summary = scan(&range, &ScanOptions::default().with_port(port), |_| {}).await;
    let json = serde_json::to_value(summary).unwrap();

    assert_eq!(json["total_probed"], 1);
    assert_eq!(json["total_found"], 0);
    assert_eq!(json["cancelled"], false);
}
