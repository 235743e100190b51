//! OS signal handling. Kept in its own test binary because it signals the
//! current process.

#![cfg(unix)]

use axum::Router;
use axum::routing::get;
use std::process::Command;
use std::time::Duration;
use svc_server::listen_and_serve;

#[tokio::test]
async fn test_sigint_stops_listen_and_serve() {
    let router = Router::new().route("/", get(|| async { "hello" }));
    let run = tokio::spawn(listen_and_serve("127.0.0.1:0", router));

    // Let the server install its signal handlers before signalling.
    tokio::time::sleep(Duration::from_millis(200)).await;
    let status = Command::new("kill")
        .args(["-INT", &std::process::id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());

    let result = tokio::time::timeout(Duration::from_secs(5), run)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
}
