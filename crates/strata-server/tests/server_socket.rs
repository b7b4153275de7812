//! The server over a real TCP socket.

use std::sync::Arc;
use std::time::Duration;
use strata_core::RequestId;
use strata_server::{App, Server, ShutdownSignal};
use strata_store::ItemStore;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

async fn exchange(addr: std::net::SocketAddr, request: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    String::from_utf8(response).unwrap()
}

#[tokio::test]
async fn test_serves_requests_and_shuts_down() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = App::new(Arc::new(ItemStore::new()), false).unwrap();
    let server = Server::new(app, addr).with_shutdown_timeout(Duration::from_secs(2));
    let shutdown = ShutdownSignal::new();
    let task = tokio::spawn(server.serve(listener, shutdown.clone()));

    let body = r#"{"name":"Widget"}"#;
    let created = exchange(
        addr,
        &format!(
            "POST /items HTTP/1.1\r\nhost: localhost\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        ),
    )
    .await;
    assert!(created.starts_with("HTTP/1.1 201"), "{created}");
    assert!(created.contains("x-request-id: "), "{created}");
    assert!(created.ends_with(r#"{"id":1,"name":"Widget"}"#), "{created}");

    let missing = exchange(
        addr,
        "GET /items/9 HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n\r\n",
    )
    .await;
    assert!(missing.starts_with("HTTP/1.1 404"), "{missing}");

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_truncated_body_times_out_as_client_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = App::new(Arc::new(ItemStore::new()), true)
        .unwrap()
        .with_request_timeout(Duration::from_millis(200));
    let server = Server::new(app, addr).with_shutdown_timeout(Duration::from_secs(2));
    let shutdown = ShutdownSignal::new();
    let task = tokio::spawn(server.serve(listener, shutdown.clone()));

    let incoming = RequestId::new().to_string();
    let response = tokio::time::timeout(
        Duration::from_secs(5),
        exchange(
            addr,
            &format!(
                "POST /items HTTP/1.1\r\nhost: localhost\r\nx-request-id: {incoming}\r\ncontent-type: application/json\r\ncontent-length: 50\r\nconnection: close\r\n\r\n{{\"na"
            ),
        ),
    )
    .await
    .unwrap();

    assert!(response.starts_with("HTTP/1.1 408"), "{response}");
    assert!(response.contains(&format!("x-request-id: {incoming}")), "{response}");
    assert!(response.contains("REQUEST_TIMEOUT"), "{response}");

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
}
