use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use wireline::http::request::Request;
use wireline::http::response::{StatusCode, default_headers};
use wireline::http::writer::ResponseWriter;
use wireline::server::{self, HandlerFuture};

fn echo_handler<'a>(w: &'a mut ResponseWriter, request: &'a Request) -> HandlerFuture<'a> {
    Box::pin(async move {
        let body = format!(
            "target={} body={}",
            request.request_line.target,
            String::from_utf8_lossy(&request.body)
        );
        let headers = default_headers(body.len());
        w.write_status_line(StatusCode::Ok).unwrap();
        w.write_headers(&headers).unwrap();
        w.write_body(body.as_bytes()).unwrap();
    })
}

async fn send_raw(addr: SocketAddr, raw: &[u8]) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw).await.unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    String::from_utf8_lossy(&response).into_owned()
}

#[tokio::test]
async fn test_serves_a_parsed_request() {
    let mut server = server::serve(0, Arc::new(echo_handler)).await.unwrap();
    let addr = server.local_addr();

    let response = send_raw(addr, b"GET /hello HTTP/1.1\r\nHost: test\r\n\r\n").await;

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.contains("target=/hello"));

    server.close().await.unwrap();
}

#[tokio::test]
async fn test_request_body_reaches_the_handler() {
    let mut server = server::serve(0, Arc::new(echo_handler)).await.unwrap();
    let addr = server.local_addr();

    let response = send_raw(
        addr,
        b"POST /submit HTTP/1.1\r\nContent-Length: 7\r\n\r\npayload",
    )
    .await;

    assert!(response.contains("target=/submit"));
    assert!(response.contains("body=payload"));

    server.close().await.unwrap();
}

#[tokio::test]
async fn test_concurrent_clients_get_isolated_responses() {
    let mut server = server::serve(0, Arc::new(echo_handler)).await.unwrap();
    let addr = server.local_addr();

    let mut clients = Vec::new();
    for i in 0..8 {
        clients.push(tokio::spawn(async move {
            let body = format!("client-{i}-payload");
            let raw = format!(
                "POST /c{i} HTTP/1.1\r\nContent-Length: {}\r\n\r\n{body}",
                body.len()
            );
            (i, body, send_raw(addr, raw.as_bytes()).await)
        }));
    }

    for client in clients {
        let (i, body, response) = client.await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.contains(&format!("target=/c{i}")));
        assert!(response.contains(&format!("body={body}")));
        for other in 0..8 {
            if other != i {
                assert!(!response.contains(&format!("client-{other}-payload")));
            }
        }
    }

    server.close().await.unwrap();
}

#[tokio::test]
async fn test_malformed_request_receives_400() {
    let mut server = server::serve(0, Arc::new(echo_handler)).await.unwrap();
    let addr = server.local_addr();

    let response = send_raw(addr, b"NONSENSE\r\n\r\n").await;

    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));

    server.close().await.unwrap();
}

#[tokio::test]
async fn test_close_refuses_subsequent_connections() {
    let mut server = server::serve(0, Arc::new(echo_handler)).await.unwrap();
    let addr = server.local_addr();

    // The server is reachable before close.
    let probe = TcpStream::connect(addr).await;
    assert!(probe.is_ok());
    drop(probe);

    server.close().await.unwrap();

    let refused = TcpStream::connect(addr).await;
    assert!(refused.is_err());
}
