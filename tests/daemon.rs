//! End-to-end tests against a live daemon on a loopback port

use std::path::PathBuf;
use std::time::Duration;

use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use track_file_server::{FileServer, ServerConfig};

/// Helper to create a temp file with content
fn create_temp_file(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write temp file");
    path
}

fn sample(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// Split `http://127.0.0.1:{port}/file/{token}` into its parts
fn parse_url(url: &str) -> (u16, String) {
    let rest = url.strip_prefix("http://127.0.0.1:").expect("loopback url");
    let (port, path) = rest.split_once('/').expect("path");
    let token = path.strip_prefix("file/").expect("file route");
    (port.parse().expect("port"), token.to_string())
}

fn header<'a>(response: &'a reqwest::Response, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

#[tokio::test]
async fn test_register_head_then_ranged_get() {
    let dir = TempDir::new().unwrap();
    let data: Vec<u8> = (0..1000).map(|i| b"ACGT\n"[i % 5]).collect();
    let path = create_temp_file(&dir, "track.txt", &data);
    let server = FileServer::with_default_config();

    let url = server.register_file(&path).unwrap();
    let (port, token) = parse_url(&url);
    assert_eq!(Some(port), server.port());
    assert_eq!(token.len(), 32);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));

    let client = reqwest::Client::new();

    let response = client.head(&url).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(header(&response, "content-length"), Some("1000"));
    assert_eq!(header(&response, "accept-ranges"), Some("bytes"));
    assert_eq!(header(&response, "access-control-allow-origin"), Some("*"));
    assert!(response.bytes().await.unwrap().is_empty());

    let response = client
        .get(&url)
        .header("Range", "bytes=500-")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 206);
    assert_eq!(header(&response, "content-range"), Some("bytes 500-999/1000"));
    let body = response.bytes().await.unwrap();
    assert_eq!(body.len(), 500);
    assert_eq!(&body[..], &data[500..]);
}

#[tokio::test]
async fn test_full_fetch_and_errors_over_the_wire() {
    let dir = TempDir::new().unwrap();
    let data = sample(70_000);
    let path = create_temp_file(&dir, "reads.bam", &data);
    let server = FileServer::new(ServerConfig::default().with_chunk_size(4096));
    let url = server.register_file(&path).unwrap();
    let (port, _) = parse_url(&url);
    let client = reqwest::Client::new();

    let response = client.get(&url).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(&response.bytes().await.unwrap()[..], &data[..]);

    let response = client
        .get(&url)
        .header("Range", "bytes=abc")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    assert!(response.bytes().await.unwrap().is_empty());

    let unknown = format!("http://127.0.0.1:{}/file/{}", port, "0".repeat(32));
    let response = client.get(&unknown).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 404);
    assert_eq!(header(&response, "access-control-allow-origin"), Some("*"));

    let response = client
        .request(reqwest::Method::OPTIONS, &unknown)
        .header("Origin", "http://viewer.example")
        .header("Access-Control-Request-Method", "GET")
        .header("Access-Control-Request-Headers", "range")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert!(header(&response, "access-control-allow-headers")
        .unwrap()
        .contains("Range"));
}

#[tokio::test]
async fn test_stalled_client_does_not_block_others() {
    let dir = TempDir::new().unwrap();
    let big = create_temp_file(&dir, "big.cram", &sample(16 * 1024 * 1024));
    let small_data = sample(2048);
    let small = create_temp_file(&dir, "small.crai", &small_data);
    let server = FileServer::with_default_config();

    let big_url = server.register_file(&big).unwrap();
    let small_url = server.register_file(&small).unwrap();
    let (port, big_token) = parse_url(&big_url);

    // Request the large file and never read the response
    let mut stalled = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
    let request = format!(
        "GET /file/{} HTTP/1.1\r\nHost: 127.0.0.1\r\n\r\n",
        big_token
    );
    stalled.write_all(request.as_bytes()).await.unwrap();

    let client = reqwest::Client::new();
    let fetch = async {
        let response = client.get(&small_url).send().await.unwrap();
        assert_eq!(response.status().as_u16(), 200);
        response.bytes().await.unwrap()
    };
    let body = tokio::time::timeout(Duration::from_secs(10), fetch)
        .await
        .expect("second request was blocked by the stalled one");
    assert_eq!(&body[..], &small_data[..]);

    drop(stalled);
}

#[tokio::test]
async fn test_concurrent_requests_for_different_tokens() {
    let dir = TempDir::new().unwrap();
    let a_data = sample(3 * 1024 * 1024);
    let b_data: Vec<u8> = sample(2 * 1024 * 1024).into_iter().rev().collect();
    let a = create_temp_file(&dir, "a.bam", &a_data);
    let b = create_temp_file(&dir, "b.bam", &b_data);
    let server = FileServer::with_default_config();
    let a_url = server.register_file(&a).unwrap();
    let b_url = server.register_file(&b).unwrap();

    let client = reqwest::Client::new();
    let (a_body, b_body) = tokio::join!(
        async { client.get(&a_url).send().await.unwrap().bytes().await.unwrap() },
        async { client.get(&b_url).send().await.unwrap().bytes().await.unwrap() },
    );
    assert_eq!(&a_body[..], &a_data[..]);
    assert_eq!(&b_body[..], &b_data[..]);
}

#[tokio::test]
async fn test_client_disconnect_mid_transfer_is_harmless() {
    let dir = TempDir::new().unwrap();
    let data = sample(8 * 1024 * 1024);
    let path = create_temp_file(&dir, "index.tbi", &data);
    let server = FileServer::with_default_config();
    let url = server.register_file(&path).unwrap();
    let (port, token) = parse_url(&url);

    for _ in 0..3 {
        let mut stream = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
        let request = format!("GET /file/{} HTTP/1.1\r\nHost: 127.0.0.1\r\n\r\n", token);
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut buf = [0u8; 4096];
        let n = stream.read(&mut buf).await.unwrap();
        assert!(n > 0);
        drop(stream);
    }

    let response = reqwest::Client::new()
        .get(&url)
        .header("Range", "bytes=100-199")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 206);
    assert_eq!(&response.bytes().await.unwrap()[..], &data[100..200]);
}
