//! MirrorIndexReader against a local one-shot HTTP responder.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ledger_core::{SubmissionIndex, SubmissionListing, TopicId};
use ledger_hedera::MirrorIndexReader;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Serves exactly one HTTP response; yields the request line it received.
async fn serve_once(status: u16, body: String) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 8192];
        let n = socket.read(&mut buf).await.unwrap_or(0);
        let request = String::from_utf8_lossy(&buf[..n]);
        let request_line = request.lines().next().unwrap_or_default().to_string();
        let _ = tx.send(request_line);

        let response = format!(
            "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
    });

    (format!("http://{addr}"), rx)
}

/// Serves one response per connection, in order; yields the request lines.
async fn serve_sequence(responses: Vec<(u16, String)>) -> (String, oneshot::Receiver<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let mut request_lines = Vec::new();
        for (status, body) in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap_or(0);
            let request = String::from_utf8_lossy(&buf[..n]);
            request_lines.push(request.lines().next().unwrap_or_default().to_string());

            let response = format!(
                "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        }
        let _ = tx.send(request_lines);
    });

    (format!("http://{addr}"), rx)
}

fn reader(base_url: &str) -> MirrorIndexReader {
    MirrorIndexReader::new(base_url, Duration::from_secs(5)).unwrap()
}

fn encoded(body: &Value) -> String {
    STANDARD.encode(body.to_string())
}

fn submission(level: &str, hash: &str, timestamp: i64) -> Value {
    json!({ "level": level, "proofHash": hash, "userId": "u1", "timestamp": timestamp })
}

#[tokio::test]
async fn service_unavailable_yields_degraded_listing() {
    let (url, _) = serve_once(503, "{}".into()).await;

    let listing = reader(&url).list_submissions(&TopicId::new("0.0.1001"), 10).await;
    assert!(listing.is_degraded());
    assert!(listing.submissions().is_empty());
}

#[tokio::test]
async fn unknown_topic_yields_degraded_listing() {
    let (url, _) = serve_once(404, r#"{"_status":{"messages":[{"message":"Not found"}]}}"#.into()).await;

    let listing = reader(&url).list_submissions(&TopicId::new("0.0.1001"), 10).await;
    assert!(matches!(listing, SubmissionListing::Degraded { .. }));
}

#[tokio::test]
async fn non_json_body_yields_degraded_listing() {
    let (url, _) = serve_once(200, "<html>maintenance</html>".into()).await;

    let listing = reader(&url).list_submissions(&TopicId::new("0.0.1001"), 10).await;
    assert!(listing.is_degraded());
}

#[tokio::test]
async fn unreachable_mirror_yields_degraded_listing() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let listing = reader(&format!("http://{addr}"))
        .list_submissions(&TopicId::new("0.0.1001"), 10)
        .await;
    assert!(listing.is_degraded());
}

#[tokio::test]
async fn results_are_sorted_newest_first_and_bad_messages_skipped() {
    let body = json!({
        "messages": [
            { "consensus_timestamp": "1.0", "message": encoded(&submission("a", "h2", 2000)), "sequence_number": 2 },
            { "consensus_timestamp": "1.0", "message": encoded(&submission("a", "h1", 1000)), "sequence_number": 1 },
            { "consensus_timestamp": "1.0", "message": "!!not-base64!!", "sequence_number": 4 },
            { "consensus_timestamp": "1.0", "message": encoded(&json!({ "level": "a", "timestamp": 9000 })), "sequence_number": 5 },
            { "consensus_timestamp": "1.0", "message": encoded(&submission("a", "h3", 3000)), "sequence_number": 3 }
        ],
        "links": { "next": null }
    });
    let (url, request) = serve_once(200, body.to_string()).await;

    let listing = reader(&url).list_submissions(&TopicId::new("0.0.1001"), 10).await;
    let hashes: Vec<&str> = listing
        .submissions()
        .iter()
        .map(|s| s.proof_hash.as_str())
        .collect();
    assert_eq!(hashes, ["h3", "h2", "h1"]);

    let request_line = request.await.unwrap();
    assert!(
        request_line.starts_with("GET /api/v1/topics/0.0.1001/messages?limit=10&order=desc "),
        "{request_line}"
    );
}

#[tokio::test]
async fn results_are_truncated_to_limit() {
    let body = json!({
        "messages": [
            { "message": encoded(&submission("a", "h1", 1000)) },
            { "message": encoded(&submission("a", "h3", 3000)) },
            { "message": encoded(&submission("a", "h2", 2000)) }
        ]
    });
    let (url, _) = serve_once(200, body.to_string()).await;

    let listing = reader(&url).list_submissions(&TopicId::new("0.0.1001"), 2).await;
    let hashes: Vec<&str> = listing
        .submissions()
        .iter()
        .map(|s| s.proof_hash.as_str())
        .collect();
    assert_eq!(hashes, ["h3", "h2"]);
}

#[tokio::test]
async fn usable_through_the_index_trait() {
    let body = json!({ "messages": [{ "message": encoded(&submission("sudoku", "0xabc", 1000)) }] });
    let (url, _) = serve_once(200, body.to_string()).await;

    let index: Box<dyn SubmissionIndex> = Box::new(reader(&url));
    let listing = index.list_submissions(&TopicId::new("0.0.1001"), 10).await;
    assert_eq!(listing.submissions()[0].level, "sudoku");
}

const NEXT_PAGE: &str = "/api/v1/topics/0.0.1001/messages?limit=10&order=desc&timestamp=lt:2.0";

fn first_page() -> String {
    json!({
        "messages": [
            { "consensus_timestamp": "3.0", "message": encoded(&submission("a", "h3", 3000)) },
            { "consensus_timestamp": "2.0", "message": encoded(&submission("a", "h2", 2000)) }
        ],
        "links": { "next": NEXT_PAGE }
    })
    .to_string()
}

#[tokio::test]
async fn follows_next_links_across_pages() {
    let second_page = json!({
        "messages": [{ "consensus_timestamp": "1.0", "message": encoded(&submission("a", "h1", 1000)) }],
        "links": { "next": null }
    });
    let (url, requests) = serve_sequence(vec![(200, first_page()), (200, second_page.to_string())]).await;

    let listing = reader(&url).list_submissions(&TopicId::new("0.0.1001"), 10).await;
    let hashes: Vec<&str> = listing
        .submissions()
        .iter()
        .map(|s| s.proof_hash.as_str())
        .collect();
    assert_eq!(hashes, ["h3", "h2", "h1"]);

    let requests = requests.await.unwrap();
    assert!(requests[1].starts_with(&format!("GET {NEXT_PAGE} ")), "{}", requests[1]);
}

#[tokio::test]
async fn failed_later_page_keeps_earlier_pages() {
    let (url, _) = serve_sequence(vec![(200, first_page()), (503, "{}".into())]).await;

    let listing = reader(&url).list_submissions(&TopicId::new("0.0.1001"), 10).await;
    assert!(!listing.is_degraded());
    let hashes: Vec<&str> = listing
        .submissions()
        .iter()
        .map(|s| s.proof_hash.as_str())
        .collect();
    assert_eq!(hashes, ["h3", "h2"]);
}
