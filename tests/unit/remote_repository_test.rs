//! Tests for the HTTP-backed repository.
//!
//! A throwaway TCP listener answers every request with one canned response,
//! which is enough to check status mapping and JSON decoding.

use std::time::Duration;

use chrono::Utc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use markshelf::repository::{RemoteRepository, Repository};
use markshelf::types::errors::StoreError;
use markshelf::types::folder::Folder;
use markshelf::types::tag::Tag;

/// Serves `status` with `body` to every connection. Returns the base URL.
async fn canned_server(status: &'static str, body: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let body = body.clone();
            tokio::spawn(async move {
                let mut buf = vec![0u8; 8192];
                let mut seen = Vec::new();
                let header_end = loop {
                    if let Some(pos) = seen.windows(4).position(|w| w == b"\r\n\r\n") {
                        break pos + 4;
                    }
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => seen.extend_from_slice(&buf[..n]),
                    }
                };
                // Drain the request body so closing the socket does not reset it.
                let headers = String::from_utf8_lossy(&seen[..header_end]).to_lowercase();
                let content_length = headers
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                while seen.len() < header_end + content_length {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => seen.extend_from_slice(&buf[..n]),
                    }
                }
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    format!("http://{}/api", addr)
}

fn tag_repo(base: &str) -> RemoteRepository<Tag> {
    RemoteRepository::new(base, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_list_decodes_and_sorts_by_id() {
    let body = serde_json::json!([
        {"id": 3, "name": "c", "color": "#000", "usage_count": 1},
        {"id": 1, "name": "a", "color": "#000", "usage_count": 4},
    ])
    .to_string();
    let base = canned_server("200 OK", body).await;

    let tags = tag_repo(&base).list().await.unwrap();
    let ids: Vec<i64> = tags.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 3]);
    assert_eq!(tags[0].usage_count, 4);
}

#[tokio::test]
async fn test_not_found_means_missing() {
    let base = canned_server("404 Not Found", String::new()).await;
    let repo = tag_repo(&base);

    assert!(repo.find_by_id(8).await.unwrap().is_none());
    assert!(!repo.delete(8).await.unwrap());
}

#[tokio::test]
async fn test_server_error_is_unavailable() {
    let base = canned_server("500 Internal Server Error", String::new()).await;
    let err = tag_repo(&base).list().await.unwrap_err();
    assert!(matches!(err, StoreError::Unavailable(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_malformed_body_is_unavailable() {
    let base = canned_server("200 OK", "{\"oops\":".to_string()).await;
    let err = tag_repo(&base).find_by_id(1).await.unwrap_err();
    assert!(matches!(err, StoreError::Unavailable(_)));
}

#[tokio::test]
async fn test_insert_returns_server_record() {
    let now = Utc::now();
    let stored = Folder {
        id: 41,
        name: "Remote".to_string(),
        parent_id: None,
        color: "#111111".to_string(),
        created_at: now,
        bookmark_count: 0,
    };
    let base = canned_server("201 Created", serde_json::to_string(&stored).unwrap()).await;
    let repo: RemoteRepository<Folder> =
        RemoteRepository::new(&base, Duration::from_secs(5)).unwrap();

    let mut draft = stored.clone();
    draft.id = 0;
    assert_eq!(repo.insert(draft).await.unwrap(), stored);
}

#[tokio::test]
async fn test_connection_refused_is_unavailable() {
    let repo = tag_repo("http://127.0.0.1:1/api/");
    let err = repo.list().await.unwrap_err();
    assert!(matches!(err, StoreError::Unavailable(_)));
}

#[test]
fn test_invalid_base_url_is_validation() {
    let err = RemoteRepository::<Tag>::new("not a url", Duration::from_secs(1))
        .err()
        .unwrap();
    assert!(matches!(err, StoreError::Validation(_)));
}
