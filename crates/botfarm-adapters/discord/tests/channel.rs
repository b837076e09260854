//! Channel operations against a local REST server.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use botfarm_adapter_discord::{DiscordChannel, DiscordConfig, DiscordRest};
use botfarm_core::{GuildChannel, TransportError};

#[derive(Debug, Clone)]
struct Request {
    method: String,
    path: String,
    authorization: Option<String>,
    body: Value,
}

#[derive(Default)]
struct Recorded {
    requests: Mutex<Vec<Request>>,
    created: AtomicUsize,
    typing: AtomicUsize,
    /// 1-based index of the typing request to reject; 0 rejects none.
    fail_typing_at: AtomicUsize,
}

impl Recorded {
    fn count(&self, method: &str, suffix: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == method && r.path.ends_with(suffix))
            .count()
    }
}

/// Minimal HTTP/1.1 server answering the REST routes the channel uses.
/// Requests to channel `403` are rejected, as is the typing request numbered
/// by `fail_typing_at`.
async fn fake_rest() -> (String, Arc<Recorded>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let recorded = Arc::new(Recorded::default());
    let state = recorded.clone();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let state = state.clone();
            tokio::spawn(async move {
                let mut reader = BufReader::new(stream);
                let mut request_line = String::new();
                reader.read_line(&mut request_line).await.unwrap();
                let mut parts = request_line.split_whitespace();
                let method = parts.next().unwrap_or_default().to_owned();
                let path = parts.next().unwrap_or_default().to_owned();

                let mut len = 0;
                let mut authorization = None;
                loop {
                    let mut line = String::new();
                    reader.read_line(&mut line).await.unwrap();
                    if line.trim().is_empty() {
                        break;
                    }
                    let (name, value) = line.split_once(':').unwrap();
                    match name.to_ascii_lowercase().as_str() {
                        "content-length" => len = value.trim().parse().unwrap(),
                        "authorization" => authorization = Some(value.trim().to_owned()),
                        _ => {}
                    }
                }
                let mut body = vec![0; len];
                reader.read_exact(&mut body).await.unwrap();
                let body = serde_json::from_slice(&body).unwrap_or(Value::Null);

                let typing_n = if path.ends_with("/typing") {
                    state.typing.fetch_add(1, Ordering::SeqCst) + 1
                } else {
                    0
                };
                let (status, payload) = if path.contains("/channels/403/") {
                    ("403 Forbidden", json!({"message": "Missing Access", "code": 50001}).to_string())
                } else if typing_n != 0 && typing_n == state.fail_typing_at.load(Ordering::SeqCst) {
                    ("500 Internal Server Error", json!({"message": "Try again"}).to_string())
                } else if method == "POST" && path.ends_with("/messages") {
                    let n = state.created.fetch_add(1, Ordering::SeqCst) + 1;
                    ("200 OK", json!({"id": format!("msg-{n}"), "channel_id": "22"}).to_string())
                } else {
                    ("204 No Content", String::new())
                };
                state.requests.lock().push(Request {
                    method,
                    path,
                    authorization,
                    body,
                });

                let response = format!(
                    "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{payload}",
                    payload.len()
                );
                let mut stream = reader.into_inner();
                stream.write_all(response.as_bytes()).await.unwrap();
                let _ = stream.shutdown().await;
            });
        }
    });

    (format!("http://{addr}/api/v10"), recorded)
}

fn channel(api_url: &str, id: &str, typing_every: Duration) -> DiscordChannel {
    let mut config = DiscordConfig::new("tok");
    config.api_url = api_url.to_owned();
    let rest = Arc::new(DiscordRest::new(&config).unwrap());
    DiscordChannel::new(id, rest, typing_every)
}

#[tokio::test]
async fn send_posts_each_chunk_in_order() {
    let (url, recorded) = fake_rest().await;
    let channel = channel(&url, "22", Duration::from_secs(8));

    let text = format!("{}\n{}", "a".repeat(1500), "b".repeat(1500));
    let sent = channel.send(&text).await.unwrap();
    let ids: Vec<_> = sent.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["msg-1", "msg-2"]);

    let requests = recorded.requests.lock().clone();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].path, "/api/v10/channels/22/messages");
    assert_eq!(requests[0].authorization.as_deref(), Some("Bot tok"));
    assert_eq!(requests[0].body["content"], "a".repeat(1500));
    assert_eq!(requests[1].body["content"], "b".repeat(1500));
}

#[tokio::test]
async fn typing_is_refreshed_until_stopped() {
    let (url, recorded) = fake_rest().await;
    let channel = channel(&url, "22", Duration::from_millis(50));

    channel.start_typing().await.unwrap();
    assert!(channel.is_typing());
    assert_eq!(recorded.count("POST", "/channels/22/typing"), 1);

    // A second start while typing does not spawn another refresher.
    channel.start_typing().await.unwrap();

    tokio::time::sleep(Duration::from_millis(180)).await;
    assert!(recorded.count("POST", "/channels/22/typing") >= 3);

    channel.stop_typing().await.unwrap();
    assert!(!channel.is_typing());
    tokio::time::sleep(Duration::from_millis(60)).await;
    let settled = recorded.count("POST", "/channels/22/typing");
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(recorded.count("POST", "/channels/22/typing"), settled);
}

#[tokio::test]
async fn failed_refresh_lets_typing_restart() {
    let (url, recorded) = fake_rest().await;
    recorded.fail_typing_at.store(2, Ordering::SeqCst);
    let channel = channel(&url, "22", Duration::from_millis(50));

    channel.start_typing().await.unwrap();
    assert!(channel.is_typing());

    tokio::time::sleep(Duration::from_millis(120)).await;
    assert!(!channel.is_typing());
    assert_eq!(recorded.count("POST", "/channels/22/typing"), 2);

    channel.start_typing().await.unwrap();
    assert!(channel.is_typing());
    tokio::time::sleep(Duration::from_millis(180)).await;
    assert!(recorded.count("POST", "/channels/22/typing") >= 5);

    channel.stop_typing().await.unwrap();
    assert!(!channel.is_typing());
}

#[tokio::test]
async fn react_encodes_the_emoji() {
    let (url, recorded) = fake_rest().await;
    let channel = channel(&url, "22", Duration::from_secs(8));

    channel.react("m1", "👍").await.unwrap();
    assert_eq!(
        recorded.count("PUT", "/channels/22/messages/m1/reactions/%F0%9F%91%8D/@me"),
        1
    );
}

#[tokio::test]
async fn rejected_requests_surface_as_api_errors() {
    let (url, _recorded) = fake_rest().await;
    let channel = channel(&url, "403", Duration::from_secs(8));

    let err = channel.send("hi").await.unwrap_err();
    match err {
        TransportError::Api { method, message } => {
            assert_eq!(method, "channels/403/messages");
            assert!(message.starts_with("HTTP 403"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
