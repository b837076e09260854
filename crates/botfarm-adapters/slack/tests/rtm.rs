//! Realtime client against a local socket server.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use botfarm_adapter_slack::{SlackConfig, SlackRtmClient};
use botfarm_core::{TeamChatEvent, TeamChatRealtime, TransportError};

/// Starts a server that greets with `hello`, pushes one message event and
/// acknowledges every `message` frame it receives (when `ack` is set).
async fn fake_server(ack: bool) -> (String, Arc<Mutex<Vec<Value>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let received = Arc::new(Mutex::new(Vec::new()));
    let log = received.clone();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        ws.send(WsMessage::Text(r#"{"type":"hello"}"#.into()))
            .await
            .unwrap();

        while let Some(Ok(msg)) = ws.next().await {
            let WsMessage::Text(text) = msg else {
                continue;
            };
            let frame: Value = serde_json::from_str(text.as_str()).unwrap();
            log.lock().push(frame.clone());

            if frame["type"] == "message" && ack {
                let reply = json!({
                    "ok": true,
                    "reply_to": frame["id"],
                    "ts": "1700000000.000100",
                    "text": frame["text"],
                });
                ws.send(WsMessage::Text(reply.to_string().into()))
                    .await
                    .unwrap();
            }
            if frame["type"] == "typing" {
                let event = json!({
                    "type": "message",
                    "channel": frame["channel"],
                    "user": "U1",
                    "text": "ping",
                    "ts": "1700000000.000200",
                });
                ws.send(WsMessage::Text(event.to_string().into()))
                    .await
                    .unwrap();
            }
        }
    });

    (format!("ws://{addr}"), received)
}

/// Starts a server that greets with `hello` and hangs up on the first frame
/// it receives.
async fn hang_up_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        ws.send(WsMessage::Text(r#"{"type":"hello"}"#.into()))
            .await
            .unwrap();
        let _ = ws.next().await;
        let _ = ws.close(None).await;
    });

    format!("ws://{addr}")
}

fn config() -> SlackConfig {
    let mut config = SlackConfig::new("xoxb-test");
    config.ack_timeout_secs = 1;
    config.ping_interval_secs = 0;
    config
}

#[tokio::test]
async fn send_message_resolves_with_acknowledged_timestamp() {
    let (url, received) = fake_server(true).await;
    let client = SlackRtmClient::connect_url(&url, &config()).await.unwrap();

    let sent = client.send_message("PONG", "C1").await.unwrap();
    assert_eq!(sent.id, "1700000000.000100");
    assert_eq!(client.pending_ack_count(), 0);

    let frames = received.lock().clone();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["channel"], "C1");
    assert_eq!(frames[0]["text"], "PONG");
}

#[tokio::test]
async fn inbound_message_events_reach_listeners() {
    let (url, _received) = fake_server(true).await;
    let client = SlackRtmClient::connect_url(&url, &config()).await.unwrap();

    let seen: Arc<Mutex<Vec<TeamChatEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    client.events().subscribe(move |event| sink.lock().push(event.clone()));

    client.send_typing("C9").await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let seen = seen.lock();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].channel, "C9");
    assert_eq!(seen[0].text, "ping");
}

#[tokio::test]
async fn missing_acknowledgment_times_out() {
    let (url, _received) = fake_server(false).await;
    let client = SlackRtmClient::connect_url(&url, &config()).await.unwrap();

    let err = client.send_message("hello", "C1").await.unwrap_err();
    assert!(matches!(err, TransportError::Timeout(_)));
    assert_eq!(client.pending_ack_count(), 0);
}

#[tokio::test]
async fn closing_fails_further_sends() {
    let (url, _received) = fake_server(true).await;
    let client = SlackRtmClient::connect_url(&url, &config()).await.unwrap();

    client.close();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!client.is_connected());

    let err = client.send_message("late", "C1").await.unwrap_err();
    assert!(matches!(err, TransportError::ConnectionClosed { .. }));
}

#[tokio::test]
async fn disconnect_fails_sends_without_waiting_for_the_ack_timeout() {
    let url = hang_up_server().await;
    let client = SlackRtmClient::connect_url(&url, &config()).await.unwrap();

    let started = Instant::now();
    let err = client.send_message("hello", "C1").await.unwrap_err();
    assert!(matches!(err, TransportError::ConnectionClosed { .. }));
    assert!(started.elapsed() < Duration::from_millis(900));

    while client.is_connected() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let started = Instant::now();
    let err = client.send_message("late", "C1").await.unwrap_err();
    assert!(matches!(err, TransportError::ConnectionClosed { .. }));
    assert!(started.elapsed() < Duration::from_millis(900));
    assert_eq!(client.pending_ack_count(), 0);
}
