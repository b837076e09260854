//! Gateway session against a local socket server.

use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use botfarm_adapter_discord::{DiscordConfig, DiscordGateway};
use botfarm_core::{GuildChatEvent, GuildChatGateway};

/// Runs one gateway session: HELLO, wait for IDENTIFY, wait for `go`, then
/// READY, two messages and a heartbeat request. Every client frame is logged.
async fn fake_gateway(go: oneshot::Receiver<()>) -> (String, Arc<Mutex<Vec<Value>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let received = Arc::new(Mutex::new(Vec::new()));
    let log = received.clone();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        let send = |v: Value| WsMessage::Text(v.to_string().into());

        ws.send(send(json!({"op": 10, "d": {"heartbeat_interval": 45000}})))
            .await
            .unwrap();

        let Some(Ok(WsMessage::Text(identify))) = ws.next().await else {
            return;
        };
        log.lock()
            .push(serde_json::from_str(identify.as_str()).unwrap());
        let _ = go.await;

        let author = json!({"id": "44", "username": "alice"});
        ws.send(send(json!({
            "op": 0, "s": 1, "t": "READY",
            "d": {"session_id": "sess-1", "user": {"id": "99", "username": "farmbot", "bot": true}},
        })))
        .await
        .unwrap();
        for (seq, id, content) in [(2, "m1", "$ping"), (3, "m2", "hello there")] {
            ws.send(send(json!({
                "op": 0, "s": seq, "t": "MESSAGE_CREATE",
                "d": {"id": id, "channel_id": "22", "guild_id": "33", "content": content, "author": author},
            })))
            .await
            .unwrap();
        }
        ws.send(send(json!({"op": 1, "d": null}))).await.unwrap();

        while let Some(Ok(msg)) = ws.next().await {
            if let WsMessage::Text(text) = msg {
                log.lock().push(serde_json::from_str(text.as_str()).unwrap());
            }
        }
    });

    (format!("ws://{addr}"), received)
}

#[tokio::test]
async fn identifies_and_emits_message_events() {
    let (go_tx, go_rx) = oneshot::channel();
    let (url, received) = fake_gateway(go_rx).await;
    let gateway = DiscordGateway::connect_url(&url, DiscordConfig::new("bot-token"))
        .await
        .unwrap();

    let seen: Arc<Mutex<Vec<GuildChatEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    gateway
        .events()
        .subscribe(move |event| sink.lock().push(event.clone()));
    go_tx.send(()).unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;

    let frames = received.lock().clone();
    assert_eq!(frames[0]["op"], 2);
    assert_eq!(frames[0]["d"]["token"], "bot-token");
    assert_eq!(frames[0]["d"]["intents"], 37376);
    // The server's heartbeat request is answered with the last sequence.
    assert_eq!(frames[1], json!({"op": 1, "d": 3}));

    let seen = seen.lock();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].content, "$ping");
    assert_eq!(seen[0].guild_id.as_deref(), Some("33"));
    assert_eq!(seen[1].author.username, "alice");
    assert_eq!(seen[1].channel.id(), "22");

    assert_eq!(gateway.current_user().unwrap().username, "farmbot");
    assert!(Arc::ptr_eq(&gateway.channel("22"), &gateway.channel("22")));
}

#[tokio::test]
async fn close_disconnects() {
    let (_go_tx, go_rx) = oneshot::channel();
    let (url, _received) = fake_gateway(go_rx).await;
    let gateway = DiscordGateway::connect_url(&url, DiscordConfig::new("bot-token"))
        .await
        .unwrap();
    assert!(gateway.is_connected());

    gateway.close();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!gateway.is_connected());
}
