mod common;

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;

use botfarm_core::Message;
use botfarm_framework::{GuildChatOptions, SessionOptions, TeamChatOptions};
use common::{FakeChannel, Farm, Hits, settle};

#[tokio::test]
async fn shutdown_runs_each_session_cleanup_once_in_order() {
    let farm = Farm::new();
    let first = farm
        .factory
        .create(SessionOptions::new("first").with_team_chat(TeamChatOptions::new()))
        .await
        .unwrap();
    let second = farm
        .factory
        .create(SessionOptions::new("second").with_team_chat(TeamChatOptions::new()))
        .await
        .unwrap();

    let order = Arc::new(Mutex::new(Vec::new()));
    for session in [&first, &second] {
        let order = Arc::clone(&order);
        let id = session.id().to_owned();
        session.bus().on_shutdown(session.id(), move || {
            order.lock().push(id);
            Ok(())
        });
    }

    farm.bus.announce_shutdown().unwrap();
    assert_eq!(*order.lock(), vec!["first", "second"]);

    farm.bus.announce_reload("first").unwrap();
    farm.bus.announce_reload("second").unwrap();
    assert_eq!(order.lock().len(), 2);
}

#[tokio::test]
async fn reload_then_shutdown_is_idempotent_for_listeners() {
    let farm = Farm::new();
    let session = farm
        .factory
        .create(
            SessionOptions::new("bot")
                .with_team_chat(TeamChatOptions::new())
                .with_guild_chat(GuildChatOptions::with_prefix("$")),
        )
        .await
        .unwrap();

    let hits = Hits::default();
    let counter = hits.clone();
    session
        .hear("ping", move |_msg: Message| {
            let counter = counter.clone();
            async move { counter.bump() }
        })
        .unwrap();
    assert_eq!(farm.bus.pending_for("bot"), 2);

    farm.bus.announce_reload("bot").unwrap();
    farm.bus.announce_shutdown().unwrap();

    farm.team.say("ping");
    farm.guild.say(&FakeChannel::new(1), "ping");
    settle().await;
    assert_eq!(hits.get(), 0);
}

#[tokio::test]
async fn recreated_session_listens_again_after_reload() {
    let farm = Farm::new();
    let options = SessionOptions::new("reloadable").with_team_chat(TeamChatOptions::new());
    let hits = Hits::default();

    for _ in 0..2 {
        farm.bus.announce_reload("reloadable").unwrap();
        let session = farm.factory.create(options.clone()).await.unwrap();
        let counter = hits.clone();
        session
            .hear("ping", move |_msg: Message| {
                let counter = counter.clone();
                async move { counter.bump() }
            })
            .unwrap();
    }

    farm.team.say("ping");
    settle().await;
    assert_eq!(hits.get(), 1);
    assert_eq!(farm.team.connects.load(std::sync::atomic::Ordering::SeqCst), 2);
}

#[tokio::test]
async fn legacy_brain_is_namespaced_per_session() {
    let farm = Farm::new();
    let a = farm.factory.create(SessionOptions::new("a")).await.unwrap();
    let b = farm.factory.create(SessionOptions::new("b")).await.unwrap();

    let value = json!({"count": 3, "names": ["x", "y"]});
    a.hubot_compat().brain().set("shared", &value).unwrap();

    let read: Option<serde_json::Value> = a.hubot_compat().brain().get("shared").unwrap();
    assert_eq!(read, Some(value));
    let other: Option<serde_json::Value> = b.hubot_compat().brain().get("shared").unwrap();
    assert_eq!(other, None);

    assert_eq!(
        a.brain().get("hubot/shared").as_deref(),
        Some(r#"{"count":3,"names":["x","y"]}"#)
    );
    assert_eq!(farm.brain.len(), 1);
}
