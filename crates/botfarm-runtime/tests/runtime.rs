//! Runtime lifecycle against an in-memory team-chat backend.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::json;

use botfarm_core::{
    BoxError, EventListeners, Message, RichMessage, SelfIdentity, SentMessage, TeamChatApi,
    TeamChatEvent, TeamChatHandles, TeamChatIdentity, TeamChatProvider, TeamChatRealtime,
    TeamIdentity, TransportResult,
};
use botfarm_framework::{SessionOptions, TeamChatOptions};
use botfarm_runtime::{FarmConfig, FarmContext, FarmRuntime, RuntimeError, bot_fn};

#[derive(Default)]
struct FakeTeamChat {
    events: EventListeners<TeamChatEvent>,
    sent: Mutex<Vec<String>>,
    connects: AtomicUsize,
}

impl FakeTeamChat {
    fn say(&self, text: &str) {
        self.events
            .emit(&TeamChatEvent::new("C1", "U1", "1700000000.000001", text));
    }

    fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl TeamChatRealtime for FakeTeamChat {
    fn events(&self) -> &EventListeners<TeamChatEvent> {
        &self.events
    }

    async fn send_message(&self, text: &str, _channel: &str) -> TransportResult<SentMessage> {
        self.sent.lock().push(text.to_owned());
        Ok(SentMessage::new("1700000000.000002"))
    }

    async fn send_typing(&self, _channel: &str) -> TransportResult<()> {
        Ok(())
    }
}

#[async_trait]
impl TeamChatApi for FakeTeamChat {
    async fn post_message(&self, message: RichMessage) -> TransportResult<SentMessage> {
        self.sent.lock().push(message.text);
        Ok(SentMessage::new("1700000000.000003"))
    }

    async fn add_reaction(&self, _name: &str, _channel: &str, _ts: &str) -> TransportResult<()> {
        Ok(())
    }

    async fn remove_reaction(&self, _name: &str, _channel: &str, _ts: &str) -> TransportResult<()> {
        Ok(())
    }
}

struct FakeProvider(Arc<FakeTeamChat>);

#[async_trait]
impl TeamChatProvider for FakeProvider {
    async fn connect(&self) -> TransportResult<TeamChatHandles> {
        self.0.connects.fetch_add(1, Ordering::SeqCst);
        Ok(TeamChatHandles {
            realtime: Arc::clone(&self.0) as Arc<dyn TeamChatRealtime>,
            api: Arc::clone(&self.0) as Arc<dyn TeamChatApi>,
            identity: Some(TeamChatIdentity {
                user: SelfIdentity {
                    id: "UBOT".into(),
                    name: "farmbot".into(),
                },
                team: TeamIdentity {
                    id: "T1".into(),
                    name: "Test Team".into(),
                    domain: "test".into(),
                },
            }),
        })
    }
}

fn runtime_with(config: FarmConfig) -> (FarmRuntime, Arc<FakeTeamChat>) {
    let team = Arc::new(FakeTeamChat::default());
    let runtime = FarmRuntime::from_config(config)
        .with_team_chat(Arc::new(FakeProvider(Arc::clone(&team))));
    (runtime, team)
}

fn ping_bot(id: &'static str) -> impl botfarm_runtime::BotDefinition {
    bot_fn(id, |ctx: FarmContext| async move {
        let session = ctx
            .create(SessionOptions::new(ctx.bot_id()).with_team_chat(TeamChatOptions::new()))
            .await?;
        session.hear("ping", |_msg: Message| async { "PONG".to_owned() })?;
        Ok::<_, BoxError>(())
    })
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::test]
async fn started_bots_answer_messages() {
    let (runtime, team) = runtime_with(FarmConfig::default());
    runtime.register_bot(ping_bot("cbf-test")).unwrap();
    runtime.start().await.unwrap();

    assert!(runtime.is_started());
    assert_eq!(runtime.bus().pending_for("cbf-test"), 1);

    team.say("ping");
    settle().await;
    assert_eq!(team.sent(), vec!["PONG"]);
}

#[tokio::test]
async fn failing_activation_does_not_stop_other_bots() {
    let (runtime, team) = runtime_with(FarmConfig::default());
    runtime
        .register_bot(bot_fn("broken", |_ctx: FarmContext| async {
            Err::<(), BoxError>("missing channel list".into())
        }))
        .unwrap();
    runtime.register_bot(ping_bot("cbf-test")).unwrap();
    runtime.start().await.unwrap();

    team.say("ping");
    settle().await;
    assert_eq!(team.sent(), vec!["PONG"]);

    let err = runtime.activate("broken").await.unwrap_err();
    assert!(matches!(err, RuntimeError::Activation { ref bot_id, .. } if bot_id == "broken"));
}

#[tokio::test]
async fn reload_replaces_only_that_bots_listeners() {
    let (runtime, team) = runtime_with(FarmConfig::default());
    runtime.register_bot(ping_bot("first")).unwrap();
    runtime.register_bot(ping_bot("second")).unwrap();
    runtime.start().await.unwrap();

    runtime.reload("first").await.unwrap();
    assert_eq!(runtime.bus().pending_for("first"), 1);
    assert_eq!(runtime.bus().pending_for("second"), 1);

    team.say("ping");
    settle().await;
    assert_eq!(team.sent().len(), 2);

    // Every session creation asks the provider; listeners stay at one per bot.
    assert_eq!(team.connects.load(Ordering::SeqCst), 3);
    assert_eq!(team.events.len(), 2);
}

#[tokio::test]
async fn reload_of_unknown_bot_fails() {
    let (runtime, _team) = runtime_with(FarmConfig::default());
    runtime.start().await.unwrap();
    assert!(matches!(
        runtime.reload("ghost").await,
        Err(RuntimeError::BotNotFound(id)) if id == "ghost"
    ));
}

#[tokio::test]
async fn activation_before_start_is_rejected() {
    let (runtime, _team) = runtime_with(FarmConfig::default());
    runtime.register_bot(ping_bot("cbf-test")).unwrap();
    assert!(matches!(
        runtime.activate("cbf-test").await,
        Err(RuntimeError::NotStarted)
    ));
}

#[tokio::test]
async fn shutdown_silences_every_bot_once() {
    let (runtime, team) = runtime_with(FarmConfig::default());
    runtime.register_bot(ping_bot("cbf-test")).unwrap();

    let cleanups = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&cleanups);
    runtime
        .register_bot(bot_fn("counter", move |ctx: FarmContext| {
            let counter = Arc::clone(&counter);
            async move {
                ctx.bus().on_shutdown(ctx.bot_id(), move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                });
                Ok::<_, BoxError>(())
            }
        }))
        .unwrap();

    runtime
        .run_until(async {
            settle().await;
        })
        .await
        .unwrap();
    runtime.shutdown().await.unwrap();

    assert_eq!(cleanups.load(Ordering::SeqCst), 1);
    assert_eq!(runtime.bus().pending(), 0);
    assert!(!runtime.is_started());

    team.say("ping");
    settle().await;
    assert!(team.sent().is_empty());
}

#[derive(Debug, Deserialize, PartialEq)]
struct GreeterSettings {
    greeting: String,
    shout: bool,
}

#[tokio::test]
async fn bots_read_their_own_settings_section() {
    let mut config = FarmConfig::default();
    config.bots.insert(
        "greeter".into(),
        figment::value::Value::serialize(json!({"greeting": "hello"})).unwrap(),
    );
    let (runtime, _team) = runtime_with(config);

    let seen = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&seen);
    runtime
        .register_bot(
            bot_fn("greeter", move |ctx: FarmContext| {
                let slot = Arc::clone(&slot);
                async move {
                    let settings: GreeterSettings = ctx.settings()?;
                    *slot.lock() = Some(settings);
                    Ok::<_, BoxError>(())
                }
            })
            .with_defaults(json!({"greeting": "hi", "shout": false})),
        )
        .unwrap();
    runtime.start().await.unwrap();

    assert_eq!(
        *seen.lock(),
        Some(GreeterSettings {
            greeting: "hello".into(),
            shout: false,
        })
    );
}

#[tokio::test]
async fn enabled_backend_without_token_fails_to_start() {
    if std::env::var_os("SLACK_TOKEN").is_some() || std::env::var_os("SLACK_TOKEN_FILE").is_some()
    {
        return;
    }
    let config = FarmConfig {
        team_chat: Some(Default::default()),
        ..Default::default()
    };
    let runtime = FarmRuntime::from_config(config);
    let err = runtime.start().await.unwrap_err();
    assert_eq!(err.to_string(), "Secret SLACK_TOKEN not mounted");
    assert!(!runtime.is_started());
}
