//! In-memory backends for router tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use botfarm_core::{
    EventListeners, FarmBus, GuildAuthor, GuildChannel, GuildChatEvent, GuildChatGateway,
    InMemoryBrain, RichMessage, SelfIdentity, SentMessage, TeamChatApi, TeamChatEvent,
    TeamChatHandles, TeamChatIdentity, TeamChatProvider, TeamChatRealtime, TeamIdentity,
    TransportError, TransportResult,
};
use botfarm_framework::SessionFactory;

pub const SELF_ID: &str = "UBOT";

/// Team-chat backend recording every outbound call.
#[derive(Default)]
pub struct FakeTeamChat {
    pub events: EventListeners<TeamChatEvent>,
    pub sent: Mutex<Vec<(String, String)>>,
    pub identity: Option<TeamChatIdentity>,
    pub connects: AtomicUsize,
    pub refuse: bool,
}

impl FakeTeamChat {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            identity: Some(TeamChatIdentity {
                user: SelfIdentity {
                    id: SELF_ID.into(),
                    name: "farmbot".into(),
                },
                team: TeamIdentity {
                    id: "T1".into(),
                    name: "Test Team".into(),
                    domain: "test".into(),
                },
            }),
            ..Default::default()
        })
    }

    pub fn without_identity() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn refusing() -> Arc<Self> {
        Arc::new(Self {
            refuse: true,
            ..Default::default()
        })
    }

    pub fn say(&self, text: &str) {
        self.events
            .emit(&TeamChatEvent::new("C1", "U1", "1700000000.000001", text));
    }

    pub fn handles(self: &Arc<Self>) -> TeamChatHandles {
        TeamChatHandles {
            realtime: Arc::clone(self) as Arc<dyn TeamChatRealtime>,
            api: Arc::clone(self) as Arc<dyn TeamChatApi>,
            identity: self.identity.clone(),
        }
    }
}

#[async_trait]
impl TeamChatRealtime for FakeTeamChat {
    fn events(&self) -> &EventListeners<TeamChatEvent> {
        &self.events
    }

    async fn send_message(&self, text: &str, channel: &str) -> TransportResult<SentMessage> {
        self.sent.lock().push((channel.to_owned(), text.to_owned()));
        Ok(SentMessage::new("1700000000.000002"))
    }

    async fn send_typing(&self, _channel: &str) -> TransportResult<()> {
        Ok(())
    }
}

#[async_trait]
impl TeamChatApi for FakeTeamChat {
    async fn post_message(&self, message: RichMessage) -> TransportResult<SentMessage> {
        self.sent.lock().push((message.channel, message.text));
        Ok(SentMessage::new("1700000000.000003"))
    }

    async fn add_reaction(&self, _name: &str, _channel: &str, _ts: &str) -> TransportResult<()> {
        Ok(())
    }

    async fn remove_reaction(&self, _name: &str, _channel: &str, _ts: &str) -> TransportResult<()> {
        Ok(())
    }
}

/// Provider handing out the shared fake's handles.
pub struct FakeTeamChatProvider(pub Arc<FakeTeamChat>);

#[async_trait]
impl TeamChatProvider for FakeTeamChatProvider {
    async fn connect(&self) -> TransportResult<TeamChatHandles> {
        if self.0.refuse {
            return Err(TransportError::ConnectionFailed {
                url: "wss://fake".into(),
                reason: "refused".into(),
            });
        }
        self.0.connects.fetch_add(1, Ordering::SeqCst);
        Ok(self.0.handles())
    }
}

/// Guild-chat channel recording sends; each send yields `per_send` messages.
pub struct FakeChannel {
    pub id: String,
    pub sent: Mutex<Vec<String>>,
    pub typing: Mutex<Vec<&'static str>>,
    pub per_send: usize,
}

impl FakeChannel {
    pub fn new(per_send: usize) -> Arc<Self> {
        Arc::new(Self {
            id: "chan-1".into(),
            sent: Mutex::new(Vec::new()),
            typing: Mutex::new(Vec::new()),
            per_send,
        })
    }
}

#[async_trait]
impl GuildChannel for FakeChannel {
    fn id(&self) -> &str {
        &self.id
    }

    async fn send(&self, text: &str) -> TransportResult<Vec<SentMessage>> {
        self.sent.lock().push(text.to_owned());
        Ok((0..self.per_send)
            .map(|i| SentMessage::new(format!("reply-{i}")))
            .collect())
    }

    async fn start_typing(&self) -> TransportResult<()> {
        self.typing.lock().push("start");
        Ok(())
    }

    async fn stop_typing(&self) -> TransportResult<()> {
        self.typing.lock().push("stop");
        Ok(())
    }

    async fn react(&self, _message_id: &str, _emoji: &str) -> TransportResult<()> {
        Ok(())
    }
}

/// Guild-chat gateway delivering whatever the test says.
#[derive(Default)]
pub struct FakeGateway {
    pub events: EventListeners<GuildChatEvent>,
}

impl FakeGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn say(&self, channel: &Arc<FakeChannel>, content: &str) {
        self.events.emit(&GuildChatEvent {
            id: "msg-1".into(),
            content: content.into(),
            channel_id: channel.id.clone(),
            guild_id: Some("guild-1".into()),
            author: GuildAuthor {
                id: "user-1".into(),
                username: "someone".into(),
                bot: false,
            },
            channel: Arc::clone(channel) as Arc<dyn GuildChannel>,
        });
    }
}

impl GuildChatGateway for FakeGateway {
    fn events(&self) -> &EventListeners<GuildChatEvent> {
        &self.events
    }
}

/// A farm with both fake backends.
pub struct Farm {
    pub team: Arc<FakeTeamChat>,
    pub guild: Arc<FakeGateway>,
    pub brain: InMemoryBrain,
    pub bus: FarmBus,
    pub factory: SessionFactory,
}

impl Farm {
    pub fn new() -> Self {
        Self::with_team(FakeTeamChat::new())
    }

    pub fn with_team(team: Arc<FakeTeamChat>) -> Self {
        let guild = FakeGateway::new();
        let brain = InMemoryBrain::new();
        let bus = FarmBus::new();
        let factory = SessionFactory::new(Arc::new(brain.clone()), bus.clone())
            .with_team_chat(Arc::new(FakeTeamChatProvider(Arc::clone(&team))))
            .with_guild_chat(Arc::clone(&guild) as _);
        Self {
            team,
            guild,
            brain,
            bus,
            factory,
        }
    }
}

/// Counts callback invocations.
#[derive(Clone, Default)]
pub struct Hits(Arc<AtomicUsize>);

impl Hits {
    pub fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Lets spawned callbacks run to completion.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}
