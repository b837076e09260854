//! Lazily connected team-chat provider.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::info;

use botfarm_core::{TeamChatHandles, TeamChatIdentity, TeamChatProvider, TransportResult};

use crate::config::SlackConfig;
use crate::rtm::SlackRtmClient;
use crate::web::SlackWebClient;

struct Connected {
    rtm: Arc<SlackRtmClient>,
    handles: TeamChatHandles,
}

/// Team-chat provider backed by the realtime socket and the Web API.
///
/// The first [`connect`](TeamChatProvider::connect) calls `rtm.connect`,
/// opens the socket and records the bot identity. Later calls (from other
/// sessions, or a reloaded one) reuse the same connection.
pub struct SlackProvider {
    config: SlackConfig,
    web: Arc<SlackWebClient>,
    connected: OnceCell<Connected>,
}

impl SlackProvider {
    /// Creates a provider. No network traffic happens until the first connect.
    pub fn new(config: SlackConfig) -> TransportResult<Self> {
        let web = Arc::new(SlackWebClient::new(&config)?);
        Ok(Self {
            config,
            web,
            connected: OnceCell::new(),
        })
    }

    /// The Web API client.
    pub fn web(&self) -> &Arc<SlackWebClient> {
        &self.web
    }

    /// Returns true once the realtime socket has been opened and is still up.
    pub fn is_connected(&self) -> bool {
        self.connected
            .get()
            .is_some_and(|c| c.rtm.is_connected())
    }

    /// Closes the realtime socket if it was opened.
    pub fn shutdown(&self) {
        if let Some(connected) = self.connected.get() {
            info!("Closing team-chat realtime socket");
            connected.rtm.close();
        }
    }

    async fn open(&self) -> TransportResult<Connected> {
        let info = self.web.rtm_connect().await?;
        info!(
            user = %info.user.name,
            team = %info.team.name,
            "Team-chat realtime session granted"
        );

        let rtm = SlackRtmClient::connect_url(&info.url, &self.config).await?;
        let handles = TeamChatHandles {
            realtime: rtm.clone(),
            api: self.web.clone(),
            identity: Some(TeamChatIdentity {
                user: info.user,
                team: info.team,
            }),
        };
        Ok(Connected { rtm, handles })
    }
}

#[async_trait]
impl TeamChatProvider for SlackProvider {
    async fn connect(&self) -> TransportResult<TeamChatHandles> {
        let connected = self.connected.get_or_try_init(|| self.open()).await?;
        Ok(connected.handles.clone())
    }
}

impl std::fmt::Debug for SlackProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackProvider")
            .field("config", &self.config)
            .field("connected", &self.is_connected())
            .finish()
    }
}
