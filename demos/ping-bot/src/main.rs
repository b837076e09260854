//! Ping Bot
//!
//! Listens on both backends and answers any message containing `ping` with
//! `PONG`. Team chat takes commands by mention, guild chat by the `$` prefix.
//!
//! # Usage
//!
//! ```bash
//! SLACK_TOKEN_FILE=/run/secrets/slack DISCORD_TOKEN_FILE=/run/secrets/discord \
//!     cargo run --package ping-bot -- --config botfarm.toml
//! ```
//!
//! With a configuration such as:
//!
//! ```toml
//! [team_chat]
//! [guild_chat]
//!
//! [bots.cbf-test]
//! reply = "PONG"
//! ```

use std::path::PathBuf;

use anyhow::Result;
use botfarm::prelude::*;
use clap::Parser;
use tracing::info;

const BOT_ID: &str = "cbf-test";

#[derive(Debug, Parser)]
#[command(version, about = "Answers ping with PONG")]
struct Cli {
    /// Configuration file; searched for when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Configuration profile, e.g. `production`. Defaults to
    /// `BOTFARM_PROFILE`.
    #[arg(short, long)]
    profile: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct PingSettings {
    reply: String,
}

// ============================================================================
// Bot
// ============================================================================

async fn activate(ctx: FarmContext) -> Result<(), BoxError> {
    let settings: PingSettings = ctx.settings()?;
    let session = ctx
        .create(
            SessionOptions::new(ctx.bot_id())
                .with_team_chat(TeamChatOptions::new().command(CommandStyle::Mention))
                .with_guild_chat(GuildChatOptions::with_prefix("$")),
        )
        .await?;

    let reply = settings.reply;
    session.hear("ping", move |msg: Message| {
        let reply = reply.clone();
        async move {
            info!(backend = %msg.backend(), text = %msg.text(), "Heard ping");
            reply
        }
    })?;
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder = FarmRuntime::builder();
    if let Some(path) = &cli.config {
        builder = builder.config_file(path);
    }
    if let Some(profile) = &cli.profile {
        builder = builder.profile(profile);
    }
    let runtime = builder.build()?;

    runtime.register_bot(
        bot_fn(BOT_ID, activate)
            .with_defaults(serde_json::json!({ "reply": "PONG" })),
    )?;

    runtime.run().await?;
    Ok(())
}
