//! Configuration validation utilities.

use botfarm_adapter_discord::DiscordConfig;
use botfarm_adapter_slack::SlackConfig;

use super::error::{ConfigError, ConfigResult};
use super::schema::{FarmConfig, LogOutput, LoggingConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &FarmConfig) -> ConfigResult<()> {
    validate_logging(&config.logging)?;
    if let Some(team_chat) = &config.team_chat {
        validate_team_chat(team_chat)?;
    }
    if let Some(guild_chat) = &config.guild_chat {
        validate_guild_chat(guild_chat)?;
    }
    for id in config.bots.keys() {
        validate_bot_id(id)?;
    }
    Ok(())
}

/// Checks a bot id used as a session id and `[bots.<id>]` key.
pub fn validate_bot_id(id: &str) -> ConfigResult<()> {
    if id.is_empty() {
        return Err(ConfigError::validation("Bot ID cannot be empty"));
    }
    if id.chars().any(char::is_whitespace) {
        return Err(ConfigError::validation(format!(
            "Bot ID cannot contain whitespace: {id:?}"
        )));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "logging.file_path is required when logging.output = \"file\"",
        ));
    }
    Ok(())
}

fn validate_team_chat(config: &SlackConfig) -> ConfigResult<()> {
    validate_url(&config.api_url, &["http://", "https://"], "team_chat.api_url")?;
    if config.ack_timeout_secs == 0 {
        return Err(ConfigError::validation(
            "team_chat.ack_timeout_secs must be greater than 0",
        ));
    }
    Ok(())
}

fn validate_guild_chat(config: &DiscordConfig) -> ConfigResult<()> {
    validate_url(&config.api_url, &["http://", "https://"], "guild_chat.api_url")?;
    validate_url(&config.gateway_url, &["ws://", "wss://"], "guild_chat.gateway_url")?;
    if config.typing_interval_secs == 0 {
        return Err(ConfigError::validation(
            "guild_chat.typing_interval_secs must be greater than 0",
        ));
    }
    Ok(())
}

fn validate_url(url: &str, schemes: &[&str], field: &str) -> ConfigResult<()> {
    if !schemes.iter().any(|s| url.starts_with(s)) {
        return Err(ConfigError::validation(format!(
            "{field} must start with one of {schemes:?}, got {url:?}"
        )));
    }
    Ok(())
}
