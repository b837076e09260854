//! Listener patterns and command prefix rules.
//!
//! A [`Pattern`] is what bot code passes to `hear`/`command`: either text
//! (compiled case-insensitively) or an already compiled regex (used as is).
//!
//! Commands wrap the pattern in a [`CommandPrefix`]:
//!
//! | Rule | Compiled pattern |
//! |------|------------------|
//! | [`CommandPrefix::TeamPrefix`] | `^<escaped prefix>(<body>)` |
//! | [`CommandPrefix::TeamMention`] | `^<@<self id>>\s(<body>)` |
//! | [`CommandPrefix::GuildPrefix`] | `<escaped prefix>(<body>)` |
//!
//! Prefix strings are always escaped. Command patterns are case-insensitive.
//! The body is wrapped in a group so that alternations stay behind the prefix,
//! and the match groups handed to the callback start at that group: index 0
//! is the command text without its prefix.

use regex_lite::{Regex, RegexBuilder};

use botfarm_core::{Backend, MatchGroups};

use crate::error::{RegistrationError, RegistrationResult};

/// A listener pattern as supplied by bot code.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Pattern source; compiled case-insensitively.
    Text(String),
    /// A compiled regex, used with its own flags.
    Regex(Regex),
}

impl Pattern {
    /// The pattern source.
    pub fn source(&self) -> &str {
        match self {
            Self::Text(s) => s,
            Self::Regex(re) => re.as_str(),
        }
    }

    /// Compiles the pattern for a plain `hear` listener.
    pub fn compile(self) -> RegistrationResult<CompiledPattern> {
        let regex = match self {
            Self::Text(source) => case_insensitive(&source)?,
            Self::Regex(regex) => regex,
        };
        Ok(CompiledPattern {
            regex,
            command: false,
        })
    }
}

impl From<&str> for Pattern {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Pattern {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Regex> for Pattern {
    fn from(value: Regex) -> Self {
        Self::Regex(value)
    }
}

impl From<&Regex> for Pattern {
    fn from(value: &Regex) -> Self {
        Self::Regex(value.clone())
    }
}

/// How a bare command pattern is prefixed on one backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandPrefix {
    /// Team-chat prefix style, anchored at the start of the text.
    TeamPrefix(String),
    /// Team-chat mention style; holds the bot's own user id.
    TeamMention(String),
    /// Guild-chat prefix. Not anchored: the prefix may appear anywhere.
    GuildPrefix(String),
}

impl CommandPrefix {
    /// The backend this rule applies to.
    pub fn backend(&self) -> Backend {
        match self {
            Self::TeamPrefix(_) | Self::TeamMention(_) => Backend::TeamChat,
            Self::GuildPrefix(_) => Backend::GuildChat,
        }
    }

    /// The pattern source matched in front of the command body.
    pub fn source(&self) -> String {
        match self {
            Self::TeamPrefix(prefix) => format!("^{}", regex_lite::escape(prefix)),
            Self::TeamMention(id) => format!(r"^<@{}>\s", regex_lite::escape(id)),
            Self::GuildPrefix(prefix) => regex_lite::escape(prefix),
        }
    }

    /// Compiles `body` behind this prefix.
    pub fn apply(&self, body: &Pattern) -> RegistrationResult<CompiledPattern> {
        let source = format!("{}({})", self.source(), body.source());
        Ok(CompiledPattern {
            regex: case_insensitive(&source)?,
            command: true,
        })
    }
}

/// A pattern ready to be tested against incoming text.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
    command: bool,
}

impl CompiledPattern {
    /// The compiled regex source.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Tests `text`, returning the match groups on success.
    pub fn match_text(&self, text: &str) -> Option<MatchGroups> {
        let captures = self.regex.captures(text)?;
        let groups = if self.command {
            MatchGroups::new(
                captures
                    .iter()
                    .skip(1)
                    .map(|m| m.map(|m| m.as_str().to_owned()))
                    .collect(),
            )
        } else {
            MatchGroups::from_captures(&captures)
        };
        Some(groups)
    }
}

fn case_insensitive(source: &str) -> RegistrationResult<Regex> {
    RegexBuilder::new(source)
        .case_insensitive(true)
        .build()
        .map_err(|e| RegistrationError::InvalidPattern {
            pattern: source.to_owned(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_patterns_ignore_case() {
        let pattern = Pattern::from("ping").compile().unwrap();
        let groups = pattern.match_text("say PING now").unwrap();
        assert_eq!(&groups[0], "PING");
        assert!(pattern.match_text("pong").is_none());
    }

    #[test]
    fn compiled_regex_keeps_its_flags() {
        let pattern = Pattern::from(Regex::new("ping").unwrap()).compile().unwrap();
        assert!(pattern.match_text("ping").is_some());
        assert!(pattern.match_text("PING").is_none());
    }

    #[test]
    fn invalid_text_pattern_is_rejected() {
        let err = Pattern::from("(unclosed").compile().unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidPattern { .. }));
    }

    #[test]
    fn prefix_punctuation_is_literal() {
        let rule = CommandPrefix::TeamPrefix(".*".into());
        let pattern = rule.apply(&Pattern::from("ping")).unwrap();
        assert!(pattern.match_text(".*ping").is_some());
        assert!(pattern.match_text("xxping").is_none());
    }

    #[test]
    fn guild_prefix_strips_prefix_from_group_zero() {
        let rule = CommandPrefix::GuildPrefix("$".into());
        let pattern = rule.apply(&Pattern::from(r"roll (\d+)")).unwrap();
        let groups = pattern.match_text("$ROLL 20").unwrap();
        assert_eq!(&groups[0], "ROLL 20");
        assert_eq!(&groups[1], "20");
        assert!(pattern.match_text("roll 20").is_none());
    }

    #[test]
    fn guild_prefix_is_not_anchored() {
        let rule = CommandPrefix::GuildPrefix("$".into());
        let pattern = rule.apply(&Pattern::from("ping")).unwrap();
        assert!(pattern.match_text("hey $ping").is_some());
    }

    #[test]
    fn mention_requires_leading_mention_and_whitespace() {
        let rule = CommandPrefix::TeamMention("U123".into());
        let pattern = rule.apply(&Pattern::from("ping")).unwrap();
        assert!(pattern.match_text("<@U123> ping").is_some());
        assert!(pattern.match_text("<@U123>ping").is_none());
        assert!(pattern.match_text("hi <@U123> ping").is_none());
        assert_eq!(rule.backend(), Backend::TeamChat);
    }

    #[test]
    fn alternation_stays_behind_the_prefix() {
        let rule = CommandPrefix::TeamPrefix("!".into());
        let pattern = rule.apply(&Pattern::from("ping|pong")).unwrap();
        assert!(pattern.match_text("!pong").is_some());
        assert!(pattern.match_text("pong").is_none());
    }
}
