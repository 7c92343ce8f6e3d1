//! Telegram Bot Commands
//!
//! Parses `/start`, `/stats` and any other slash command out of message text.

/// A slash command recognised in message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Stats,
    /// Any other `/command`; counted as a command but not answered.
    Unknown(String),
}

impl BotCommand {
    /// Parse the first token of `text`. Returns `None` for plain (non-command) text.
    ///
    /// `/stats@SomeBot extra args` parses as [`BotCommand::Stats`].
    pub fn parse(text: &str) -> Option<Self> {
        if !is_command_text(text) {
            return None;
        }
        let token = text.split_whitespace().next().unwrap_or("/");
        let name = token[1..].split('@').next().unwrap_or_default();
        Some(match name {
            "start" => Self::Start,
            "stats" => Self::Stats,
            other => Self::Unknown(other.to_string()),
        })
    }
}

/// Whether a message counts as a command for the lifetime command counter.
pub fn is_command_text(text: &str) -> bool {
    text.starts_with('/')
}

/// Reply to `/start`.
pub const GREETING: &str = "Hello! I track live usage stats.\nUse /stats to view them.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_commands() {
        assert_eq!(BotCommand::parse("/start"), Some(BotCommand::Start));
        assert_eq!(BotCommand::parse("/stats"), Some(BotCommand::Stats));
        assert_eq!(BotCommand::parse("/stats@PulseBot now"), Some(BotCommand::Stats));
    }

    #[test]
    fn unknown_commands_still_count() {
        assert_eq!(
            BotCommand::parse("/help me"),
            Some(BotCommand::Unknown("help".into()))
        );
        assert_eq!(BotCommand::parse("/"), Some(BotCommand::Unknown(String::new())));
        assert!(is_command_text("/anything"));
    }

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(BotCommand::parse("hello /stats"), None);
        assert_eq!(BotCommand::parse(" /stats"), None);
        assert_eq!(BotCommand::parse(""), None);
        assert!(!is_command_text("hi"));
    }
}
