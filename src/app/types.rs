use std::time::{Duration, Instant};

/// Menu item for the command palette
#[derive(Debug, Clone)]
pub struct MenuItem {
    pub name: String,
    pub description: String,
}

/// Which pane receives keyboard input in chat mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    Input,
}

#[derive(Debug, Clone)]
pub struct StatusToast {
    pub message: String,
    pub created_at: Instant,
}

impl StatusToast {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            created_at: Instant::now(),
        }
    }

    #[must_use]
    pub fn is_expired(&self, duration: Duration) -> bool {
        self.created_at.elapsed() >= duration
    }
}

/// Prefix that marks chat input as a command rather than a prompt
pub const COMMAND_PREFIX: char = ':';

/// Command typed into the chat input instead of a prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    Attach(Vec<String>),
    Detach(String),
}

impl InputCommand {
    /// Recognizes `:attach <path>...` and `:detach <name>`
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim().strip_prefix(COMMAND_PREFIX)?;
        let (word, rest) = trimmed
            .split_once(char::is_whitespace)
            .map_or((trimmed, ""), |(word, rest)| (word, rest.trim()));
        match word {
            "attach" => Some(Self::Attach(
                rest.split_whitespace().map(str::to_string).collect(),
            )),
            "detach" => Some(Self::Detach(rest.to_string())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_attach_paths() {
        assert_eq!(
            InputCommand::parse(":attach ./a.pdf  /tmp/b.png"),
            Some(InputCommand::Attach(vec![
                "./a.pdf".to_string(),
                "/tmp/b.png".to_string()
            ]))
        );
        assert_eq!(
            InputCommand::parse(":attach"),
            Some(InputCommand::Attach(Vec::new()))
        );
    }

    #[test]
    fn test_parse_detach_keeps_spaces_in_name() {
        assert_eq!(
            InputCommand::parse(":detach  annual report.pdf "),
            Some(InputCommand::Detach("annual report.pdf".to_string()))
        );
    }

    #[test]
    fn test_prompts_are_not_commands() {
        assert_eq!(InputCommand::parse("summarize the attachment"), None);
        assert_eq!(InputCommand::parse("attachments?"), None);
        assert_eq!(
            InputCommand::parse("attach a risk summary to the report"),
            None
        );
        assert_eq!(InputCommand::parse("detach the appendix"), None);
        assert_eq!(InputCommand::parse(":summarize"), None);
        assert_eq!(InputCommand::parse(""), None);
    }
}
