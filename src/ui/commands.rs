/// One line typed at the chat prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Prompt(String),
    NewChat,
    History,
    Status,
    Help,
    Quit,
    Unknown(String),
    Empty,
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ReplCommand::Empty;
        }
        if !line.starts_with('/') {
            return ReplCommand::Prompt(line.to_string());
        }

        match line.split_whitespace().next().unwrap_or(line) {
            "/new" | "/clear" => ReplCommand::NewChat,
            "/history" => ReplCommand::History,
            "/status" => ReplCommand::Status,
            "/help" | "/?" => ReplCommand::Help,
            "/quit" | "/exit" => ReplCommand::Quit,
            other => ReplCommand::Unknown(other.to_string()),
        }
    }
}
