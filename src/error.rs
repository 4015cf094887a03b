use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Invocation,
    Config,
}

#[derive(Debug)]
pub enum ChatError {
    /// Connection refused, timeout, non-200 status or an unparseable body.
    Transport(String),
    /// Failure while driving the agent or one of its tool subprocesses.
    Invocation(String),
    Config(String),
}

impl ChatError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChatError::Transport(_) => ErrorKind::Transport,
            ChatError::Invocation(_) => ErrorKind::Invocation,
            ChatError::Config(_) => ErrorKind::Config,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ChatError::Transport(msg) | ChatError::Invocation(msg) | ChatError::Config(msg) => msg,
        }
    }

    pub fn http_status(status: u16, body: &str) -> Self {
        if body.trim().is_empty() {
            ChatError::Transport(format!("HTTP error! status: {}", status))
        } else {
            ChatError::Transport(format!(
                "HTTP error! status: {}, message: {}",
                status,
                body.trim()
            ))
        }
    }
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatError::Transport(msg) => write!(f, "Transport error: {}", msg),
            ChatError::Invocation(msg) => write!(f, "Invocation error: {}", msg),
            ChatError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for ChatError {}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        ChatError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        ChatError::Transport(format!("invalid JSON: {}", err))
    }
}

impl From<std::io::Error> for ChatError {
    fn from(err: std::io::Error) -> Self {
        ChatError::Invocation(err.to_string())
    }
}

impl From<anyhow::Error> for ChatError {
    fn from(err: anyhow::Error) -> Self {
        ChatError::Config(format!("{:#}", err))
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;
