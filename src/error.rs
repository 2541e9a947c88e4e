use thiserror::Error;

/// Every way a single dispatch can fail. All of these end up as an
/// error-flagged message in the conversation; none reach the caller as a crash.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("Please wait a moment before sending another message.")]
    RateLimited,
    #[error("HTTP error! status: {status}")]
    Http { status: u16 },
    #[error("{0}")]
    Transport(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, ChatError>;

impl ChatError {
    /// Text shown in the chat for this error.
    pub fn display_text(&self) -> String {
        match self {
            ChatError::RateLimited => self.to_string(),
            other => format!("Error: {}", other),
        }
    }
}
