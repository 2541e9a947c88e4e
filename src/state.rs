//! UI-agnostic chat state types
//!
//! These are shared by the TUI and the one-shot `ask` command and don't
//! depend on any terminal framework.

use serde::{Deserialize, Serialize};

/// A single entry in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub content: String,
    pub is_user: bool,
    pub sources: Vec<String>,
    pub is_error: bool,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_user: true,
            sources: Vec::new(),
            is_error: false,
        }
    }

    pub fn bot(content: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            content: content.into(),
            is_user: false,
            sources,
            is_error: false,
        }
    }

    /// Bot-side message flagged as an error
    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_user: false,
            sources: Vec::new(),
            is_error: true,
        }
    }
}

/// Visibility of the chat panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WidgetState {
    #[default]
    Closed,
    Open,
}

impl WidgetState {
    pub fn toggle(&mut self) {
        *self = match self {
            WidgetState::Closed => WidgetState::Open,
            WidgetState::Open => WidgetState::Closed,
        };
    }

    pub fn is_open(&self) -> bool {
        *self == WidgetState::Open
    }
}
