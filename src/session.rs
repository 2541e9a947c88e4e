//! Rate-limited dispatcher
//!
//! `ChatSession` owns the conversation, the input field, the busy flag and the
//! rate gate. A dispatch is split into `submit` (synchronous, appends the user
//! message) and `complete` (appends the reply) so the TUI can run the network
//! call in a background task between the two.

use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::client::{ChatClient, ChatReply};
use crate::conversation::Conversation;
use crate::error::{ChatError, Result};
use crate::gate::DispatchGate;
use crate::state::Message;

/// Outcome of a submission attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Nothing but whitespace; nothing happened
    Empty,
    /// A request is still outstanding; nothing happened
    Busy,
    /// Too soon after the last accepted send; an inline error was appended
    RateLimited,
    /// User message appended; the trimmed text must now be fetched
    Accepted(String),
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    conversation: Conversation,
    input: String,
    busy: bool,
    gate: DispatchGate,
}

impl ChatSession {
    pub fn new(rate_limit: Duration) -> Self {
        Self {
            conversation: Conversation::new(),
            input: String::new(),
            busy: false,
            gate: DispatchGate::new(rate_limit),
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn gate(&self) -> &DispatchGate {
        &self.gate
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut String {
        &mut self.input
    }

    /// Submit whatever is currently in the input field
    pub fn submit_input(&mut self, now: Instant) -> Submission {
        let raw = self.input.clone();
        self.submit(&raw, now)
    }

    pub fn submit(&mut self, raw_input: &str, now: Instant) -> Submission {
        let message = raw_input.trim();
        if message.is_empty() {
            return Submission::Empty;
        }
        if self.busy {
            return Submission::Busy;
        }

        if let Err(err) = self.gate.pass(now) {
            warn!("send rejected by rate gate");
            self.conversation.push(Message::error(err.display_text()));
            return Submission::RateLimited;
        }

        info!(chars = message.chars().count(), "dispatching message");
        self.conversation.push(Message::user(message));
        self.input.clear();
        self.busy = true;
        Submission::Accepted(message.to_string())
    }

    /// Record the outcome of an accepted dispatch. Always clears busy.
    pub fn complete(&mut self, result: Result<ChatReply>) {
        let message = match result {
            Ok(reply) => Message::bot(reply.response, reply.sources),
            Err(err) => {
                tracing::error!(error = %err, "dispatch failed");
                Message::error(err.display_text())
            }
        };
        self.conversation.push(message);
        self.busy = false;
    }

    /// Full send-request-receive cycle in one call
    pub async fn dispatch(
        &mut self,
        client: &ChatClient,
        raw_input: &str,
        now: Instant,
    ) -> Submission {
        let submission = self.submit(raw_input, now);
        if let Submission::Accepted(message) = &submission {
            let result = client.fetch(message).await;
            self.complete(result);
        }
        submission
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(crate::gate::RATE_LIMIT_DELAY)
    }
}

/// Map a failed background task to a displayable error
pub fn task_failure(err: impl std::fmt::Display) -> ChatError {
    ChatError::Transport(format!("request task failed: {}", err))
}
