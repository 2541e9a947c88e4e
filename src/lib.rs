pub mod client;
pub mod config;
pub mod conversation;
pub mod error;
pub mod gate;
pub mod logging;
pub mod session;
pub mod sources;
pub mod state;

// Re-export main types for convenience
pub use client::{ChatClient, ChatReply, DEFAULT_ENDPOINT};
pub use config::{Config, ConfigOverrides, Settings};
pub use conversation::Conversation;
pub use error::ChatError;
pub use gate::{DispatchGate, RATE_LIMIT_DELAY};
pub use session::{ChatSession, Submission};
pub use sources::{clean_source, format_sources, SourceLink};
pub use state::{Message, WidgetState};
