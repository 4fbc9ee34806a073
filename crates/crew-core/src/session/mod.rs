//! Per-agent conversation history
//!
//! Sessions live in memory for the lifetime of their agent.

mod types;

pub use types::ConversationSession;
