//! Conversation session management.
//!
//! A `ConversationSession` owns the append-only history and the artifact
//! store, and drives the bounded tool-call loop one turn at a time.

mod manager;
mod turn;
mod types;

pub use manager::{is_termination_input, ConversationSession, MODEL_ACKNOWLEDGEMENT};
pub use types::{SessionError, ToolErrorPolicy, TurnEvent, TurnSummary};

#[cfg(test)]
mod tests;
