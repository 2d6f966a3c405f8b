//! Session events, policies and errors.

use nate_common::{InputError, ToolError};
use serde_json::{Map, Value};

use crate::{GatewayError, TokenUsage};

/// What to do when a dispatched tool call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolErrorPolicy {
    /// Propagate the error out of the turn.
    #[default]
    Abort,
    /// Send the error text back to the model and keep going.
    Report,
}

/// Progress surfaced to the caller while a turn runs.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnEvent {
    AssistantText(String),
    ToolCall {
        name: String,
        args: Map<String, Value>,
    },
    ToolResult {
        name: String,
        text: String,
    },
    /// Only emitted under [`ToolErrorPolicy::Report`].
    ToolFailed {
        name: String,
        error: String,
    },
    ArtifactStored {
        summary: String,
    },
}

/// Counters for one completed turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnSummary {
    pub gateway_calls: u32,
    pub tool_calls: u32,
    pub usage: TokenUsage,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("tool calls did not settle within {limit} rounds")]
    ToolChainTooDeep { limit: u32 },
}

impl SessionError {
    pub fn is_termination(&self) -> bool {
        matches!(self, SessionError::Input(InputError::Termination(_)))
    }
}

impl From<SessionError> for nate_common::NateError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Input(e) => e.into(),
            SessionError::Tool(e) => e.into(),
            SessionError::Gateway(e) => e.into(),
            other => nate_common::NateError::Gateway(other.to_string()),
        }
    }
}
