//! Model gateway and tool-calling orchestration for Nate.
//!
//! Provides:
//! - The conversation message model (`Message`, `Part`)
//! - The `ModelGateway` trait and its Gemini implementation
//! - A typed tool registry with declaration generation and argument validation
//! - `ConversationSession`, which drives the bounded tool-call loop
//! - Token usage tracking

pub mod gemini;
pub mod session;
pub mod token_tracker;
pub mod tools;

mod message;

use async_trait::async_trait;

pub use gemini::{GeminiClient, GeminiConfig};
pub use message::{Message, Part, Role};
pub use session::{
    is_termination_input, ConversationSession, SessionError, ToolErrorPolicy, TurnEvent,
    TurnSummary,
};
pub use token_tracker::TokenTracker;
pub use tools::{ParamSpec, ParamType, Tool, ToolArgs, ToolOutput, ToolRegistry, ToolSpec};

/// A language-model endpoint that accepts the full history plus tool
/// declarations and returns one structured reply.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn send(
        &self,
        history: &[Message],
        tools: &[ToolDeclaration],
    ) -> Result<ModelReply, GatewayError>;

    async fn count_tokens(&self, history: &[Message]) -> Result<u64, GatewayError>;

    /// Name used to bucket token usage.
    fn provider(&self) -> &str {
        "model"
    }
}

/// Function declaration advertised to the model.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,
    /// JSON schema of the form `{"type": "object", "properties": .., "required": ..}`.
    pub parameters: serde_json::Value,
}

/// One model reply: ordered parts plus the usage it cost.
#[derive(Debug, Clone, Default)]
pub struct ModelReply {
    pub parts: Vec<Part>,
    pub usage: TokenUsage,
}

impl ModelReply {
    pub fn has_function_calls(&self) -> bool {
        self.parts
            .iter()
            .any(|p| matches!(p, Part::FunctionCall { .. }))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    /// As reported by the provider; may exceed input + output.
    pub total_tokens: u64,
}

impl TokenUsage {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens.saturating_add(output_tokens),
        }
    }

    pub fn add(&mut self, other: &TokenUsage) {
        self.input_tokens = self.input_tokens.saturating_add(other.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(other.output_tokens);
        self.total_tokens = self.total_tokens.saturating_add(other.total_tokens);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<GatewayError> for nate_common::NateError {
    fn from(err: GatewayError) -> Self {
        nate_common::NateError::Gateway(err.to_string())
    }
}
