//! ConversationSession struct, setup and history management.

use nate_common::{InputError, SessionId};
use nate_data::{ArtifactStore, DataArtifact};
use tracing::info;

use crate::token_tracker::TokenTracker;
use crate::tools::ToolRegistry;
use crate::{GatewayError, Message, ModelGateway};

use super::types::{SessionError, ToolErrorPolicy};

/// Synthetic model reply that closes the system-prompt exchange.
pub const MODEL_ACKNOWLEDGEMENT: &str =
    "I understand the instructions, and I will act accordingly.";

/// Whether `text` is a reserved token that ends the session: anything
/// starting with `quit` or `exit`, or exactly `q`. Case-sensitive.
pub fn is_termination_input(text: &str) -> bool {
    text.starts_with("quit") || text.starts_with("exit") || text == "q"
}

/// A conversation with its history, artifacts and tools.
pub struct ConversationSession {
    pub(super) id: SessionId,
    /// Append-only conversation history.
    pub(super) history: Vec<Message>,
    pub(super) store: ArtifactStore,
    pub(super) registry: ToolRegistry,
    pub(super) tracker: TokenTracker,
    /// Rounds of function calls dispatched per turn before giving up.
    pub(super) max_tool_rounds: u32,
    pub(super) tool_errors: ToolErrorPolicy,
}

impl ConversationSession {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            id: SessionId::new(),
            history: Vec::new(),
            store: ArtifactStore::new(),
            registry,
            tracker: TokenTracker::new(),
            max_tool_rounds: 10,
            tool_errors: ToolErrorPolicy::default(),
        }
    }

    pub fn with_max_tool_rounds(mut self, max: u32) -> Self {
        self.max_tool_rounds = max.max(1);
        self
    }

    pub fn with_tool_error_policy(mut self, policy: ToolErrorPolicy) -> Self {
        self.tool_errors = policy;
        self
    }

    /// Brief the model: the system prompt plus one summary line per seed
    /// artifact, followed by the canned acknowledgement. Seeds are stored.
    pub fn initialize(&mut self, system_prompt: &str, seeds: Vec<DataArtifact>) {
        let mut briefing = system_prompt.to_string();
        if !seeds.is_empty() {
            briefing.push_str("\n\nThe following data is already loaded:");
            for seed in &seeds {
                briefing.push_str("\n- ");
                briefing.push_str(&seed.summarize());
            }
        }
        for seed in seeds {
            self.store.insert(seed);
        }

        self.history.push(Message::user_text(briefing));
        self.history.push(Message::model_text(MODEL_ACKNOWLEDGEMENT));
        info!(
            session = %self.id,
            tools = self.registry.len(),
            artifacts = self.store.len(),
            "Session initialized"
        );
    }

    /// Append a user message, or fail with `Termination` and leave the
    /// history untouched if `text` is a reserved quit token.
    pub fn submit_user_message(&mut self, text: &str) -> Result<(), SessionError> {
        if is_termination_input(text) {
            info!(session = %self.id, "Termination requested");
            return Err(InputError::Termination(text.to_string()).into());
        }
        self.history.push(Message::user_text(text));
        Ok(())
    }

    /// Ask the gateway how many tokens the current history costs.
    pub async fn count_history_tokens(
        &self,
        gateway: &dyn ModelGateway,
    ) -> Result<u64, GatewayError> {
        gateway.count_tokens(&self.history).await
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn tracker(&self) -> &TokenTracker {
        &self.tracker
    }

    pub fn max_tool_rounds(&self) -> u32 {
        self.max_tool_rounds
    }

    pub fn tool_error_policy(&self) -> ToolErrorPolicy {
        self.tool_errors
    }
}
