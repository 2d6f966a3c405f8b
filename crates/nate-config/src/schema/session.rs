//! Conversation session configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// What the session does when a tool call fails validation or execution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolErrorMode {
    /// Stop the turn and return the error to the caller.
    #[default]
    Abort,
    /// Send the error text back to the model as the call's response.
    Report,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// File holding the system prompt sent as the first user message.
    pub system_prompt_path: PathBuf,
    /// Maximum model replies with function calls per user turn (valid range: 1-50).
    pub max_tool_rounds: u32,
    pub tool_errors: ToolErrorMode,
    /// Artifact name used for a table preseeded with `--seed`.
    pub seed_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            system_prompt_path: PathBuf::from("prompt.txt"),
            max_tool_rounds: 10,
            tool_errors: ToolErrorMode::Abort,
            seed_name: "test_df".to_string(),
        }
    }
}
