//! Typed tools the model may call.
//!
//! A tool describes itself with a [`ToolSpec`]; the registry derives the
//! model-facing declaration from that spec and validates incoming arguments
//! against it before the tool runs.

mod args;
mod registry;
mod spec;

use async_trait::async_trait;
use nate_common::ToolError;
use nate_data::{ArtifactStore, DataArtifact};

pub use args::ToolArgs;
pub use registry::ToolRegistry;
pub use spec::{ParamSpec, ParamType, ToolSpec};

/// What a successful tool call hands back to the session.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    /// Text returned to the model as the function response.
    pub text: String,
    /// A new artifact to store under its own name.
    pub artifact: Option<DataArtifact>,
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            artifact: None,
        }
    }

    pub fn with_artifact(text: impl Into<String>, artifact: DataArtifact) -> Self {
        Self {
            text: text.into(),
            artifact: Some(artifact),
        }
    }
}

/// Tool trait that all tools must implement.
#[async_trait]
pub trait Tool: Send + Sync {
    fn spec(&self) -> &ToolSpec;

    /// Run with arguments already validated against [`spec`](Tool::spec).
    /// The store is read-only; new artifacts go in the output.
    async fn execute(&self, store: &ArtifactStore, args: &ToolArgs)
        -> Result<ToolOutput, ToolError>;

    fn name(&self) -> &str {
        &self.spec().name
    }
}
