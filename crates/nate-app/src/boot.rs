//! Startup: wire config, gateway, data source and tools into a session.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use nate_ai::{ConversationSession, GeminiClient, GeminiConfig, ToolErrorPolicy};
use nate_common::NateError;
use nate_config::{NateConfig, ToolErrorMode};
use nate_data::{DataArtifact, Table};
use nate_tools::{builtin_registry, INaturalistClient, TextPlotSink};
use tracing::info;

use crate::cli::Args;

/// Build the Gemini gateway and an initialized session.
pub fn start(
    args: &Args,
    mut config: NateConfig,
) -> Result<(ConversationSession, GeminiClient), NateError> {
    if let Some(model) = &args.model {
        config.model.name = model.clone();
    }

    let api_key = config.model.resolve_api_key()?;
    let gateway = GeminiClient::new(
        GeminiConfig::new(api_key)
            .with_model(&config.model.name)
            .with_max_tokens(config.model.max_tokens)
            .with_temperature(config.model.temperature)
            .with_timeout(Duration::from_secs(config.model.timeout_secs)),
    )?;
    info!(model = %config.model.name, "Gemini gateway ready");

    let source = INaturalistClient::new(&config.data_source)?;
    let registry = builtin_registry(Arc::new(source), Arc::new(TextPlotSink::stdout()))?;

    let prompt_path = args
        .prompt
        .as_deref()
        .unwrap_or(config.session.system_prompt_path.as_path());
    let prompt = read_prompt(prompt_path)?;

    let seeds = match &args.seed {
        Some(path) => {
            let name = args.seed_name.as_deref().unwrap_or(&config.session.seed_name);
            vec![load_seed(path, name)?]
        }
        None => Vec::new(),
    };

    let mut session = build_session(registry, &config);
    session.initialize(&prompt, seeds);
    Ok((session, gateway))
}

pub(crate) fn build_session(
    registry: nate_ai::ToolRegistry,
    config: &NateConfig,
) -> ConversationSession {
    let policy = match config.session.tool_errors {
        ToolErrorMode::Abort => ToolErrorPolicy::Abort,
        ToolErrorMode::Report => ToolErrorPolicy::Report,
    };
    ConversationSession::new(registry)
        .with_max_tool_rounds(config.session.max_tool_rounds)
        .with_tool_error_policy(policy)
}

pub(crate) fn read_prompt(path: &Path) -> Result<String, NateError> {
    std::fs::read_to_string(path).map_err(|e| {
        NateError::Other(format!(
            "cannot read system prompt {}: {e}",
            path.display()
        ))
    })
}

pub(crate) fn load_seed(path: &Path, name: &str) -> Result<DataArtifact, NateError> {
    let table = Table::from_csv_path(path).map_err(|e| {
        NateError::Other(format!("cannot load seed table {}: {e}", path.display()))
    })?;
    let artifact = DataArtifact::new(name, table)?;
    info!(seed = %artifact.summarize(), "Seed table loaded");
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_csv_becomes_named_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toads.csv");
        std::fs::write(
            &path,
            "preferred_common_name,conservation_status\nGreater Short-horned Lizard,vulnerable\nRegal Horned Lizard,\n",
        )
        .unwrap();

        let artifact = load_seed(&path, "test_df").unwrap();
        assert_eq!(
            artifact.summarize(),
            "test_df is a table with 2 rows and the following columns: ['preferred_common_name', 'conservation_status']"
        );
    }

    #[test]
    fn missing_prompt_names_the_path() {
        let err = read_prompt(Path::new("/nonexistent/prompt.txt")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/prompt.txt"));
    }

    #[test]
    fn session_follows_config() {
        let mut config = NateConfig::default();
        config.session.max_tool_rounds = 3;
        config.session.tool_errors = ToolErrorMode::Report;
        let session = build_session(nate_ai::ToolRegistry::new(), &config);
        assert_eq!(session.max_tool_rounds(), 3);
        assert_eq!(session.tool_error_policy(), ToolErrorPolicy::Report);
    }
}
