use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use nate_common::{InputError, ToolError};
use nate_data::{ArtifactStore, DataArtifact, Table};
use serde_json::{json, Map, Value};

use super::*;
use crate::tools::{ParamSpec, Tool, ToolArgs, ToolOutput, ToolRegistry, ToolSpec};
use crate::{
    GatewayError, Message, ModelGateway, ModelReply, Part, Role, TokenUsage, ToolDeclaration,
};

/// Replays canned replies and records the history length seen by each call.
struct ScriptedGateway {
    replies: Mutex<VecDeque<Result<ModelReply, GatewayError>>>,
    repeat: Option<ModelReply>,
    seen: Mutex<Vec<usize>>,
}

impl ScriptedGateway {
    fn new(replies: Vec<ModelReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(Ok).collect()),
            repeat: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    fn failing(err: GatewayError) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from([Err(err)])),
            repeat: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    fn forever(reply: ModelReply) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            repeat: Some(reply),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    async fn send(
        &self,
        history: &[Message],
        _tools: &[ToolDeclaration],
    ) -> Result<ModelReply, GatewayError> {
        self.seen.lock().unwrap().push(history.len());
        if let Some(next) = self.replies.lock().unwrap().pop_front() {
            return next;
        }
        self.repeat
            .clone()
            .ok_or_else(|| GatewayError::Api("script exhausted".into()))
    }

    async fn count_tokens(&self, history: &[Message]) -> Result<u64, GatewayError> {
        Ok(history.len() as u64 * 10)
    }

    fn provider(&self) -> &str {
        "scripted"
    }
}

/// Creates a two-row artifact under the requested name.
struct MakeTable {
    spec: ToolSpec,
}

#[async_trait]
impl Tool for MakeTable {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, _store: &ArtifactStore, args: &ToolArgs) -> Result<ToolOutput, ToolError> {
        let name = args.required_str("name")?;
        let table = Table::from_records(&[
            json!({"status": "vulnerable"}),
            json!({"status": "stable"}),
        ])
        .map_err(|e| ToolError::Execution(e.to_string()))?;
        let artifact = DataArtifact::new(name, table)?;
        Ok(ToolOutput::with_artifact(artifact.summarize(), artifact))
    }
}

/// Reports the row count of an existing artifact.
struct CountRows {
    spec: ToolSpec,
}

#[async_trait]
impl Tool for CountRows {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, store: &ArtifactStore, args: &ToolArgs) -> Result<ToolOutput, ToolError> {
        let artifact = store.require(args.required_str("artifact")?)?;
        Ok(ToolOutput::text(format!("{} rows", artifact.table().row_count())))
    }
}

fn registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry
        .register(MakeTable {
            spec: ToolSpec::new("make_table", "Create a table")
                .param(ParamSpec::string("name", "Artifact name").required()),
        })
        .unwrap();
    registry
        .register(CountRows {
            spec: ToolSpec::new("count_rows", "Count rows")
                .param(ParamSpec::string("artifact", "Artifact name").required()),
        })
        .unwrap();
    registry
}

fn session() -> ConversationSession {
    let mut session = ConversationSession::new(registry());
    session.initialize("You are Nate.", Vec::new());
    session
}

fn call(name: &str, args: Value) -> Part {
    let args: Map<String, Value> = args.as_object().cloned().unwrap_or_default();
    Part::function_call(name, args)
}

fn reply(parts: Vec<Part>) -> ModelReply {
    ModelReply {
        parts,
        usage: TokenUsage::new(10, 2),
    }
}

fn count_parts(history: &[Message], pred: fn(&Part) -> bool) -> usize {
    history
        .iter()
        .flat_map(|m| m.parts.iter())
        .filter(|p| pred(p))
        .count()
}

#[test]
fn initialize_briefs_and_acknowledges() {
    let seed = DataArtifact::new(
        "test_df",
        Table::from_records(&[json!({"a": 1, "b": "x"})]).unwrap(),
    )
    .unwrap();
    let mut session = ConversationSession::new(registry());
    session.initialize("Be helpful.", vec![seed]);

    let history = session.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, Role::User);
    assert!(history[0].text().starts_with("Be helpful."));
    assert!(history[0]
        .text()
        .contains("test_df is a table with 1 rows and the following columns: ['a', 'b']"));
    assert_eq!(history[1], Message::model_text(MODEL_ACKNOWLEDGEMENT));
    assert!(session.store().contains("test_df"));
}

#[test]
fn termination_tokens() {
    for token in ["quit", "quit please", "exit", "exit()", "q"] {
        assert!(is_termination_input(token), "{token}");
    }
    for text in ["Quit", "q ", "question", "what about quitting?"] {
        assert!(!is_termination_input(text), "{text}");
    }
}

#[tokio::test]
async fn quit_terminates_without_gateway_call() {
    let gateway = ScriptedGateway::new(vec![reply(vec![Part::text("unused")])]);
    let mut session = session();
    let before = session.history().to_vec();

    let err = session.submit_user_message("quit").unwrap_err();
    assert!(err.is_termination());
    assert!(matches!(
        err,
        SessionError::Input(InputError::Termination(ref t)) if t == "quit"
    ));
    assert_eq!(session.history(), before.as_slice());
    assert_eq!(gateway.calls(), 0);
}

#[tokio::test]
async fn text_only_reply_ends_turn_after_one_call() {
    let gateway = ScriptedGateway::new(vec![reply(vec![Part::text("Hello!")])]);
    let mut session = session();
    session.submit_user_message("hi").unwrap();

    let events = session.advance_turn(&gateway).await.unwrap();
    assert_eq!(events, vec![TurnEvent::AssistantText("Hello!".into())]);
    assert_eq!(gateway.calls(), 1);
    assert_eq!(session.history().len(), 4);
    assert_eq!(session.tracker().call_count(), 1);
    assert_eq!(session.tracker().for_provider("scripted").unwrap().total_tokens, 12);
}

#[tokio::test]
async fn tool_round_appends_response_and_stores_artifact() {
    let gateway = ScriptedGateway::new(vec![
        reply(vec![
            Part::text("Building it."),
            call("make_table", json!({"name": "obs"})),
        ]),
        reply(vec![Part::text("Done.")]),
    ]);
    let mut session = session();
    session.submit_user_message("make a table").unwrap();
    let before = session.history().to_vec();

    let mut events = Vec::new();
    let summary = session
        .advance_turn_with(&gateway, &mut |e: TurnEvent| events.push(e))
        .await
        .unwrap();

    assert_eq!(summary.gateway_calls, 2);
    assert_eq!(summary.tool_calls, 1);
    assert_eq!(summary.usage.total_tokens, 24);

    let history = session.history();
    assert_eq!(&history[..before.len()], before.as_slice());
    assert_eq!(history.len(), before.len() + 3);
    assert_eq!(history[before.len()].role, Role::Model);
    assert_eq!(
        history[before.len() + 1],
        Message::function_response(
            "make_table",
            json!({"result": "obs is a table with 2 rows and the following columns: ['status']"})
        )
    );
    assert!(session.store().contains("obs"));

    // the second call saw the reply and the function response
    assert_eq!(*gateway.seen.lock().unwrap(), vec![3, 5]);

    assert!(matches!(&events[0], TurnEvent::AssistantText(t) if t == "Building it."));
    assert!(matches!(&events[1], TurnEvent::ToolCall { name, .. } if name == "make_table"));
    assert!(matches!(&events[2], TurnEvent::ArtifactStored { .. }));
    assert!(matches!(&events[3], TurnEvent::ToolResult { name, .. } if name == "make_table"));
    assert!(matches!(&events[4], TurnEvent::AssistantText(t) if t == "Done."));
}

#[tokio::test]
async fn later_calls_see_artifacts_from_earlier_calls() {
    let gateway = ScriptedGateway::new(vec![
        reply(vec![
            call("make_table", json!({"name": "obs"})),
            call("count_rows", json!({"artifact": "obs"})),
        ]),
        reply(vec![Part::text("Two rows.")]),
    ]);
    let mut session = session();
    session.submit_user_message("how many?").unwrap();
    session.advance_turn(&gateway).await.unwrap();

    let history = session.history();
    let n = history.len();
    assert_eq!(
        history[n - 2],
        Message::function_response("count_rows", json!({"result": "2 rows"}))
    );
}

#[tokio::test]
async fn depth_bound_stops_runaway_tool_chains() {
    let gateway = ScriptedGateway::forever(reply(vec![call("make_table", json!({"name": "x"}))]));
    let mut session = ConversationSession::new(registry()).with_max_tool_rounds(2);
    session.initialize("prompt", Vec::new());
    session.submit_user_message("loop").unwrap();

    let err = session.advance_turn(&gateway).await.unwrap_err();
    assert!(matches!(err, SessionError::ToolChainTooDeep { limit: 2 }));
    assert_eq!(gateway.calls(), 3);

    let history = session.history();
    let calls = count_parts(history, |p| matches!(p, Part::FunctionCall { .. }));
    let responses = count_parts(history, |p| matches!(p, Part::FunctionResponse { .. }));
    assert_eq!(calls, 3);
    assert_eq!(responses, 3);
}

#[tokio::test]
async fn missing_argument_aborts_and_leaves_store_untouched() {
    let gateway = ScriptedGateway::new(vec![reply(vec![
        call("make_table", json!({})),
        call("count_rows", json!({"artifact": "obs"})),
    ])]);
    let mut session = session();
    session.submit_user_message("go").unwrap();

    let err = session.advance_turn(&gateway).await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Tool(ToolError::MissingArgument { ref missing, .. }) if missing == &vec!["name".to_string()]
    ));
    assert!(session.store().is_empty());

    // both emitted calls are answered
    let responses = count_parts(session.history(), |p| {
        matches!(p, Part::FunctionResponse { response, .. } if response.get("error").is_some())
    });
    assert_eq!(responses, 2);
}

#[tokio::test]
async fn report_policy_returns_errors_to_the_model() {
    let gateway = ScriptedGateway::new(vec![
        reply(vec![call("count_rows", json!({"artifact": "missing"}))]),
        reply(vec![Part::text("That table does not exist.")]),
    ]);
    let mut session =
        ConversationSession::new(registry()).with_tool_error_policy(ToolErrorPolicy::Report);
    session.initialize("prompt", Vec::new());
    session.submit_user_message("count").unwrap();

    let events = session.advance_turn(&gateway).await.unwrap();
    assert!(events.iter().any(|e| matches!(
        e,
        TurnEvent::ToolFailed { error, .. } if error == "unknown artifact: missing"
    )));
    assert_eq!(gateway.calls(), 2);
}

#[tokio::test]
async fn gateway_errors_end_the_turn() {
    let gateway = ScriptedGateway::failing(GatewayError::RateLimited);
    let mut session = session();
    session.submit_user_message("hi").unwrap();
    let len = session.history().len();

    let err = session.advance_turn(&gateway).await.unwrap_err();
    assert!(matches!(err, SessionError::Gateway(GatewayError::RateLimited)));
    assert_eq!(session.history().len(), len);
}

#[tokio::test]
async fn count_history_tokens_delegates_to_gateway() {
    let gateway = ScriptedGateway::new(Vec::new());
    let session = session();
    assert_eq!(session.count_history_tokens(&gateway).await.unwrap(), 20);
}
