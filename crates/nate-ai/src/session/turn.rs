//! The bounded tool-call loop behind `advance_turn`.

use nate_common::new_correlation_id;
use serde_json::{json, Map, Value};
use tracing::{debug, info_span, warn, Instrument};

use crate::{Message, ModelGateway, Part, Role};

use super::manager::ConversationSession;
use super::types::{SessionError, ToolErrorPolicy, TurnEvent, TurnSummary};

impl ConversationSession {
    /// Run one turn and collect its events.
    pub async fn advance_turn(
        &mut self,
        gateway: &dyn ModelGateway,
    ) -> Result<Vec<TurnEvent>, SessionError> {
        let mut events = Vec::new();
        self.advance_turn_with(gateway, &mut |event: TurnEvent| events.push(event))
            .await?;
        Ok(events)
    }

    /// Run one turn, handing each event to `on_event` as it happens.
    ///
    /// Every reply is appended before any of its calls run. Calls run in the
    /// order emitted and each result is appended before the next call, so a
    /// later call sees artifacts stored by an earlier one. The turn ends on
    /// the first reply without a function call.
    pub async fn advance_turn_with(
        &mut self,
        gateway: &dyn ModelGateway,
        on_event: &mut (dyn FnMut(TurnEvent) + Send),
    ) -> Result<TurnSummary, SessionError> {
        let span = info_span!("turn", session = %self.id);
        self.run_turn(gateway, on_event).instrument(span).await
    }

    async fn run_turn(
        &mut self,
        gateway: &dyn ModelGateway,
        on_event: &mut (dyn FnMut(TurnEvent) + Send),
    ) -> Result<TurnSummary, SessionError> {
        let declarations = self.registry.declarations();
        let mut summary = TurnSummary::default();
        let mut rounds = 0;

        loop {
            let reply = gateway.send(&self.history, &declarations).await?;
            summary.gateway_calls += 1;
            summary.usage.add(&reply.usage);
            self.tracker.record(gateway.provider(), &reply.usage);
            debug!(
                parts = reply.parts.len(),
                tokens = reply.usage.total_tokens,
                "Model reply"
            );

            let has_calls = reply.has_function_calls();
            self.history
                .push(Message::new(Role::Model, reply.parts.clone()));

            if has_calls && rounds == self.max_tool_rounds {
                warn!(limit = self.max_tool_rounds, "Tool call chain too deep");
                let reason = format!(
                    "not executed: limit of {} tool rounds per turn reached",
                    self.max_tool_rounds
                );
                self.refuse_calls(&reply.parts, &reason);
                return Err(SessionError::ToolChainTooDeep {
                    limit: self.max_tool_rounds,
                });
            }

            let mut parts = reply.parts.into_iter();
            while let Some(part) = parts.next() {
                match part {
                    Part::Text { text } => on_event(TurnEvent::AssistantText(text)),
                    Part::FunctionCall { name, args } => {
                        summary.tool_calls += 1;
                        if let Err(err) = self.run_tool_call(name, args, on_event).await {
                            let rest: Vec<Part> = parts.collect();
                            self.refuse_calls(&rest, "not executed: an earlier tool call failed");
                            return Err(err);
                        }
                    }
                    Part::FunctionResponse { name, .. } => {
                        warn!(tool = %name, "Ignoring function response sent by the model");
                    }
                }
            }

            if !has_calls {
                return Ok(summary);
            }
            rounds += 1;
        }
    }

    async fn run_tool_call(
        &mut self,
        name: String,
        args: Map<String, Value>,
        on_event: &mut (dyn FnMut(TurnEvent) + Send),
    ) -> Result<(), SessionError> {
        let call_id = new_correlation_id();
        debug!(tool = %name, call = %call_id, "Dispatching tool call");
        on_event(TurnEvent::ToolCall {
            name: name.clone(),
            args: args.clone(),
        });

        match self.registry.dispatch(&name, &args, &self.store).await {
            Ok(output) => {
                if let Some(artifact) = output.artifact {
                    let stored = artifact.summarize();
                    if self.store.insert(artifact).is_some() {
                        debug!(call = %call_id, "Replaced existing artifact");
                    }
                    on_event(TurnEvent::ArtifactStored { summary: stored });
                }
                self.history.push(Message::function_response(
                    &name,
                    json!({ "result": output.text }),
                ));
                on_event(TurnEvent::ToolResult {
                    name,
                    text: output.text,
                });
                Ok(())
            }
            Err(err) => match self.tool_errors {
                ToolErrorPolicy::Abort => {
                    warn!(tool = %name, call = %call_id, error = %err, "Tool call failed, aborting turn");
                    self.history.push(Message::function_response(
                        &name,
                        json!({ "error": err.to_string() }),
                    ));
                    Err(err.into())
                }
                ToolErrorPolicy::Report => {
                    warn!(tool = %name, call = %call_id, error = %err, "Tool call failed");
                    let error = err.to_string();
                    self.history.push(Message::function_response(
                        &name,
                        json!({ "error": error }),
                    ));
                    on_event(TurnEvent::ToolFailed { name, error });
                    Ok(())
                }
            },
        }
    }

    /// Answer every call in `parts` with an error response so each emitted
    /// call still has a reply in the history.
    fn refuse_calls(&mut self, parts: &[Part], reason: &str) {
        for part in parts {
            if let Part::FunctionCall { name, .. } = part {
                self.history
                    .push(Message::function_response(name, json!({ "error": reason })));
            }
        }
    }
}
