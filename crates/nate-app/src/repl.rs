//! Console loop: read a line, advance the session, print what happened.

use std::io::{BufRead, Write};

use nate_ai::{ConversationSession, ModelGateway, SessionError, TurnEvent};
use nate_common::NateError;
use tracing::{debug, warn};

pub const GREETING: &str = "Hello, I'm an assistant for helping you find answers to your \
                            ecological questions. What would you like me to do?";

fn print_block(out: &mut dyn Write, label: &str, body: &str) -> std::io::Result<()> {
    writeln!(out, "\n{label}:\n{body}")?;
    out.flush()
}

/// Run until EOF or a termination token.
///
/// Lines starting with `/` are local commands and never reach the model:
/// `/usage`, `/tokens` and `/tables`.
pub async fn run<R, W>(
    session: &mut ConversationSession,
    gateway: &dyn ModelGateway,
    input: R,
    out: &mut W,
) -> Result<(), NateError>
where
    R: BufRead,
    W: Write + Send,
{
    print_block(out, "NATE", GREETING)?;
    let mut lines = input.lines();

    loop {
        writeln!(out, "\nUSER:")?;
        out.flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let text = line.trim_end_matches(['\r', '\n']);
        if text.trim().is_empty() {
            continue;
        }

        if let Some(command) = text.strip_prefix('/') {
            run_command(command.trim(), session, gateway, out).await?;
            continue;
        }

        match session.submit_user_message(text) {
            Ok(()) => {}
            Err(e) if e.is_termination() => {
                writeln!(out, "quitting...")?;
                break;
            }
            Err(e) => return Err(e.into()),
        }

        let mut write_error = None;
        let result = session
            .advance_turn_with(gateway, &mut |event: TurnEvent| {
                if write_error.is_none() {
                    write_error = print_event(out, &event).err();
                }
            })
            .await;
        if let Some(e) = write_error {
            return Err(e.into());
        }

        match result {
            Ok(summary) => debug!(
                gateway_calls = summary.gateway_calls,
                tool_calls = summary.tool_calls,
                "Turn complete"
            ),
            Err(e) => report_turn_error(out, &e)?,
        }
    }
    Ok(())
}

fn print_event(out: &mut dyn Write, event: &TurnEvent) -> std::io::Result<()> {
    match event {
        TurnEvent::AssistantText(text) => print_block(out, "NATE", text),
        TurnEvent::ToolCall { name, args } => {
            print_block(out, "TOOL", &format!("{name}{}", serde_json::Value::Object(args.clone())))
        }
        TurnEvent::ToolFailed { name, error } => {
            print_block(out, "TOOL", &format!("{name} failed: {error}"))
        }
        TurnEvent::ToolResult { name, text } => {
            debug!(tool = %name, bytes = text.len(), "Tool result");
            Ok(())
        }
        TurnEvent::ArtifactStored { summary } => {
            debug!(%summary, "Artifact stored");
            Ok(())
        }
    }
}

/// Turn failures end the turn, not the conversation.
fn report_turn_error(out: &mut dyn Write, err: &SessionError) -> std::io::Result<()> {
    warn!(error = %err, "Turn failed");
    print_block(out, "NATE", &format!("Sorry, that request failed: {err}"))
}

async fn run_command<W: Write + Send>(
    command: &str,
    session: &ConversationSession,
    gateway: &dyn ModelGateway,
    out: &mut W,
) -> Result<(), NateError> {
    match command {
        "usage" => writeln!(out, "{}", session.tracker().report())?,
        "tokens" => match session.count_history_tokens(gateway).await {
            Ok(n) => writeln!(out, "history is {n} tokens")?,
            Err(e) => writeln!(out, "token count failed: {e}")?,
        },
        "tables" => {
            if session.store().is_empty() {
                writeln!(out, "no tables yet")?;
            }
            for artifact in session.store().iter() {
                writeln!(out, "{}", artifact.summarize())?;
            }
        }
        other => writeln!(out, "unknown command /{other} (try /usage, /tokens, /tables)")?,
    }
    Ok(())
}
