//! Gemini API client struct, request building, and response parsing.

use serde_json::{json, Map, Value};
use tracing::warn;

use crate::{GatewayError, Message, ModelReply, Part, Role, TokenUsage, ToolDeclaration};

use super::config::GeminiConfig;

/// Gemini API client.
pub struct GeminiClient {
    pub(crate) config: GeminiConfig,
    pub(crate) http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        Ok(Self { config, http })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub(crate) fn api_url(&self, method: &str) -> String {
        format!("{}/{}:{}", self.config.base_url, self.config.model, method)
    }

    /// Build the JSON request body for `generateContent`.
    pub(crate) fn build_request_body(
        &self,
        messages: &[Message],
        tools: &[ToolDeclaration],
    ) -> Value {
        let mut body = json!({
            "contents": build_contents(messages),
            "generationConfig": {
                "maxOutputTokens": self.config.max_tokens,
                "temperature": self.config.temperature,
            }
        });

        if !tools.is_empty() {
            let tool_defs: Vec<_> = tools.iter().map(to_gemini_declaration).collect();
            body["tools"] = json!([{ "functionDeclarations": tool_defs }]);
        }

        body
    }

    /// Parse a `generateContent` response, keeping part order.
    pub(crate) fn parse_response(&self, json: Value) -> Result<ModelReply, GatewayError> {
        let first = json["candidates"]
            .as_array()
            .ok_or_else(|| GatewayError::Parse("no candidates in response".to_string()))?
            .first()
            .ok_or_else(|| GatewayError::Parse("empty candidates".to_string()))?;

        let raw_parts = first["content"]["parts"]
            .as_array()
            .cloned()
            .unwrap_or_default();

        let mut parts = Vec::with_capacity(raw_parts.len());
        for part in &raw_parts {
            if let Some(fc) = part.get("functionCall") {
                let name = fc["name"]
                    .as_str()
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| GatewayError::Parse("function call without a name".into()))?;
                let args = match &fc["args"] {
                    Value::Object(map) => map.clone(),
                    Value::Null => Map::new(),
                    other => {
                        return Err(GatewayError::Parse(format!(
                            "function call args for {name} is not an object: {other}"
                        )))
                    }
                };
                parts.push(Part::function_call(name, args));
            } else if let Some(text) = part["text"].as_str() {
                parts.push(Part::text(text));
            } else {
                warn!(part = %part, "Skipping unsupported Gemini response part");
            }
        }

        if parts.is_empty() {
            let reason = first["finishReason"].as_str().unwrap_or("unknown");
            return Err(GatewayError::Parse(format!(
                "reply has no content (finish reason: {reason})"
            )));
        }

        let meta = &json["usageMetadata"];
        let mut usage = TokenUsage::new(
            meta["promptTokenCount"].as_u64().unwrap_or(0),
            meta["candidatesTokenCount"].as_u64().unwrap_or(0),
        );
        if let Some(total) = meta["totalTokenCount"].as_u64() {
            usage.total_tokens = total;
        }

        Ok(ModelReply { parts, usage })
    }
}

/// Map history onto Gemini `contents`.
pub(crate) fn build_contents(messages: &[Message]) -> Vec<Value> {
    messages
        .iter()
        .map(|msg| {
            let role = match msg.role {
                Role::User => "user",
                Role::Model => "model",
            };
            let parts: Vec<Value> = msg
                .parts
                .iter()
                .map(|part| match part {
                    Part::Text { text } => json!({ "text": text }),
                    Part::FunctionCall { name, args } => {
                        json!({ "functionCall": { "name": name, "args": args } })
                    }
                    Part::FunctionResponse { name, response } => {
                        json!({ "functionResponse": { "name": name, "response": response } })
                    }
                })
                .collect();
            json!({ "role": role, "parts": parts })
        })
        .collect()
}

/// Convert a declaration into Gemini's function declaration format.
pub(crate) fn to_gemini_declaration(tool: &ToolDeclaration) -> Value {
    json!({
        "name": tool.name,
        "description": tool.description,
        "parameters": tool.parameters,
    })
}
