//! ModelGateway trait implementation for GeminiClient.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::{GatewayError, Message, ModelGateway, ModelReply, ToolDeclaration};

use super::client::{build_contents, GeminiClient};

impl GeminiClient {
    async fn post(&self, method: &str, body: &Value) -> Result<Value, GatewayError> {
        let response = self
            .http
            .post(self.api_url(method))
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GatewayError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api(format!("HTTP {status}: {text}")));
        }

        response
            .json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))
    }
}

#[async_trait]
impl ModelGateway for GeminiClient {
    async fn send(
        &self,
        history: &[Message],
        tools: &[ToolDeclaration],
    ) -> Result<ModelReply, GatewayError> {
        let body = self.build_request_body(history, tools);

        debug!(
            model = %self.config.model,
            messages = history.len(),
            tools = tools.len(),
            "Gemini API request"
        );

        let json = self.post("generateContent", &body).await?;
        self.parse_response(json)
    }

    async fn count_tokens(&self, history: &[Message]) -> Result<u64, GatewayError> {
        let body = json!({ "contents": build_contents(history) });
        let json = self.post("countTokens", &body).await?;
        json["totalTokens"]
            .as_u64()
            .ok_or_else(|| GatewayError::Parse("countTokens reply has no totalTokens".into()))
    }

    fn provider(&self) -> &str {
        "gemini"
    }
}
