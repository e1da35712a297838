//! Anthropic messages API with tool use.

use super::{BackendConfig, BackendError, BackendReply, DecisionBackend};
use crate::protocol::{ConversationLog, Message, ToolCall, ToolSpec};
use serde_json::{Value, json};
use tracing::{debug, error, info, instrument};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Opening user turn; the messages API requires one before the assistant speaks.
const OPENING_TURN: &str = "It is your move.";

/// Backend speaking the Anthropic `/messages` dialect.
#[derive(Debug, Clone)]
pub struct AnthropicBackend {
    config: BackendConfig,
    http: reqwest::Client,
}

impl AnthropicBackend {
    /// Creates a backend from a configuration and a shared HTTP client.
    #[instrument(skip_all, fields(model = %config.model()))]
    pub fn new(config: BackendConfig, http: reqwest::Client) -> Self {
        info!("Creating Anthropic backend");
        Self { config, http }
    }

    /// Builds the request body for a conversation.
    ///
    /// System instructions move to the top-level `system` field and tool
    /// results are grouped into the user turn that follows the request.
    pub fn request_body(&self, log: &ConversationLog, tools: &[ToolSpec]) -> Value {
        let system: Vec<&str> = log
            .messages()
            .iter()
            .filter_map(|m| match m {
                Message::System { content } => Some(content.as_str()),
                _ => None,
            })
            .collect();

        let mut messages: Vec<Value> = vec![json!({ "role": "user", "content": OPENING_TURN })];
        let mut pending_results: Vec<Value> = Vec::new();

        for message in log.messages() {
            match message {
                Message::System { .. } => {}
                Message::Assistant {
                    content,
                    tool_calls,
                } => {
                    flush_results(&mut messages, &mut pending_results);
                    let mut blocks: Vec<Value> = Vec::new();
                    if let Some(text) = content.as_deref().filter(|t| !t.is_empty()) {
                        blocks.push(json!({ "type": "text", "text": text }));
                    }
                    for call in tool_calls {
                        let input = if call.arguments.is_object() {
                            call.arguments.clone()
                        } else {
                            json!({})
                        };
                        blocks.push(json!({
                            "type": "tool_use",
                            "id": call.id,
                            "name": call.name,
                            "input": input,
                        }));
                    }
                    messages.push(json!({ "role": "assistant", "content": blocks }));
                }
                Message::Tool(result) => pending_results.push(json!({
                    "type": "tool_result",
                    "tool_use_id": result.id,
                    "content": result.content,
                })),
            }
        }
        flush_results(&mut messages, &mut pending_results);

        let tools: Vec<Value> = tools
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "input_schema": tool.parameters,
                })
            })
            .collect();

        json!({
            "model": self.config.model(),
            "max_tokens": self.config.max_tokens(),
            "temperature": self.config.temperature(),
            "system": system.join("\n\n"),
            "messages": messages,
            "tools": tools,
        })
    }

    /// Decodes a response body into a reply.
    pub fn parse_reply(body: &str) -> Result<BackendReply, BackendError> {
        let response_json: Value = serde_json::from_str(body).map_err(|e| {
            error!(error = ?e, "Failed to parse Anthropic response");
            BackendError::new(format!("Failed to parse response: {}", e))
        })?;

        let blocks = response_json["content"].as_array().ok_or_else(|| {
            error!(response = %response_json, "No content blocks in Anthropic response");
            BackendError::new("No content blocks in Anthropic response".to_string())
        })?;

        let mut text = String::new();
        let mut tool_calls = Vec::new();
        for block in blocks {
            match block["type"].as_str() {
                Some("text") => text.push_str(block["text"].as_str().unwrap_or_default()),
                Some("tool_use") => tool_calls.push(ToolCall::new(
                    block["id"].as_str().unwrap_or_default().to_string(),
                    block["name"].as_str().unwrap_or_default().to_string(),
                    block["input"].clone(),
                )),
                other => debug!(block_type = ?other, "Skipping content block"),
            }
        }

        Ok(BackendReply {
            content: (!text.is_empty()).then_some(text),
            tool_calls,
        })
    }
}

fn flush_results(messages: &mut Vec<Value>, pending: &mut Vec<Value>) {
    if !pending.is_empty() {
        messages.push(json!({ "role": "user", "content": std::mem::take(pending) }));
    }
}

#[async_trait::async_trait]
impl DecisionBackend for AnthropicBackend {
    #[instrument(
        skip(self, log, tools),
        fields(model = %self.config.model(), messages = log.len())
    )]
    async fn complete(
        &self,
        log: &ConversationLog,
        tools: &[ToolSpec],
    ) -> Result<BackendReply, BackendError> {
        let url = format!("{}/messages", self.config.base_url());
        let request_body = self.request_body(log, tools);

        debug!(%url, "Sending request to Anthropic");
        let response = self
            .http
            .post(&url)
            .header("x-api-key", self.config.api_key())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Anthropic API request failed");
                BackendError::new(format!("Anthropic API request failed: {}", e))
            })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            error!(error = ?e, "Failed to read Anthropic response");
            BackendError::new(format!("Failed to read response: {}", e))
        })?;

        if !status.is_success() {
            error!(status = %status, response = %response_text, "Anthropic API error");
            return Err(BackendError::new(format!(
                "Anthropic API error {}: {}",
                status, response_text
            )));
        }

        let reply = Self::parse_reply(&response_text)?;
        info!(
            tool_calls = reply.tool_calls.len(),
            has_content = reply.content.is_some(),
            "Anthropic reply received"
        );
        Ok(reply)
    }

    fn name(&self) -> &str {
        self.config.model()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LlmProvider;
    use crate::protocol::ToolResult;

    fn backend() -> AnthropicBackend {
        let config = BackendConfig::new(
            LlmProvider::Anthropic,
            "test-key".to_string(),
            None,
            "claude-3-5-haiku-20241022".to_string(),
            256,
            0.7,
        );
        AnthropicBackend::new(config, reqwest::Client::new())
    }

    #[test]
    fn test_tool_results_follow_tool_use() {
        let mut log = ConversationLog::new();
        log.push(Message::system("play well"));
        log.push(Message::Assistant {
            content: Some("checking".to_string()),
            tool_calls: vec![
                ToolCall::new("tu_1".to_string(), "get_valid_moves".to_string(), json!({})),
                ToolCall::new("tu_2".to_string(), "next_player".to_string(), json!(null)),
            ],
        });
        log.push(Message::Tool(ToolResult::new("tu_1".to_string(), "[4]".to_string())));
        log.push(Message::Tool(ToolResult::new("tu_2".to_string(), "O".to_string())));

        let body = backend().request_body(&log, &[]);
        assert_eq!(body["system"], "play well");
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[1]["content"][1]["id"], "tu_1");
        assert_eq!(messages[1]["content"][2]["input"], json!({}));
        assert_eq!(messages[2]["role"], "user");
        assert_eq!(messages[2]["content"][0]["tool_use_id"], "tu_1");
        assert_eq!(messages[2]["content"][1]["tool_use_id"], "tu_2");
    }

    #[test]
    fn test_parse_mixed_reply() {
        let body = r#"{"content":[{"type":"text","text":"Let me look."},
            {"type":"tool_use","id":"tu_7","name":"get_valid_moves","input":{}}]}"#;
        let reply = AnthropicBackend::parse_reply(body).unwrap();
        assert_eq!(reply.content.as_deref(), Some("Let me look."));
        assert_eq!(reply.tool_calls[0].id, "tu_7");
    }

    #[test]
    fn test_parse_missing_content_fails() {
        assert!(AnthropicBackend::parse_reply(r#"{"type":"error"}"#).is_err());
    }
}
