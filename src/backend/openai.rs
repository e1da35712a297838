//! OpenAI-compatible chat completions (OpenAI, Groq).

use super::{BackendConfig, BackendError, BackendReply, DecisionBackend};
use crate::protocol::{ConversationLog, Message, ToolCall, ToolSpec};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, error, info, instrument};

/// Backend speaking the `/chat/completions` tool-calling dialect.
#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    config: BackendConfig,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    id: String,
    function: WireFunction,
}

#[derive(Debug, Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

impl OpenAiBackend {
    /// Creates a backend from a configuration and a shared HTTP client.
    #[instrument(skip_all, fields(provider = %config.provider(), model = %config.model()))]
    pub fn new(config: BackendConfig, http: reqwest::Client) -> Self {
        info!("Creating OpenAI-compatible backend");
        Self { config, http }
    }

    /// Builds the request body for a conversation.
    pub fn request_body(&self, log: &ConversationLog, tools: &[ToolSpec]) -> Value {
        let messages: Vec<Value> = log.messages().iter().map(wire_message).collect();
        let tools: Vec<Value> = tools
            .iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name,
                        "description": tool.description,
                        "parameters": tool.parameters,
                    }
                })
            })
            .collect();

        json!({
            "model": self.config.model(),
            "messages": messages,
            "tools": tools,
            "max_completion_tokens": self.config.max_tokens(),
            "temperature": self.config.temperature(),
        })
    }

    /// Decodes a response body into a reply.
    pub fn parse_reply(body: &str) -> Result<BackendReply, BackendError> {
        let response: ChatResponse = serde_json::from_str(body).map_err(|e| {
            error!(error = ?e, "Failed to parse chat completion");
            BackendError::new(format!("Failed to parse response: {}", e))
        })?;

        let message = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| BackendError::new("No choices in chat completion".to_string()))?;

        let tool_calls = message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| {
                let arguments = serde_json::from_str(&call.function.arguments)
                    .unwrap_or(Value::String(call.function.arguments));
                ToolCall::new(call.id, call.function.name, arguments)
            })
            .collect();

        Ok(BackendReply {
            content: message.content,
            tool_calls,
        })
    }
}

fn wire_message(message: &Message) -> Value {
    match message {
        Message::System { content } => json!({ "role": "system", "content": content }),
        Message::Assistant {
            content,
            tool_calls,
        } if tool_calls.is_empty() => json!({ "role": "assistant", "content": content }),
        Message::Assistant {
            content,
            tool_calls,
        } => {
            let calls: Vec<Value> = tool_calls
                .iter()
                .map(|call| {
                    json!({
                        "id": call.id,
                        "type": "function",
                        "function": {
                            "name": call.name,
                            "arguments": call.arguments.to_string(),
                        }
                    })
                })
                .collect();
            json!({ "role": "assistant", "content": content, "tool_calls": calls })
        }
        Message::Tool(result) => json!({
            "role": "tool",
            "tool_call_id": result.id,
            "content": result.content,
        }),
    }
}

#[async_trait::async_trait]
impl DecisionBackend for OpenAiBackend {
    #[instrument(
        skip(self, log, tools),
        fields(provider = %self.config.provider(), messages = log.len())
    )]
    async fn complete(
        &self,
        log: &ConversationLog,
        tools: &[ToolSpec],
    ) -> Result<BackendReply, BackendError> {
        let url = format!("{}/chat/completions", self.config.base_url());
        let body = self.request_body(log, tools);

        debug!(%url, "Sending chat completion request");
        let response = self
            .http
            .post(&url)
            .bearer_auth(self.config.api_key())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Chat completion request failed");
                BackendError::new(format!("Chat completion request failed: {}", e))
            })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            error!(error = ?e, "Failed to read chat completion response");
            BackendError::new(format!("Failed to read response: {}", e))
        })?;

        if !status.is_success() {
            error!(status = %status, response = %response_text, "Chat completion API error");
            return Err(BackendError::new(format!(
                "Chat completion API error {}: {}",
                status, response_text
            )));
        }

        let reply = Self::parse_reply(&response_text)?;
        info!(
            tool_calls = reply.tool_calls.len(),
            has_content = reply.content.is_some(),
            "Chat completion received"
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

    fn backend() -> OpenAiBackend {
        let config = BackendConfig::new(
            LlmProvider::Groq,
            "test-key".to_string(),
            None,
            "openai/gpt-oss-120b".to_string(),
            512,
            0.7,
        );
        OpenAiBackend::new(config, reqwest::Client::new())
    }

    #[test]
    fn test_request_body_carries_tool_exchange() {
        let mut log = ConversationLog::new();
        log.push(Message::system("play"));
        log.push(Message::Assistant {
            content: None,
            tool_calls: vec![ToolCall::new(
                "call_1".to_string(),
                "get_valid_moves".to_string(),
                json!({}),
            )],
        });
        log.push(Message::Tool(ToolResult::new(
            "call_1".to_string(),
            "[6,7,8]".to_string(),
        )));

        let specs = crate::protocol::ToolRegistry::new().specs().to_vec();
        let body = backend().request_body(&log, &specs);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1]["tool_calls"][0]["id"], "call_1");
        assert_eq!(messages[1]["tool_calls"][0]["function"]["arguments"], "{}");
        assert_eq!(messages[2]["role"], "tool");
        assert_eq!(messages[2]["tool_call_id"], "call_1");
        assert_eq!(body["tools"].as_array().unwrap().len(), 2);
        assert_eq!(body["model"], "openai/gpt-oss-120b");
    }

    #[test]
    fn test_parse_tool_call_reply() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":null,
            "tool_calls":[{"id":"call_9","type":"function",
            "function":{"name":"next_player","arguments":"{\"board\":[]}"}}]}}]}"#;
        let reply = OpenAiBackend::parse_reply(body).unwrap();
        assert_eq!(reply.content, None);
        assert_eq!(reply.tool_calls.len(), 1);
        assert_eq!(reply.tool_calls[0].id, "call_9");
        assert_eq!(reply.tool_calls[0].arguments, json!({ "board": [] }));
    }

    #[test]
    fn test_parse_text_reply() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"4"}}]}"#;
        assert_eq!(OpenAiBackend::parse_reply(body).unwrap(), BackendReply::text("4"));
    }

    #[test]
    fn test_parse_empty_choices_fails() {
        assert!(OpenAiBackend::parse_reply(r#"{"choices":[]}"#).is_err());
    }
}
