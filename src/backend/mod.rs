//! Decision backends: chat-completion endpoints that can call tools.
//!
//! A backend receives the whole conversation of the current turn plus the
//! declared tools, and replies with either final text or tool requests.

mod anthropic;
mod openai;
mod scripted;

pub use anthropic::AnthropicBackend;
pub use openai::OpenAiBackend;
pub use scripted::{ScriptStep, ScriptedBackend};

use crate::protocol::{ConversationLog, ToolCall, ToolSpec};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// LLM provider selection.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LlmProvider {
    /// OpenAI chat completions.
    OpenAI,
    /// Groq (OpenAI-compatible endpoint).
    Groq,
    /// Anthropic messages.
    Anthropic,
}

impl LlmProvider {
    /// Default API base URL.
    pub fn default_base_url(self) -> &'static str {
        match self {
            LlmProvider::OpenAI => "https://api.openai.com/v1",
            LlmProvider::Groq => "https://api.groq.com/openai/v1",
            LlmProvider::Anthropic => "https://api.anthropic.com/v1",
        }
    }

    /// Environment variable holding the API key.
    pub fn api_key_var(self) -> &'static str {
        match self {
            LlmProvider::OpenAI => "OPENAI_API_KEY",
            LlmProvider::Groq => "GROQ_API_KEY",
            LlmProvider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

/// Connection settings for a hosted backend.
#[derive(Debug, Clone, derive_getters::Getters)]
pub struct BackendConfig {
    provider: LlmProvider,
    #[getter(skip)]
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl BackendConfig {
    /// Creates a backend configuration.
    #[instrument(skip(api_key), fields(provider = %provider, model = %model))]
    pub fn new(
        provider: LlmProvider,
        api_key: String,
        base_url: Option<String>,
        model: String,
        max_tokens: u32,
        temperature: f32,
    ) -> Self {
        debug!("Creating backend config");
        let base_url = base_url
            .unwrap_or_else(|| provider.default_base_url().to_string())
            .trim_end_matches('/')
            .to_string();
        Self {
            provider,
            api_key,
            base_url,
            model,
            max_tokens,
            temperature,
        }
    }

    /// Gets the API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

/// What the backend answered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendReply {
    /// Text content, if any.
    pub content: Option<String>,
    /// Requested tool calls.
    pub tool_calls: Vec<ToolCall>,
}

impl BackendReply {
    /// A reply with only text content.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    /// A reply requesting tool calls.
    pub fn tools(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: None,
            tool_calls,
        }
    }
}

/// A chat-completion endpoint that may request tool calls.
#[async_trait::async_trait]
pub trait DecisionBackend: Send + Sync {
    /// Sends the conversation and tool declarations, returning the reply.
    async fn complete(
        &self,
        log: &ConversationLog,
        tools: &[ToolSpec],
    ) -> Result<BackendReply, BackendError>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

/// Builds the hosted backend for a configuration. Created once per process.
#[instrument(skip(config), fields(provider = %config.provider()))]
pub fn build_backend(config: BackendConfig) -> Result<Arc<dyn DecisionBackend>, BackendError> {
    info!("Building decision backend");
    let http = reqwest::Client::builder().build().map_err(|e| {
        error!(error = ?e, "Failed to build HTTP client");
        BackendError::new(format!("Failed to build HTTP client: {}", e))
    })?;
    let provider = *config.provider();
    let backend: Arc<dyn DecisionBackend> = match provider {
        LlmProvider::OpenAI | LlmProvider::Groq => Arc::new(OpenAiBackend::new(config, http)),
        LlmProvider::Anthropic => Arc::new(AnthropicBackend::new(config, http)),
    };
    Ok(backend)
}

/// Backend error.
#[derive(Debug, Clone, Display, Error)]
#[display("Backend error: {} at {}:{}", message, file, line)]
pub struct BackendError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl BackendError {
    /// Creates a new backend error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        error!(error_message = %message, "Backend error created");
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
