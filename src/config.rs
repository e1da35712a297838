//! Application configuration.

use crate::backend::{BackendConfig, LlmProvider, build_backend};
use crate::games::tictactoe::Mark;
use crate::protocol::ProtocolHandler;
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Settings for the decision backend and the turn protocol.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct AppConfig {
    /// LLM provider (openai, groq or anthropic).
    #[serde(default = "default_provider")]
    provider: LlmProvider,

    /// Model name sent to the provider.
    #[serde(default = "default_model")]
    model: String,

    /// Maximum tokens per completion.
    #[serde(default = "default_max_tokens")]
    max_tokens: u32,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    temperature: f32,

    /// Overrides the provider's API base URL.
    #[serde(default)]
    base_url: Option<String>,

    /// Tool-call rounds served per remote turn.
    #[serde(default = "default_max_tool_rounds")]
    max_tool_rounds: usize,

    /// Seconds allowed for one backend call.
    #[serde(default = "default_backend_timeout_secs")]
    backend_timeout_secs: u64,

    /// Mark played by the local participant.
    #[serde(default = "default_human_mark")]
    human_mark: Mark,
}

fn default_provider() -> LlmProvider {
    LlmProvider::Groq
}

fn default_model() -> String {
    "openai/gpt-oss-120b".to_string()
}

fn default_max_tokens() -> u32 {
    256
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tool_rounds() -> usize {
    crate::protocol::DEFAULT_MAX_TOOL_ROUNDS
}

fn default_backend_timeout_secs() -> u64 {
    crate::protocol::DEFAULT_BACKEND_TIMEOUT.as_secs()
}

fn default_human_mark() -> Mark {
    Mark::X
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            base_url: None,
            max_tool_rounds: default_max_tool_rounds(),
            backend_timeout_secs: default_backend_timeout_secs(),
            human_mark: default_human_mark(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(provider = %config.provider, model = %config.model, "Config loaded");
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise returns the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            debug!(path = %path.as_ref().display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Replaces the provider.
    pub fn with_provider(mut self, provider: LlmProvider) -> Self {
        self.provider = provider;
        self
    }

    /// Replaces the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Replaces the local participant's mark.
    pub fn with_human_mark(mut self, mark: Mark) -> Self {
        self.human_mark = mark;
        self
    }

    /// Per-call backend timeout.
    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend_timeout_secs)
    }

    /// Creates backend connection settings.
    /// Reads the provider's API key from the environment.
    #[instrument(skip(self), fields(provider = %self.provider, model = %self.model))]
    pub fn create_backend_config(&self) -> Result<BackendConfig, ConfigError> {
        let var = self.provider.api_key_var();
        let api_key = std::env::var(var)
            .map_err(|_| ConfigError::new(format!("{} environment variable not set", var)))?;

        Ok(BackendConfig::new(
            self.provider,
            api_key,
            self.base_url.clone(),
            self.model.clone(),
            self.max_tokens,
            self.temperature,
        ))
    }

    /// Builds the shared protocol handler for this configuration.
    #[instrument(skip(self))]
    pub fn build_handler(&self) -> Result<Arc<ProtocolHandler>, ConfigError> {
        let backend = build_backend(self.create_backend_config()?)
            .map_err(|e| ConfigError::new(format!("Failed to build backend: {}", e)))?;

        Ok(Arc::new(
            ProtocolHandler::new(backend)
                .with_max_tool_rounds(self.max_tool_rounds)
                .with_backend_timeout(self.backend_timeout()),
        ))
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
