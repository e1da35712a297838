//! Tests for TOML configuration loading.

use agent_tictactoe::{AppConfig, LlmProvider, Mark};
use std::io::Write;
use std::time::Duration;

#[test]
fn test_defaults() {
    let config = AppConfig::default();
    assert_eq!(*config.provider(), LlmProvider::Groq);
    assert_eq!(config.model(), "openai/gpt-oss-120b");
    assert_eq!(*config.max_tool_rounds(), 4);
    assert_eq!(config.backend_timeout(), Duration::from_secs(30));
    assert_eq!(*config.human_mark(), Mark::X);
    assert_eq!(*config.base_url(), None);
}

#[test]
fn test_partial_file_fills_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
provider = "anthropic"
model = "claude-3-5-haiku-20241022"
max_tool_rounds = 0
human_mark = "O"
"#
    )
    .unwrap();

    let config = AppConfig::from_file(file.path()).unwrap();
    assert_eq!(*config.provider(), LlmProvider::Anthropic);
    assert_eq!(config.model(), "claude-3-5-haiku-20241022");
    assert_eq!(*config.max_tool_rounds(), 0);
    assert_eq!(*config.human_mark(), Mark::O);
    assert_eq!(*config.max_tokens(), 256);
    assert_eq!(*config.backend_timeout_secs(), 30);
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::load_or_default(dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, AppConfig::default());
}

#[test]
fn test_bad_file_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, r#"provider = "carrier-pigeon""#).unwrap();

    let err = AppConfig::from_file(file.path()).unwrap_err();
    assert!(err.message.contains("Failed to parse config"));
}

#[test]
fn test_cli_overrides() {
    let config = AppConfig::default()
        .with_provider(LlmProvider::OpenAI)
        .with_model("gpt-4o-mini");
    assert_eq!(*config.provider(), LlmProvider::OpenAI);
    assert_eq!(config.model(), "gpt-4o-mini");
}
