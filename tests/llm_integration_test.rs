//! Live backend tests. Run with `--features api` and API keys in `.env`.

use agent_tictactoe::{
    AppConfig, Board, DecisionAgent, LlmProvider, Orchestrator, PayloadAgent, RemoteAgent,
    TracingSink, legal_moves,
};
use tracing::instrument;

async fn check_provider(provider: LlmProvider, model: &str) {
    dotenvy::dotenv().ok();

    let handler = AppConfig::default()
        .with_provider(provider)
        .with_model(model)
        .build_handler()
        .expect("Failed to build handler");

    let board = Board::from_symbols(["X", "O", "X", "X", "O", "O", "", "", ""]).unwrap();
    let decision = handler.decide(&board).await.expect("Failed to decide");

    assert!(legal_moves(&board).contains(&decision.mv));
    eprintln!("Decision: {:?}", decision);
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_groq_decides_legal_move() {
    check_provider(LlmProvider::Groq, "openai/gpt-oss-120b").await;
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_openai_decides_legal_move() {
    check_provider(LlmProvider::OpenAI, "gpt-4o-mini").await;
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_anthropic_decides_legal_move() {
    check_provider(LlmProvider::Anthropic, "claude-3-5-haiku-20241022").await;
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_agent_replies_to_opening() {
    dotenvy::dotenv().ok();

    let handler = AppConfig::default()
        .build_handler()
        .expect("Failed to build handler");
    let human: Box<dyn DecisionAgent> = Box::new(PayloadAgent::new("web", 4));
    let agent: Box<dyn DecisionAgent> = Box::new(RemoteAgent::new("agent", handler));
    let mut game = Orchestrator::new(human, agent, Box::new(TracingSink));

    game.advance(2).await.expect("Failed to advance");
    let board = game.state().board();
    assert_eq!(legal_moves(board).len(), 7);
}
