//! agent_tictactoe - play tic-tac-toe against a tool-calling LLM agent.

#![warn(missing_docs)]

mod cli;

use agent_tictactoe::{
    AppConfig, AppState, ConsoleSink, DecisionAgent, GameState, LocalAgent, Mark, Orchestrator,
    OrchestratorError, RemoteAgent, render, serve, spawn_stdin_reader,
};
use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_filter = match cli.command {
        Command::Play { .. } => "warn",
        Command::Serve { .. } => "info,agent_tictactoe=debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = AppConfig::load_or_default(&cli.config)?;
    if let Some(provider) = cli.provider {
        config = config.with_provider(provider);
    }
    if let Some(model) = cli.model {
        config = config.with_model(model);
    }

    match cli.command {
        Command::Play { agent_first } => run_play(config, agent_first).await,
        Command::Serve { host, port } => run_server(config, host, port).await,
    }
}

/// Play one game in the terminal.
#[instrument(skip(config))]
async fn run_play(config: AppConfig, agent_first: bool) -> Result<()> {
    let config = if agent_first {
        config.with_human_mark(Mark::O)
    } else {
        config
    };
    let handler = config.build_handler()?;
    let human_mark = *config.human_mark();

    println!("You play {human_mark}. Agent: {} ({})", config.model(), config.provider());
    println!("{}", render(&GameState::new()));

    let human: Box<dyn DecisionAgent> =
        Box::new(LocalAgent::new("You", spawn_stdin_reader(), std::io::stdout()));
    let agent: Box<dyn DecisionAgent> = Box::new(RemoteAgent::new("Agent", handler));

    let mut orchestrator = Orchestrator::new(human, agent, Box::new(ConsoleSink::stdout()))
        .with_human_mark(human_mark);

    match orchestrator.run().await {
        Ok(state) => {
            info!(outcome = ?state.outcome(), "Game finished");
            Ok(())
        }
        Err(OrchestratorError::Agent(e)) => {
            eprintln!("\nGame stopped: {}", e.message);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Run the HTTP game server.
#[instrument(skip(config))]
async fn run_server(config: AppConfig, host: String, port: u16) -> Result<()> {
    info!(provider = %config.provider(), model = %config.model(), "Starting HTTP server");
    let handler = config.build_handler()?;
    serve(&host, port, AppState::new(handler, *config.human_mark())).await
}
