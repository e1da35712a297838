//! Command-line interface for agent_tictactoe.

use agent_tictactoe::LlmProvider;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tic-tac-toe against a tool-calling LLM agent
#[derive(Parser, Debug)]
#[command(name = "agent_tictactoe")]
#[command(about = "Play tic-tac-toe against an LLM agent", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML config file (defaults are used if it does not exist)
    #[arg(short, long, global = true, default_value = "agent_tictactoe.toml")]
    pub config: PathBuf,

    /// Override the LLM provider (openai, groq, anthropic)
    #[arg(long, global = true)]
    pub provider: Option<LlmProvider>,

    /// Override the model name
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a game in the terminal
    Play {
        /// Let the agent take X and move first
        #[arg(long)]
        agent_first: bool,
    },

    /// Run the HTTP game server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to bind to
        #[arg(short, long, env = "PORT", default_value = "10000")]
        port: u16,
    },
}
