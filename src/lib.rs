//! agent_tictactoe library - tic-tac-toe against a tool-calling LLM agent
//!
//! # Architecture
//!
//! - **Games**: board model, rules and invariants for tic-tac-toe
//! - **Agent**: participants that choose moves (console, API payload, LLM)
//! - **Protocol**: bounded tool-calling conversation for one agent turn
//! - **Backend**: chat-completion endpoints (OpenAI-compatible, Anthropic, scripted)
//! - **Orchestrator**: the turn state machine that owns the game state
//! - **Server**: HTTP transport, one request per human move
//!
//! # Example
//!
//! ```no_run
//! use agent_tictactoe::{Orchestrator, PayloadAgent, RemoteAgent, TracingSink, AppConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let handler = AppConfig::default().build_handler()?;
//! let mut game = Orchestrator::new(
//!     Box::new(PayloadAgent::new("web", 4)),
//!     Box::new(RemoteAgent::new("agent", handler)),
//!     Box::new(TracingSink),
//! );
//! game.advance(2).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod agent;
mod backend;
mod config;
mod games;
mod orchestrator;
mod protocol;
mod server;
mod sink;

// Crate-level exports - Game types (tic-tac-toe)
pub use games::tictactoe::{
    Board, BoardError, BoardInvariants, CELL_COUNT, GameState, IllegalMove, Invariant,
    InvariantSet, InvariantViolation, Mark, MarkBalanceInvariant, Outcome, SingleWinnerInvariant,
    Square, check_winner, is_draw, is_legal, legal_moves, lowest_legal, turn_owner, winner,
};

// Crate-level exports - Decision agents
pub use agent::{
    AgentError, AgentErrorKind, DecisionAgent, LocalAgent, PayloadAgent, RemoteAgent,
    spawn_stdin_reader,
};

// Crate-level exports - Tool-calling protocol
pub use protocol::{
    BoardArgs, ConversationLog, DEFAULT_BACKEND_TIMEOUT, DEFAULT_MAX_TOOL_ROUNDS, Decision,
    GameTool, Message, ProtocolHandler, ToolCall, ToolRegistry, ToolResult, ToolSpec, TurnEnd,
};

// Crate-level exports - Decision backends
pub use backend::{
    AnthropicBackend, BackendConfig, BackendError, BackendReply, DecisionBackend, LlmProvider,
    OpenAiBackend, ScriptStep, ScriptedBackend, build_backend,
};

// Crate-level exports - Orchestration and presentation
pub use orchestrator::{Orchestrator, OrchestratorError, Phase};
pub use sink::{ConsoleSink, PresentationSink, TracingSink, render};

// Crate-level exports - Configuration and transport
pub use config::{AppConfig, ConfigError};
pub use server::{ApiError, AppState, MoveRequest, MoveResponse, router, serve};
