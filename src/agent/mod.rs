//! Decision agents: whoever chooses the next move.

mod local;
mod remote;

pub use local::{LocalAgent, PayloadAgent, spawn_stdin_reader};
pub use remote::RemoteAgent;

use crate::games::tictactoe::Board;
use derive_more::{Display, Error};
use tracing::{error, instrument};

/// Capability to choose a move for the side to play.
///
/// Agents only propose a cell; the orchestrator checks legality and
/// applies the move.
#[async_trait::async_trait]
pub trait DecisionAgent: Send {
    /// Proposes a cell index for the next move.
    async fn select_move(&mut self, board: &Board) -> Result<usize, AgentError>;

    /// Returns the agent's display name.
    fn name(&self) -> &str;
}

/// What went wrong while obtaining a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum AgentErrorKind {
    /// The input source closed before a move was read.
    #[display("input closed")]
    InputClosed,
    /// Nothing left to play.
    #[display("no legal moves")]
    NoLegalMoves,
}

/// Agent error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Agent error ({}): {} at {}:{}", kind, message, file, line)]
pub struct AgentError {
    /// Error category.
    pub kind: AgentErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl AgentError {
    /// Creates a "no legal moves" error.
    #[track_caller]
    pub fn no_legal_moves(message: String) -> Self {
        Self::with_kind(AgentErrorKind::NoLegalMoves, message)
    }

    /// Creates an "input closed" error.
    #[track_caller]
    pub fn input_closed(message: String) -> Self {
        Self::with_kind(AgentErrorKind::InputClosed, message)
    }

    #[track_caller]
    #[instrument(skip(message))]
    fn with_kind(kind: AgentErrorKind, message: String) -> Self {
        let loc = std::panic::Location::caller();
        error!(?kind, error_message = %message, "Agent error created");
        Self {
            kind,
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
