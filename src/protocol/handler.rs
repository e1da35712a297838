//! One remote-agent turn as a bounded tool-calling conversation.

use super::conversation::{ConversationLog, Message};
use super::tools::ToolRegistry;
use crate::agent::AgentError;
use crate::backend::DecisionBackend;
use crate::games::tictactoe::{Board, Mark, legal_moves, lowest_legal, turn_owner};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Tool-call rounds served before falling back to the default move.
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 4;

/// Time allowed for a single backend call.
pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Why a remote turn stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnEnd {
    /// The backend answered with a legal move.
    FinalContent(usize),
    /// The final content was not a single integer.
    Unparseable,
    /// The final content named a cell that is not a legal move.
    IllegalIndex(usize),
    /// The backend kept requesting tools past the round limit.
    RoundLimitExceeded,
    /// The backend call failed.
    BackendUnavailable,
    /// The backend call did not finish in time.
    TimedOut,
}

impl TurnEnd {
    /// True when the backend's own move was used.
    pub fn accepted(self) -> bool {
        matches!(self, TurnEnd::FinalContent(_))
    }
}

/// The move chosen for a remote turn and how it was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Cell to play.
    pub mv: usize,
    /// Termination reason.
    pub end: TurnEnd,
    /// Tool-call rounds served during the turn.
    pub tool_rounds: usize,
}

/// Drives the request/response exchange with a decision backend.
///
/// Created once per process and shared read-only across sessions; each
/// call to [`decide`](Self::decide) owns its own conversation log.
#[derive(Clone)]
pub struct ProtocolHandler {
    backend: Arc<dyn DecisionBackend>,
    tools: ToolRegistry,
    max_tool_rounds: usize,
    backend_timeout: Duration,
}

impl std::fmt::Debug for ProtocolHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtocolHandler")
            .field("backend", &self.backend.name())
            .field("max_tool_rounds", &self.max_tool_rounds)
            .field("backend_timeout", &self.backend_timeout)
            .finish()
    }
}

impl ProtocolHandler {
    /// Creates a handler with default limits.
    pub fn new(backend: Arc<dyn DecisionBackend>) -> Self {
        Self {
            backend,
            tools: ToolRegistry::new(),
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            backend_timeout: DEFAULT_BACKEND_TIMEOUT,
        }
    }

    /// Sets the number of tool-call rounds served per turn.
    ///
    /// With zero rounds any tool request ends the turn with the default move.
    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    /// Sets the per-call backend timeout.
    pub fn with_backend_timeout(mut self, timeout: Duration) -> Self {
        self.backend_timeout = timeout;
        self
    }

    /// Runs one remote turn and returns the move to play.
    ///
    /// Backend output is never trusted: anything other than a single legal
    /// index resolves to the lowest legal index.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] only when the board has no legal move.
    #[instrument(skip(self, board), fields(backend = %self.backend.name()))]
    pub async fn decide(&self, board: &Board) -> Result<Decision, AgentError> {
        let Some(fallback) = lowest_legal(board) else {
            return Err(AgentError::no_legal_moves("No legal moves on the board".to_string()));
        };
        let legal = legal_moves(board);

        let mut log = ConversationLog::new();
        log.push(Message::system(instruction(board, turn_owner(board))));

        let mut tool_rounds = 0;
        let end = loop {
            let call = self.backend.complete(&log, self.tools.specs());
            let reply = match tokio::time::timeout(self.backend_timeout, call).await {
                Ok(Ok(reply)) => reply,
                Ok(Err(e)) => {
                    warn!(error = %e, "Backend unavailable");
                    break TurnEnd::BackendUnavailable;
                }
                Err(_) => {
                    warn!(timeout = ?self.backend_timeout, "Backend timed out");
                    break TurnEnd::TimedOut;
                }
            };

            log.push(Message::Assistant {
                content: reply.content.clone(),
                tool_calls: reply.tool_calls.clone(),
            });

            if reply.tool_calls.is_empty() {
                break interpret(reply.content.as_deref(), &legal);
            }

            if tool_rounds >= self.max_tool_rounds {
                warn!(tool_rounds, "Tool-call round limit exceeded");
                break TurnEnd::RoundLimitExceeded;
            }

            for call in &reply.tool_calls {
                log.push(Message::Tool(self.tools.dispatch(call, board)));
            }
            tool_rounds += 1;
            debug!(tool_rounds, calls = reply.tool_calls.len(), "Served tool calls");
        };

        let mv = match end {
            TurnEnd::FinalContent(mv) => mv,
            _ => fallback,
        };
        info!(mv, ?end, tool_rounds, messages = log.len(), "Remote turn finished");
        Ok(Decision {
            mv,
            end,
            tool_rounds,
        })
    }
}

fn interpret(content: Option<&str>, legal: &[usize]) -> TurnEnd {
    match content.map(str::trim).map(str::parse::<usize>) {
        Some(Ok(mv)) if legal.contains(&mv) => TurnEnd::FinalContent(mv),
        Some(Ok(mv)) => {
            warn!(mv, "Backend chose an illegal cell");
            TurnEnd::IllegalIndex(mv)
        }
        _ => {
            warn!(?content, "Backend content is not a move");
            TurnEnd::Unparseable
        }
    }
}

fn instruction(board: &Board, mover: Mark) -> String {
    let cells = serde_json::to_string(board).unwrap_or_default();
    format!(
        "You are playing tic-tac-toe as {mover}.\n\n\
         Board index layout:\n\
         \x20 0 | 1 | 2\n\
         \x20---+---+---\n\
         \x20 3 | 4 | 5\n\
         \x20---+---+---\n\
         \x20 6 | 7 | 8\n\n\
         Current board (row-major, \"\" is empty):\n\
         {cells}\n\n\
         First call get_valid_moves.\n\
         Then choose exactly one valid move.\n\
         Return only the move number, nothing else."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpret_accepts_legal_integer() {
        assert_eq!(interpret(Some(" 4\n"), &[0, 4]), TurnEnd::FinalContent(4));
    }

    #[test]
    fn test_interpret_rejects_occupied_cell() {
        assert_eq!(interpret(Some("1"), &[6, 7, 8]), TurnEnd::IllegalIndex(1));
    }

    #[test]
    fn test_interpret_rejects_garbage_and_silence() {
        assert_eq!(interpret(Some("the center"), &[4]), TurnEnd::Unparseable);
        assert_eq!(interpret(Some("-1"), &[4]), TurnEnd::Unparseable);
        assert_eq!(interpret(None, &[4]), TurnEnd::Unparseable);
    }

    #[test]
    fn test_instruction_embeds_board_and_mark() {
        let board = Board::from_symbols(["X", "", "", "", "", "", "", "", ""]).unwrap();
        let text = instruction(&board, Mark::O);
        assert!(text.contains("as O"));
        assert!(text.contains(r#"["X","","","","","","","",""]"#));
        assert!(text.contains("get_valid_moves"));
    }
}
