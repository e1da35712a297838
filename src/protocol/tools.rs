//! Tools the decision backend may call before committing a move.

use super::conversation::{ToolCall, ToolResult};
use crate::games::tictactoe::{Board, legal_moves, turn_owner};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::IntoEnumIterator;
use tracing::{debug, instrument, warn};

/// Declaration of a callable tool, as sent to the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    /// Tool name.
    pub name: String,
    /// What the tool does.
    pub description: String,
    /// JSON schema of the arguments.
    pub parameters: serde_json::Value,
}

/// Arguments accepted by both tools.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct BoardArgs {
    /// The board as nine cells in row-major order; each cell is "", "X" or "O".
    #[serde(default)]
    pub board: Option<Vec<String>>,
}

/// The tools exposed to the backend.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum::EnumIter, strum::EnumString, strum::IntoStaticStr,
)]
pub enum GameTool {
    /// Lists the empty positions.
    #[strum(serialize = "get_valid_moves")]
    GetValidMoves,
    /// Reports whose turn it is.
    #[strum(serialize = "next_player")]
    NextPlayer,
}

impl GameTool {
    /// Wire name of the tool.
    pub fn name(self) -> &'static str {
        self.into()
    }

    fn description(self) -> &'static str {
        match self {
            GameTool::GetValidMoves => {
                "Returns the list of empty board positions (0-8) that are legal moves."
            }
            GameTool::NextPlayer => "Returns which player moves next: \"X\" or \"O\".",
        }
    }

    /// Declaration sent to the backend.
    pub fn spec(self) -> ToolSpec {
        let parameters = serde_json::to_value(schemars::schema_for!(BoardArgs))
            .unwrap_or_else(|_| serde_json::json!({ "type": "object" }));
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters,
        }
    }

    /// Evaluates the tool against the board.
    pub fn invoke(self, board: &Board) -> String {
        match self {
            GameTool::GetValidMoves => {
                let moves = legal_moves(board);
                serde_json::to_string(&moves).unwrap_or_else(|_| format!("{:?}", moves))
            }
            GameTool::NextPlayer => turn_owner(board).to_string(),
        }
    }
}

/// Dispatches tool calls for one turn against its authoritative board.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    specs: Vec<ToolSpec>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    /// Creates a registry exposing every [`GameTool`].
    pub fn new() -> Self {
        Self {
            specs: GameTool::iter().map(GameTool::spec).collect(),
        }
    }

    /// Tool declarations to send with each backend request.
    pub fn specs(&self) -> &[ToolSpec] {
        &self.specs
    }

    /// Runs one call and wraps the output with the call's identifier.
    ///
    /// The turn's board is authoritative; a board passed by the backend is
    /// only compared against it. Unknown tools yield an error message the
    /// backend can read and recover from.
    #[instrument(skip(self, call, board), fields(tool = %call.name, call_id = %call.id))]
    pub fn dispatch(&self, call: &ToolCall, board: &Board) -> ToolResult {
        let Ok(tool) = GameTool::from_str(&call.name) else {
            warn!("Backend requested an unknown tool");
            return ToolResult::new(
                call.id.clone(),
                format!("error: unknown tool '{}'", call.name),
            );
        };

        let args: BoardArgs = serde_json::from_value(call.arguments.clone()).unwrap_or_default();
        if let Some(claimed) = args.board.as_deref()
            && !matches_board(claimed, board)
        {
            debug!(?claimed, "Backend passed a stale board; using the live one");
        }

        let content = tool.invoke(board);
        debug!(%content, "Tool answered");
        ToolResult::new(call.id.clone(), content)
    }
}

fn matches_board(claimed: &[String], board: &Board) -> bool {
    claimed.len() == board.squares().len()
        && claimed
            .iter()
            .zip(board.squares())
            .all(|(symbol, square)| symbol == square.symbol())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::tictactoe::Mark;
    use serde_json::json;

    #[test]
    fn test_registry_declares_both_tools() {
        let registry = ToolRegistry::new();
        let names: Vec<_> = registry.specs().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["get_valid_moves", "next_player"]);
        assert!(registry.specs()[0].parameters.is_object());
    }

    #[test]
    fn test_dispatch_echoes_identifier() {
        let mut board = Board::new();
        board.place(0, Mark::X).unwrap();
        let registry = ToolRegistry::new();

        let call = ToolCall::new("a1".into(), "get_valid_moves".into(), json!({}));
        let moves = registry.dispatch(&call, &board);
        assert_eq!(moves, ToolResult::new("a1".into(), "[1,2,3,4,5,6,7,8]".into()));

        let call = ToolCall::new("b2".into(), "next_player".into(), json!({}));
        let next = registry.dispatch(&call, &board);
        assert_eq!(next, ToolResult::new("b2".into(), "O".into()));
    }

    #[test]
    fn test_dispatch_ignores_claimed_board() {
        let board = Board::new();
        let registry = ToolRegistry::new();
        let call = ToolCall::new(
            "c3".into(),
            "next_player".into(),
            json!({ "board": ["X", "", "", "", "", "", "", "", ""] }),
        );
        assert_eq!(registry.dispatch(&call, &board).content, "X");
    }

    #[test]
    fn test_unknown_tool_reports_error() {
        let registry = ToolRegistry::new();
        let call = ToolCall::new("d4".into(), "resign".into(), json!(null));
        let result = registry.dispatch(&call, &Board::new());
        assert_eq!(result.id, "d4");
        assert!(result.content.starts_with("error:"));
    }
}
