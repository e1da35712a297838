//! Game rules for tic-tac-toe.
//!
//! This module contains pure functions for evaluating a board. Rules are
//! separated from board storage so the orchestrator, the agent tools and
//! the invariants all read the same definitions.

pub mod draw;
pub mod turn;
pub mod win;

pub use draw::is_draw;
pub use turn::{is_legal, legal_moves, lowest_legal, turn_owner};
pub use win::check_winner;

use super::types::{Board, Outcome};
use tracing::instrument;

/// Evaluates the board: a winner, a draw, or still in progress.
#[instrument(skip(board))]
pub fn winner(board: &Board) -> Outcome {
    if let Some(mark) = check_winner(board) {
        Outcome::Winner(mark)
    } else if is_draw(board) {
        Outcome::Draw
    } else {
        Outcome::InProgress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::tictactoe::Mark;

    #[test]
    fn test_winner_in_progress() {
        let board = Board::from_symbols(["X", "O", "", "", "", "", "", "", ""]).unwrap();
        assert_eq!(winner(&board), Outcome::InProgress);
    }

    #[test]
    fn test_winner_draw_agrees_with_is_draw() {
        let board = Board::from_symbols(["X", "O", "X", "O", "X", "X", "O", "X", "O"]).unwrap();
        assert!(is_draw(&board));
        assert_eq!(winner(&board), Outcome::Draw);
    }

    #[test]
    fn test_winner_on_full_board_is_not_draw() {
        // X completes the anti-diagonal with the last free cell.
        let board = Board::from_symbols(["O", "X", "X", "X", "X", "O", "X", "O", "O"]).unwrap();
        assert!(!is_draw(&board));
        assert_eq!(winner(&board), Outcome::Winner(Mark::X));
    }
}
