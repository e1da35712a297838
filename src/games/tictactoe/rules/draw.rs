//! Draw detection logic for tic-tac-toe.

use super::super::types::Board;
use super::win::check_winner;
use tracing::instrument;

/// Checks if the board is a draw: full with no three in a row.
#[instrument(skip(board))]
pub fn is_draw(board: &Board) -> bool {
    board.is_full() && check_winner(board).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::tictactoe::Mark;

    #[test]
    fn test_empty_board_not_draw() {
        assert!(!is_draw(&Board::new()));
    }

    #[test]
    fn test_draw_detection() {
        // X O X / O X X / O X O
        let board =
            Board::from_symbols(["X", "O", "X", "O", "X", "X", "O", "X", "O"]).unwrap();
        assert!(is_draw(&board));
    }

    #[test]
    fn test_not_draw_if_winner() {
        let mut board = Board::new();
        for (pos, mark) in [
            (0, Mark::X),
            (3, Mark::O),
            (1, Mark::X),
            (4, Mark::O),
            (2, Mark::X),
        ] {
            board.place(pos, mark).unwrap();
        }
        assert!(!is_draw(&board));
    }
}
