//! Turn ownership and move enumeration.

use super::super::types::{Board, Mark};
use tracing::instrument;

/// Whose turn it is, derived from the cell contents alone.
///
/// X moves whenever both marks have been placed equally often.
#[instrument(skip(board))]
pub fn turn_owner(board: &Board) -> Mark {
    if board.count_of(Mark::X) == board.count_of(Mark::O) {
        Mark::X
    } else {
        Mark::O
    }
}

/// All empty positions, ascending.
#[instrument(skip(board))]
pub fn legal_moves(board: &Board) -> Vec<usize> {
    board.empty_indices()
}

/// Checks whether `pos` names an empty square right now.
pub fn is_legal(board: &Board, pos: usize) -> bool {
    board.is_empty(pos)
}

/// The default move: lowest empty index, if any.
pub fn lowest_legal(board: &Board) -> Option<usize> {
    board.empty_indices().first().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_x_moves_first() {
        assert_eq!(turn_owner(&Board::new()), Mark::X);
    }

    #[test]
    fn test_o_moves_after_x() {
        let mut board = Board::new();
        board.place(4, Mark::X).unwrap();
        assert_eq!(turn_owner(&board), Mark::O);
    }

    #[test]
    fn test_legal_moves_ascending() {
        let mut board = Board::new();
        board.place(4, Mark::X).unwrap();
        board.place(0, Mark::O).unwrap();
        assert_eq!(legal_moves(&board), vec![1, 2, 3, 5, 6, 7, 8]);
        assert_eq!(lowest_legal(&board), Some(1));
    }

    #[test]
    fn test_out_of_range_is_illegal() {
        assert!(!is_legal(&Board::new(), 9));
    }
}
