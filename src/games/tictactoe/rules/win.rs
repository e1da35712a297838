//! Win detection logic for tic-tac-toe.

use super::super::types::{Board, Mark, Square};
use tracing::instrument;

/// The eight winning triples, in evaluation order: rows, columns, diagonals.
pub const LINES: [[usize; 3]; 8] = [
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];

fn line_owner(board: &Board, [a, b, c]: [usize; 3]) -> Option<Mark> {
    match (board.get(a), board.get(b), board.get(c)) {
        (Some(Square::Occupied(p1)), Some(Square::Occupied(p2)), Some(Square::Occupied(p3)))
            if p1 == p2 && p2 == p3 =>
        {
            Some(p1)
        }
        _ => None,
    }
}

/// Checks if there is a winner on the board.
///
/// Returns the mark owning the first completed line in [`LINES`] order.
#[instrument(skip(board))]
pub fn check_winner(board: &Board) -> Option<Mark> {
    LINES.iter().find_map(|line| line_owner(board, *line))
}

/// Owners of every completed line, in [`LINES`] order.
pub fn completed_lines(board: &Board) -> Vec<Mark> {
    LINES
        .iter()
        .filter_map(|line| line_owner(board, *line))
        .collect()
}
