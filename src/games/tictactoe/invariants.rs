//! First-class invariants for tic-tac-toe boards.
//!
//! Invariants are logical properties that must hold for every board the
//! orchestrator owns. Boards arriving from outside (the HTTP transport)
//! are checked against them before play resumes.

use super::rules::win::completed_lines;
use super::types::{Board, Mark};

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set, collecting every violation.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S, I1, I2> InvariantSet<S> for (I1, I2)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();

        if !I1::holds(state) {
            violations.push(InvariantViolation::new(I1::description()));
        }

        if !I2::holds(state) {
            violations.push(InvariantViolation::new(I2::description()));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// Invariant: X moves first and marks alternate.
///
/// `count(X) >= count(O)` and `count(X) - count(O) <= 1`.
pub struct MarkBalanceInvariant;

impl Invariant<Board> for MarkBalanceInvariant {
    fn holds(board: &Board) -> bool {
        let x = board.count_of(Mark::X);
        let o = board.count_of(Mark::O);
        x >= o && x - o <= 1
    }

    fn description() -> &'static str {
        "X moves first and marks alternate (0 <= count(X) - count(O) <= 1)"
    }
}

/// Invariant: at most one mark has three in a row.
pub struct SingleWinnerInvariant;

impl Invariant<Board> for SingleWinnerInvariant {
    fn holds(board: &Board) -> bool {
        let lines = completed_lines(board);
        lines.windows(2).all(|pair| pair[0] == pair[1])
    }

    fn description() -> &'static str {
        "At most one player has three in a row"
    }
}

/// All board invariants as a composable set.
pub type BoardInvariants = (MarkBalanceInvariant, SingleWinnerInvariant);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_board_holds() {
        assert!(BoardInvariants::check_all(&Board::new()).is_ok());
    }

    #[test]
    fn test_o_first_violates_balance() {
        let mut board = Board::new();
        board.place(4, Mark::O).unwrap();
        assert!(!MarkBalanceInvariant::holds(&board));
    }

    #[test]
    fn test_two_winners_violates() {
        let mut board = Board::new();
        for pos in [0, 1, 2] {
            board.place(pos, Mark::X).unwrap();
        }
        for pos in [3, 4, 5] {
            board.place(pos, Mark::O).unwrap();
        }
        let violations = BoardInvariants::check_all(&board).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].description,
            SingleWinnerInvariant::description()
        );
    }

    #[test]
    fn test_double_line_same_mark_holds() {
        // X completes a row and a column with one final move.
        let board = Board::from_symbols(["X", "X", "X", "O", "O", "X", "O", "O", "X"]);
        assert!(board.is_ok());
    }
}
