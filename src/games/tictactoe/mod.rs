mod invariants;
mod rules;
mod types;

pub use invariants::{
    BoardInvariants, Invariant, InvariantSet, InvariantViolation, MarkBalanceInvariant,
    SingleWinnerInvariant,
};
pub use rules::{
    check_winner, is_draw, is_legal, legal_moves, lowest_legal, turn_owner, winner,
};
pub use types::{Board, BoardError, CELL_COUNT, GameState, IllegalMove, Mark, Outcome, Square};
