//! Core domain types for tic-tac-toe.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

/// Number of cells on the board.
pub const CELL_COUNT: usize = 9;

/// Marker placed by a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum Mark {
    /// Player X (goes first).
    X,
    /// Player O (goes second).
    O,
}

impl Mark {
    /// Returns the opponent's mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

/// A square on the tic-tac-toe board.
///
/// On the wire a square is a bare symbol: `""`, `"X"` or `"O"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Square {
    /// Empty square.
    #[default]
    Empty,
    /// Square occupied by a player.
    Occupied(Mark),
}

impl Square {
    /// Wire symbol for this square.
    pub fn symbol(self) -> &'static str {
        match self {
            Square::Empty => "",
            Square::Occupied(Mark::X) => "X",
            Square::Occupied(Mark::O) => "O",
        }
    }
}

impl From<Square> for String {
    fn from(square: Square) -> Self {
        square.symbol().to_string()
    }
}

impl TryFrom<String> for Square {
    type Error = BoardError;

    fn try_from(symbol: String) -> Result<Self, Self::Error> {
        match symbol.as_str() {
            "" => Ok(Square::Empty),
            "X" => Ok(Square::Occupied(Mark::X)),
            "O" => Ok(Square::Occupied(Mark::O)),
            _ => Err(BoardError::UnknownSymbol(symbol)),
        }
    }
}

/// Rejected placement on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum IllegalMove {
    /// Index is outside 0..=8.
    #[display("position {_0} is out of bounds (must be 0-8)")]
    OutOfRange(#[error(not(source))] usize),
    /// Target square already holds a mark.
    #[display("position {_0} is already occupied")]
    Occupied(#[error(not(source))] usize),
}

/// Board rejected while building it from untrusted cells.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum BoardError {
    /// A cell symbol other than `""`, `"X"` or `"O"`.
    #[display("unknown cell symbol {_0:?}")]
    UnknownSymbol(#[error(not(source))] String),
    /// The board breaks one or more invariants.
    #[display("board violates invariants: {}", _0.join("; "))]
    InvariantViolated(#[error(not(source))] Vec<String>),
}

/// 3x3 tic-tac-toe board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Board {
    /// Squares in row-major order (0-8).
    squares: [Square; CELL_COUNT],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a board from untrusted cells, checking the board invariants.
    #[instrument(skip(squares))]
    pub fn from_cells(squares: [Square; CELL_COUNT]) -> Result<Self, BoardError> {
        use super::invariants::{BoardInvariants, InvariantSet};

        let board = Self { squares };
        BoardInvariants::check_all(&board).map_err(|violations| {
            warn!(?violations, "Rejecting board");
            BoardError::InvariantViolated(
                violations.into_iter().map(|v| v.description).collect(),
            )
        })?;
        Ok(board)
    }

    /// Builds a board from wire symbols (`""`, `"X"`, `"O"`).
    pub fn from_symbols(symbols: [&str; CELL_COUNT]) -> Result<Self, BoardError> {
        let mut squares = [Square::Empty; CELL_COUNT];
        for (square, symbol) in squares.iter_mut().zip(symbols) {
            *square = Square::try_from(symbol.to_string())?;
        }
        Self::from_cells(squares)
    }

    /// Gets the square at the given position (0-8).
    pub fn get(&self, pos: usize) -> Option<Square> {
        self.squares.get(pos).copied()
    }

    /// Checks if a square is empty. Out-of-range positions are never empty.
    pub fn is_empty(&self, pos: usize) -> bool {
        matches!(self.get(pos), Some(Square::Empty))
    }

    /// Places a mark on an empty square.
    pub fn place(&mut self, pos: usize, mark: Mark) -> Result<(), IllegalMove> {
        let square = self
            .squares
            .get_mut(pos)
            .ok_or(IllegalMove::OutOfRange(pos))?;
        if *square != Square::Empty {
            return Err(IllegalMove::Occupied(pos));
        }
        *square = Square::Occupied(mark);
        Ok(())
    }

    /// Indices of all empty squares, ascending.
    pub fn empty_indices(&self) -> Vec<usize> {
        (0..CELL_COUNT).filter(|&pos| self.is_empty(pos)).collect()
    }

    /// Number of squares holding the given mark.
    pub fn count_of(&self, mark: Mark) -> usize {
        self.squares
            .iter()
            .filter(|s| **s == Square::Occupied(mark))
            .count()
    }

    /// Checks if the board is full.
    pub fn is_full(&self) -> bool {
        self.squares.iter().all(|s| *s != Square::Empty)
    }

    /// Returns all squares as a slice.
    pub fn squares(&self) -> &[Square; CELL_COUNT] {
        &self.squares
    }
}

/// Result of the game so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Outcome {
    /// Game is ongoing.
    #[default]
    InProgress,
    /// Game ended with three in a row.
    Winner(Mark),
    /// Board is full with no winner.
    Draw,
}

impl Outcome {
    /// Returns true once the game has ended.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Outcome::InProgress)
    }

    /// Wire label: `None` while in progress, else `"X"`, `"O"` or `"Draw"`.
    pub fn label(self) -> Option<&'static str> {
        match self {
            Outcome::InProgress => None,
            Outcome::Winner(Mark::X) => Some("X"),
            Outcome::Winner(Mark::O) => Some("O"),
            Outcome::Draw => Some("Draw"),
        }
    }
}

/// Complete game state for one session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GameState {
    board: Board,
    outcome: Outcome,
}

impl GameState {
    /// Creates a new game on an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resumes a game from an existing board.
    pub fn from_board(board: Board) -> Self {
        Self {
            board,
            outcome: Outcome::InProgress,
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the outcome.
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Places a mark. Callers validate legality first.
    pub(crate) fn apply(&mut self, pos: usize, mark: Mark) -> Result<(), IllegalMove> {
        self.board.place(pos, mark)
    }

    /// Records the outcome. A terminal outcome is never overwritten.
    pub(crate) fn set_outcome(&mut self, outcome: Outcome) {
        if self.outcome.is_terminal() {
            if outcome != self.outcome {
                warn!(current = ?self.outcome, ignored = ?outcome, "Outcome already final");
            }
            return;
        }
        self.outcome = outcome;
    }
}
