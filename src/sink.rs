//! Presentation of game state to the outside world.

use crate::games::tictactoe::{GameState, Outcome, turn_owner};
use std::io::Write;
use tracing::{debug, warn};

/// Renders the grid and a status line.
///
/// ```text
///  X | O |
/// ---+---+---
///    | X |
/// ---+---+---
///    |   | O
/// Next turn: X
/// ```
pub fn render(state: &GameState) -> String {
    let squares = state.board().squares();
    let rows: Vec<String> = squares
        .chunks(3)
        .map(|row| {
            let cells: Vec<&str> = row
                .iter()
                .map(|sq| match sq.symbol() {
                    "" => " ",
                    s => s,
                })
                .collect();
            format!(" {} | {} | {} ", cells[0], cells[1], cells[2])
        })
        .collect();

    let status = match state.outcome() {
        Outcome::Winner(mark) => format!("Winner: {mark}"),
        Outcome::Draw => "Winner: Draw".to_string(),
        Outcome::InProgress => format!("Next turn: {}", turn_owner(state.board())),
    };

    format!("{}\n{}\n", rows.join("\n---+---+---\n"), status)
}

/// Receives the game state after every reported transition.
pub trait PresentationSink: Send {
    /// Shows the state. Must not mutate it.
    fn present(&mut self, state: &GameState);
}

/// Writes rendered boards to a stream.
pub struct ConsoleSink<W> {
    out: W,
}

impl<W: Write + Send> ConsoleSink<W> {
    /// Creates a sink writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl ConsoleSink<std::io::Stdout> {
    /// Sink writing to standard output.
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> PresentationSink for ConsoleSink<W> {
    fn present(&mut self, state: &GameState) {
        let text = render(state);
        if let Err(e) = writeln!(self.out, "{text}").and_then(|_| self.out.flush()) {
            warn!(error = %e, "Failed to present board");
        }
    }
}

/// Sends rendered boards to the log at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl PresentationSink for TracingSink {
    fn present(&mut self, state: &GameState) {
        debug!(outcome = ?state.outcome(), board = %render(state), "Board state");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::tictactoe::Board;

    #[test]
    fn test_render_empty_board() {
        let expected = "   |   |   \n---+---+---\n   |   |   \n---+---+---\n   |   |   \n\
                        Next turn: X\n";
        assert_eq!(render(&GameState::new()), expected);
    }

    #[test]
    fn test_render_next_turn_o() {
        let board = Board::from_symbols(["X", "", "", "", "", "", "", "", ""]).unwrap();
        let text = render(&GameState::from_board(board));
        assert!(text.starts_with(" X |   |   \n"));
        assert!(text.ends_with("Next turn: O\n"));
    }

    #[test]
    fn test_console_sink_writes_rendering() {
        let mut buf = Vec::new();
        {
            let mut sink = ConsoleSink::new(&mut buf);
            sink.present(&GameState::new());
        }
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, format!("{}\n", render(&GameState::new())));
    }
}
