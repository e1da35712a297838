//! Local participants: console input and single API payload moves.

use super::{AgentError, DecisionAgent};
use crate::games::tictactoe::{Board, legal_moves, turn_owner};
use std::io::{BufRead, Write};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Human player reading positions from a line source.
///
/// Prompts go to `out`. Lines that are not a non-negative integer are
/// rejected and the player is asked again; legality is left to the
/// orchestrator.
pub struct LocalAgent<W> {
    name: String,
    input_rx: mpsc::UnboundedReceiver<String>,
    out: W,
}

impl<W: Write + Send> LocalAgent<W> {
    /// Creates a new local player.
    pub fn new(name: impl Into<String>, input_rx: mpsc::UnboundedReceiver<String>, out: W) -> Self {
        Self {
            name: name.into(),
            input_rx,
            out,
        }
    }

    fn say(&mut self, text: &str) {
        if let Err(e) = write!(self.out, "{}", text).and_then(|_| self.out.flush()) {
            warn!(error = %e, "Failed to write prompt");
        }
    }
}

#[async_trait::async_trait]
impl<W: Write + Send> DecisionAgent for LocalAgent<W> {
    #[instrument(skip(self, board), fields(player = %self.name))]
    async fn select_move(&mut self, board: &Board) -> Result<usize, AgentError> {
        let prompt = format!(
            "Choose position for {}: {:?}\n",
            turn_owner(board),
            legal_moves(board)
        );
        self.say(&prompt);

        loop {
            self.say("Enter position: ");
            let Some(line) = self.input_rx.recv().await else {
                info!("Input closed while waiting for a move");
                return Err(AgentError::input_closed("Input closed".to_string()));
            };

            match line.trim().parse::<usize>() {
                Ok(pos) => {
                    debug!(pos, "Read position");
                    return Ok(pos);
                }
                Err(_) => {
                    debug!(%line, "Not a position");
                    self.say("Please enter a number.\n");
                }
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Spawns a thread forwarding stdin lines to a channel.
///
/// The channel closes when stdin reaches end of file.
pub fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
        debug!("Stdin reader finished");
    });
    rx
}

/// Local player whose single move arrived with an API request.
#[derive(Debug, Clone)]
pub struct PayloadAgent {
    name: String,
    mv: Option<usize>,
}

impl PayloadAgent {
    /// Creates an agent that plays `mv` once.
    pub fn new(name: impl Into<String>, mv: usize) -> Self {
        Self {
            name: name.into(),
            mv: Some(mv),
        }
    }
}

#[async_trait::async_trait]
impl DecisionAgent for PayloadAgent {
    async fn select_move(&mut self, _board: &Board) -> Result<usize, AgentError> {
        self.mv
            .take()
            .ok_or_else(|| AgentError::input_closed("Request move already played".to_string()))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
