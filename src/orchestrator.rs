//! Turn orchestration between a local and a remote participant.
//!
//! The orchestrator is the only code that mutates a [`GameState`]. It runs
//! an explicit phase machine so transports can drive it one transition at
//! a time, a bounded number of placements at a time, or to completion.

use crate::agent::{AgentError, DecisionAgent};
use crate::games::tictactoe::{
    GameState, IllegalMove, Mark, is_legal, lowest_legal, turn_owner, winner,
};
use crate::sink::PresentationSink;
use derive_more::{Display, Error, From};
use tracing::{debug, info, instrument, warn};

/// Where the orchestrator is in the turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum Phase {
    /// Deciding whether the game is over and whose turn it is.
    Routing,
    /// Waiting for the local participant.
    AwaitingHumanMove,
    /// Waiting for the remote participant.
    AwaitingAgentMove,
    /// Handing the state to the presentation sink.
    Reporting,
    /// Game over. Absorbing.
    Terminal,
}

/// Errors that end a session.
#[derive(Debug, Display, Error, From)]
pub enum OrchestratorError {
    /// A participant could not produce a move.
    #[display("{_0}")]
    Agent(AgentError),
    /// A validated move was rejected by the board.
    #[display("Move rejected by board: {_0}")]
    Board(IllegalMove),
}

/// Runs one game session.
pub struct Orchestrator {
    state: GameState,
    phase: Phase,
    human_mark: Mark,
    human: Box<dyn DecisionAgent>,
    agent: Box<dyn DecisionAgent>,
    sink: Box<dyn PresentationSink>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("state", &self.state)
            .field("phase", &self.phase)
            .field("human_mark", &self.human_mark)
            .field("human", &self.human.name())
            .field("agent", &self.agent.name())
            .finish()
    }
}

impl Orchestrator {
    /// Creates an orchestrator for a fresh game.
    pub fn new(
        human: Box<dyn DecisionAgent>,
        agent: Box<dyn DecisionAgent>,
        sink: Box<dyn PresentationSink>,
    ) -> Self {
        Self::from_state(GameState::new(), human, agent, sink)
    }

    /// Creates an orchestrator resuming `state`.
    pub fn from_state(
        state: GameState,
        human: Box<dyn DecisionAgent>,
        agent: Box<dyn DecisionAgent>,
        sink: Box<dyn PresentationSink>,
    ) -> Self {
        Self {
            state,
            phase: Phase::Routing,
            human_mark: Mark::X,
            human,
            agent,
            sink,
        }
    }

    /// Sets which mark the local participant plays.
    pub fn with_human_mark(mut self, mark: Mark) -> Self {
        self.human_mark = mark;
        self
    }

    /// Current game state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Consumes the orchestrator, returning the final state.
    pub fn into_state(self) -> GameState {
        self.state
    }

    /// Performs one phase transition and returns the new phase.
    #[instrument(skip(self), fields(phase = %self.phase))]
    pub async fn step(&mut self) -> Result<Phase, OrchestratorError> {
        let next = match self.phase {
            Phase::Routing => {
                let outcome = winner(self.state.board());
                if outcome.is_terminal() {
                    self.state.set_outcome(outcome);
                    Phase::Reporting
                } else if turn_owner(self.state.board()) == self.human_mark {
                    Phase::AwaitingHumanMove
                } else {
                    Phase::AwaitingAgentMove
                }
            }
            Phase::AwaitingHumanMove => {
                self.play_turn(true).await?;
                Phase::Reporting
            }
            Phase::AwaitingAgentMove => {
                self.play_turn(false).await?;
                Phase::Reporting
            }
            Phase::Reporting => {
                self.sink.present(&self.state);
                if self.state.outcome().is_terminal() {
                    info!(outcome = ?self.state.outcome(), "Game over");
                    Phase::Terminal
                } else {
                    Phase::Routing
                }
            }
            Phase::Terminal => Phase::Terminal,
        };

        debug!(from = %self.phase, to = %next, "Transition");
        self.phase = next;
        Ok(next)
    }

    /// Steps until `max_placements` moves have been placed or the game ends.
    ///
    /// Stops at [`Phase::Routing`] after the last placement has been
    /// reported, or at [`Phase::Terminal`]. A game finished by the last
    /// placement is carried on to [`Phase::Terminal`] so the result is
    /// recorded and reported.
    #[instrument(skip(self))]
    pub async fn advance(&mut self, max_placements: usize) -> Result<Phase, OrchestratorError> {
        let mut placed = 0;
        while self.phase != Phase::Terminal {
            if self.phase == Phase::Routing
                && placed >= max_placements
                && !winner(self.state.board()).is_terminal()
            {
                break;
            }
            let before = self.phase;
            self.step().await?;
            if matches!(before, Phase::AwaitingHumanMove | Phase::AwaitingAgentMove) {
                placed += 1;
            }
        }
        Ok(self.phase)
    }

    /// Plays until the game ends.
    #[instrument(skip(self))]
    pub async fn run(&mut self) -> Result<&GameState, OrchestratorError> {
        info!(human = %self.human.name(), agent = %self.agent.name(), "Starting game");
        while self.phase != Phase::Terminal {
            self.step().await?;
        }
        Ok(&self.state)
    }

    async fn play_turn(&mut self, human: bool) -> Result<(), OrchestratorError> {
        let mark = turn_owner(self.state.board());
        let participant = if human {
            &mut self.human
        } else {
            &mut self.agent
        };

        debug!(player = %participant.name(), %mark, "Waiting for move");
        let proposed = participant.select_move(self.state.board()).await?;

        let pos = if is_legal(self.state.board(), proposed) {
            proposed
        } else {
            let fallback = lowest_legal(self.state.board()).ok_or_else(|| {
                AgentError::no_legal_moves("No legal moves on the board".to_string())
            })?;
            warn!(player = %participant.name(), proposed, fallback, "Illegal move replaced");
            fallback
        };

        self.state.apply(pos, mark)?;
        info!(player = %participant.name(), %mark, pos, "Move placed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::PayloadAgent;
    use crate::sink::TracingSink;

    fn payload(mv: usize) -> Box<dyn DecisionAgent> {
        Box::new(PayloadAgent::new("p", mv))
    }

    #[tokio::test]
    async fn test_routing_picks_human_for_x() {
        let mut orch = Orchestrator::new(payload(0), payload(1), Box::new(TracingSink));
        assert_eq!(orch.step().await.unwrap(), Phase::AwaitingHumanMove);
        assert_eq!(orch.step().await.unwrap(), Phase::Reporting);
        assert_eq!(orch.step().await.unwrap(), Phase::Routing);
        assert_eq!(orch.step().await.unwrap(), Phase::AwaitingAgentMove);
    }

    #[tokio::test]
    async fn test_human_mark_o_routes_agent_first() {
        let mut orch = Orchestrator::new(payload(0), payload(4), Box::new(TracingSink))
            .with_human_mark(Mark::O);
        assert_eq!(orch.step().await.unwrap(), Phase::AwaitingAgentMove);
        orch.advance(1).await.unwrap();
        assert_eq!(orch.state().board().squares()[4].symbol(), "X");
    }

    #[tokio::test]
    async fn test_illegal_move_replaced_by_lowest() {
        let mut orch = Orchestrator::new(payload(9), payload(0), Box::new(TracingSink));
        assert_eq!(orch.advance(1).await.unwrap(), Phase::Routing);
        assert_eq!(orch.state().board().squares()[0].symbol(), "X");
    }

    #[tokio::test]
    async fn test_terminal_is_absorbing() {
        let mut orch = Orchestrator::new(payload(0), payload(1), Box::new(TracingSink));
        orch.phase = Phase::Terminal;
        assert_eq!(orch.step().await.unwrap(), Phase::Terminal);
        assert_eq!(orch.state(), &GameState::new());
    }
}
