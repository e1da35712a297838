//! Remote participant backed by a tool-calling decision backend.

use super::{AgentError, DecisionAgent};
use crate::games::tictactoe::Board;
use crate::protocol::{Decision, ProtocolHandler};
use std::sync::Arc;
use tracing::instrument;

/// Agent whose moves come from a [`ProtocolHandler`] conversation.
#[derive(Debug, Clone)]
pub struct RemoteAgent {
    name: String,
    handler: Arc<ProtocolHandler>,
    last: Option<Decision>,
}

impl RemoteAgent {
    /// Creates a remote agent sharing `handler`.
    pub fn new(name: impl Into<String>, handler: Arc<ProtocolHandler>) -> Self {
        Self {
            name: name.into(),
            handler,
            last: None,
        }
    }

    /// The most recent decision, including how the turn ended.
    pub fn last_decision(&self) -> Option<Decision> {
        self.last
    }
}

#[async_trait::async_trait]
impl DecisionAgent for RemoteAgent {
    #[instrument(skip(self, board), fields(agent = %self.name))]
    async fn select_move(&mut self, board: &Board) -> Result<usize, AgentError> {
        let decision = self.handler.decide(board).await?;
        self.last = Some(decision);
        Ok(decision.mv)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
