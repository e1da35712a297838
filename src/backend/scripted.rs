//! In-process backend that replays a fixed script.
//!
//! Used by tests and offline runs to drive the protocol handler through
//! exact reply sequences, including failures and stalls.

use super::{BackendError, BackendReply, DecisionBackend};
use crate::protocol::{ConversationLog, ToolSpec};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

/// One scripted backend response.
#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// Answer with this reply.
    Reply(BackendReply),
    /// Fail with this message.
    Fail(String),
    /// Sleep, then answer with the reply.
    Stall(Duration, BackendReply),
}

/// Backend that answers from a queue of [`ScriptStep`]s.
///
/// Every conversation it receives is recorded for inspection.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    steps: Mutex<VecDeque<ScriptStep>>,
    received: Mutex<Vec<ConversationLog>>,
}

impl ScriptedBackend {
    /// Creates a backend that plays `steps` in order.
    pub fn new(steps: impl IntoIterator<Item = ScriptStep>) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
            received: Mutex::new(Vec::new()),
        }
    }

    /// Creates a backend that answers with `replies` in order.
    pub fn replies(replies: impl IntoIterator<Item = BackendReply>) -> Self {
        Self::new(replies.into_iter().map(ScriptStep::Reply))
    }

    /// Conversations received so far, one per call.
    pub async fn received(&self) -> Vec<ConversationLog> {
        self.received.lock().await.clone()
    }

    /// Number of calls made so far.
    pub async fn calls(&self) -> usize {
        self.received.lock().await.len()
    }
}

#[async_trait::async_trait]
impl DecisionBackend for ScriptedBackend {
    #[instrument(skip_all, fields(messages = log.len()))]
    async fn complete(
        &self,
        log: &ConversationLog,
        _tools: &[ToolSpec],
    ) -> Result<BackendReply, BackendError> {
        self.received.lock().await.push(log.clone());
        let step = self.steps.lock().await.pop_front();
        match step {
            Some(ScriptStep::Reply(reply)) => {
                debug!(?reply, "Scripted reply");
                Ok(reply)
            }
            Some(ScriptStep::Fail(message)) => Err(BackendError::new(message)),
            Some(ScriptStep::Stall(delay, reply)) => {
                tokio::time::sleep(delay).await;
                Ok(reply)
            }
            None => {
                warn!("Script exhausted");
                Err(BackendError::new("Script exhausted".to_string()))
            }
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
