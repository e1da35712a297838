//! Messages exchanged with a decision backend during one remote turn.

use serde::{Deserialize, Serialize};

/// A tool invocation requested by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_new::new)]
pub struct ToolCall {
    /// Backend-assigned identifier, echoed back in the [`ToolResult`].
    pub id: String,
    /// Name of the requested tool.
    pub name: String,
    /// Arguments as decoded JSON.
    pub arguments: serde_json::Value,
}

/// The answer to a [`ToolCall`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct ToolResult {
    /// Identifier of the originating call.
    pub id: String,
    /// Tool output as text.
    pub content: String,
}

/// One entry in the conversation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    /// Instruction for the backend.
    System {
        /// Instruction text.
        content: String,
    },
    /// A backend reply: final text, tool requests, or both.
    Assistant {
        /// Text content, if any.
        content: Option<String>,
        /// Requested tool calls, possibly empty.
        tool_calls: Vec<ToolCall>,
    },
    /// Result of a tool call.
    Tool(ToolResult),
}

impl Message {
    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Message::System {
            content: content.into(),
        }
    }
}

/// Ordered messages for a single remote-agent turn.
///
/// A log is created fresh for each turn and dropped when the turn ends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationLog {
    messages: Vec<Message>,
}

impl ConversationLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// All messages, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if nothing has been logged.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The first system instruction, if present.
    pub fn system_prompt(&self) -> Option<&str> {
        self.messages.iter().find_map(|m| match m {
            Message::System { content } => Some(content.as_str()),
            _ => None,
        })
    }
}
