//! Tool-invocation protocol between the orchestrator and a decision backend.

mod conversation;
mod handler;
mod tools;

pub use conversation::{ConversationLog, Message, ToolCall, ToolResult};
pub use handler::{
    DEFAULT_BACKEND_TIMEOUT, DEFAULT_MAX_TOOL_ROUNDS, Decision, ProtocolHandler, TurnEnd,
};
pub use tools::{BoardArgs, GameTool, ToolRegistry, ToolSpec};
