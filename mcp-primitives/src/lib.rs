//! Core shared types for the MCP runtime: tool calls and results,
//! conversation messages, and parameter schemas.

#![warn(missing_docs, clippy::pedantic)]

mod call;
mod message;
mod schema;

/// Tool invocation request, outcome, and status types.
pub use call::{ToolCall, ToolCallStatus, ToolResult};
/// Conversation entries and session summaries.
pub use message::{Message, MessageRole, SessionInfo};
/// Parameter schema fragments used by tool descriptors.
pub use schema::{ParamKind, ParamSchema, ParamSpec};
