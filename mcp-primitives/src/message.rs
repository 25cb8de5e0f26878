//! Conversation entries and session summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::call::{ToolCall, ToolResult};

/// Role of the author of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// The external caller.
    User,
    /// The response generator.
    Assistant,
    /// System-level instructions.
    System,
    /// Output fed back from a tool execution.
    Tool,
}

/// One entry in a session's conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    role: MessageRole,
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_results: Option<Vec<ToolResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timestamp: Option<DateTime<Utc>>,
}

impl Message {
    /// Creates a plain text message for the given role.
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: None,
            tool_results: None,
            timestamp: None,
        }
    }

    /// Attaches the tool calls requested by this message.
    #[must_use]
    pub fn with_tool_calls(mut self, calls: Vec<ToolCall>) -> Self {
        self.tool_calls = Some(calls);
        self
    }

    /// Attaches the tool results carried by this message.
    #[must_use]
    pub fn with_tool_results(mut self, results: Vec<ToolResult>) -> Self {
        self.tool_results = Some(results);
        self
    }

    /// Stamps the message with a creation time.
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Returns the author role.
    #[must_use]
    pub const fn role(&self) -> MessageRole {
        self.role
    }

    /// Returns the text content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the tool calls requested by this message, if any.
    #[must_use]
    pub fn tool_calls(&self) -> Option<&[ToolCall]> {
        self.tool_calls.as_deref()
    }

    /// Returns the tool results carried by this message, if any.
    #[must_use]
    pub fn tool_results(&self) -> Option<&[ToolResult]> {
        self.tool_results.as_deref()
    }

    /// Returns the creation time, if stamped.
    #[must_use]
    pub const fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }
}

/// Point-in-time summary of one live session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    session_id: String,
    created_at: DateTime<Utc>,
    message_count: usize,
    last_activity: DateTime<Utc>,
}

impl SessionInfo {
    /// Creates a summary from a session's bookkeeping fields.
    #[must_use]
    pub fn new(
        session_id: impl Into<String>,
        created_at: DateTime<Utc>,
        message_count: usize,
        last_activity: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            created_at,
            message_count,
            last_activity,
        }
    }

    /// Returns the session identifier.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Returns the creation time.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the number of retained messages.
    #[must_use]
    pub const fn message_count(&self) -> usize {
        self.message_count
    }

    /// Returns the time of the most recent touch.
    #[must_use]
    pub const fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }
}
