//! Tool invocation requests and their correlated results.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Execution status of a tool call.
///
/// Status only moves forward: pending, then running, then exactly one of
/// completed or failed. A terminal state is never left.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCallStatus {
    /// Created but not yet handed to an executor.
    #[default]
    Pending,
    /// Currently executing.
    Running,
    /// Finished successfully.
    Completed,
    /// Finished with an error.
    Failed,
}

impl ToolCallStatus {
    /// Returns `true` once the call has finished, successfully or not.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// A named tool invocation with caller-supplied arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    id: String,
    name: String,
    #[serde(default)]
    arguments: Map<String, Value>,
    #[serde(default)]
    status: ToolCallStatus,
}

impl ToolCall {
    /// Creates a pending call, generating a unique id when none is supplied.
    #[must_use]
    pub fn new(id: Option<String>, name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            id: id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: name.into(),
            arguments,
            status: ToolCallStatus::Pending,
        }
    }

    /// Returns the call identifier, stable for the call's lifetime.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the target tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the caller-supplied argument map.
    #[must_use]
    pub const fn arguments(&self) -> &Map<String, Value> {
        &self.arguments
    }

    /// Returns the current execution status.
    #[must_use]
    pub const fn status(&self) -> ToolCallStatus {
        self.status
    }

    /// Marks the call as running. Only a pending call can start.
    pub fn begin(&mut self) {
        if matches!(self.status, ToolCallStatus::Pending) {
            self.status = ToolCallStatus::Running;
        }
    }

    /// Marks a running call completed. Terminal states never revert.
    pub fn complete(&mut self) {
        if matches!(self.status, ToolCallStatus::Running) {
            self.status = ToolCallStatus::Completed;
        }
    }

    /// Marks a running call failed. Terminal states never revert.
    pub fn fail(&mut self) {
        if matches!(self.status, ToolCallStatus::Running) {
            self.status = ToolCallStatus::Failed;
        }
    }
}

/// Outcome of one tool call, correlated by `call_id`.
///
/// Exactly one of `content` and `error` carries meaning: a failed result
/// has an error message and no content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    call_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    metadata: Map<String, Value>,
}

impl ToolResult {
    /// Builds a successful result carrying the tool's output.
    #[must_use]
    pub fn success(call_id: impl Into<String>, content: Value) -> Self {
        Self {
            call_id: call_id.into(),
            content: Some(content),
            error: None,
            metadata: Map::new(),
        }
    }

    /// Builds a failed result; `content` stays empty.
    #[must_use]
    pub fn failure(call_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            content: None,
            error: Some(error.into()),
            metadata: Map::new(),
        }
    }

    /// Adds a metadata entry, returning the updated result for chaining.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Returns the identifier of the originating call.
    #[must_use]
    pub fn call_id(&self) -> &str {
        &self.call_id
    }

    /// Returns the success payload, absent on failure.
    #[must_use]
    pub const fn content(&self) -> Option<&Value> {
        self.content.as_ref()
    }

    /// Returns the error message, present only on failure.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns the free-form side information attached by the executor.
    #[must_use]
    pub const fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    /// Returns `true` when the call failed.
    #[must_use]
    pub const fn is_err(&self) -> bool {
        self.error.is_some()
    }
}
