//! Runtime registry for tool descriptors and fault-isolated execution.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use mcp_primitives::{ParamSchema, ToolCall, ToolResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Result alias used by tool executors and descriptor construction.
pub type RegistryResult<T> = Result<T, ToolError>;

/// Static metadata describing a registered tool.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolDescriptor {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    parameters: ParamSchema,
    #[serde(default)]
    required: Vec<String>,
}

impl ToolDescriptor {
    /// Creates a descriptor, deriving the required-parameter list from the
    /// supplied schema.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidDescriptor`] if the name is empty or
    /// whitespace.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: ParamSchema,
    ) -> RegistryResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ToolError::InvalidDescriptor {
                reason: "tool name cannot be empty".into(),
            });
        }

        let required = parameters.required_names();
        Ok(Self {
            name,
            description: description.into(),
            parameters,
            required,
        })
    }

    /// Returns the unique tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the declared parameter schema.
    #[must_use]
    pub const fn parameters(&self) -> &ParamSchema {
        &self.parameters
    }

    /// Returns the names of parameters that callers must supply.
    #[must_use]
    pub fn required(&self) -> &[String] {
        &self.required
    }
}

/// Trait implemented by tool bodies.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Invokes the tool with the supplied named arguments.
    async fn invoke(&self, arguments: Map<String, Value>) -> RegistryResult<Value>;
}

#[async_trait]
impl<F, Fut> Tool for F
where
    F: Send + Sync + Fn(Map<String, Value>) -> Fut,
    Fut: Future<Output = RegistryResult<Value>> + Send,
{
    async fn invoke(&self, arguments: Map<String, Value>) -> RegistryResult<Value> {
        (self)(arguments).await
    }
}

#[derive(Clone)]
struct ToolEntry {
    descriptor: ToolDescriptor,
    executor: Arc<dyn Tool>,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, ToolEntry>,
    // First-registration order; an overwrite keeps the original slot.
    order: Vec<String>,
}

/// Registry that stores tool entries keyed by name.
#[derive(Default)]
pub struct ToolRegistry {
    inner: RwLock<Inner>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read().expect("tool registry poisoned");
        f.debug_struct("ToolRegistry")
            .field("registered", &inner.order)
            .finish()
    }
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool, replacing any previous entry with the same name.
    ///
    /// Overwrites are permitted and logged rather than rejected. The new
    /// entry is visible to lookups as soon as this method returns.
    ///
    /// # Panics
    ///
    /// Panics if the internal registry lock is poisoned.
    pub fn register<T>(&self, descriptor: ToolDescriptor, tool: T)
    where
        T: Tool + 'static,
    {
        let mut inner = self.inner.write().expect("tool registry poisoned");
        let name = descriptor.name().to_owned();
        let entry = ToolEntry {
            descriptor,
            executor: Arc::new(tool),
        };

        if inner.entries.insert(name.clone(), entry).is_some() {
            warn!(tool = %name, "tool already registered, overwriting");
        } else {
            inner.order.push(name.clone());
            info!(tool = %name, "registered tool");
        }
    }

    /// Returns the descriptor for the named tool.
    #[must_use]
    pub fn descriptor(&self, name: &str) -> Option<ToolDescriptor> {
        let inner = self.inner.read().ok()?;
        inner
            .entries
            .get(name)
            .map(|entry| entry.descriptor.clone())
    }

    /// Returns `true` when the named tool is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner
            .read()
            .is_ok_and(|inner| inner.entries.contains_key(name))
    }

    /// Lists descriptors in first-registration order.
    ///
    /// # Panics
    ///
    /// Panics if the internal registry lock is poisoned.
    #[must_use]
    pub fn list(&self) -> Vec<ToolDescriptor> {
        let inner = self.inner.read().expect("tool registry poisoned");
        inner
            .order
            .iter()
            .filter_map(|name| inner.entries.get(name))
            .map(|entry| entry.descriptor.clone())
            .collect()
    }

    /// Lists registered tool names in first-registration order.
    ///
    /// # Panics
    ///
    /// Panics if the internal registry lock is poisoned.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let inner = self.inner.read().expect("tool registry poisoned");
        inner.order.clone()
    }

    fn executor(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let inner = self.inner.read().ok()?;
        inner
            .entries
            .get(name)
            .map(|entry| Arc::clone(&entry.executor))
    }

    /// Checks a call against the target descriptor without executing it.
    ///
    /// Returns human-readable violations; an empty list means the call
    /// conforms. The check is advisory: [`execute`](Self::execute) does not
    /// require a prior `validate`. Arguments unknown to the schema are not
    /// flagged, and only scalar parameter kinds are type-checked.
    #[must_use]
    pub fn validate(&self, call: &ToolCall) -> Vec<String> {
        let mut errors = Vec::new();

        let Some(descriptor) = self.descriptor(call.name()) else {
            errors.push(format!("Tool '{}' not found", call.name()));
            return errors;
        };

        for required in descriptor.required() {
            if !call.arguments().contains_key(required) {
                errors.push(format!("Required parameter '{required}' missing"));
            }
        }

        for (name, value) in call.arguments() {
            if let Some(spec) = descriptor.parameters().get(name) {
                if !spec.kind().matches(value) {
                    errors.push(format!(
                        "Parameter '{name}' should be {}",
                        spec.kind().label()
                    ));
                }
            }
        }

        errors
    }

    /// Executes a single call, converting every tool failure into a failed
    /// [`ToolResult`].
    ///
    /// An unknown tool name yields a failed result and leaves the call
    /// status untouched. Errors raised by the tool body never propagate to
    /// the caller of `execute`.
    pub async fn execute(&self, call: &mut ToolCall) -> ToolResult {
        let Some(executor) = self.executor(call.name()) else {
            return Self::not_found(call);
        };

        Self::run(executor, call).await
    }

    fn not_found(call: &ToolCall) -> ToolResult {
        ToolResult::failure(call.id(), format!("Tool '{}' not found", call.name()))
    }

    async fn run(executor: Arc<dyn Tool>, call: &mut ToolCall) -> ToolResult {
        call.begin();
        debug!(tool = %call.name(), call_id = %call.id(), "executing tool call");

        match executor.invoke(call.arguments().clone()).await {
            Ok(content) => {
                call.complete();
                ToolResult::success(call.id(), content)
                    .with_metadata("tool_name", Value::from(call.name().to_owned()))
            }
            Err(err) => {
                warn!(
                    tool = %call.name(),
                    call_id = %call.id(),
                    error = %err,
                    "tool call failed"
                );
                call.fail();
                ToolResult::failure(call.id(), err.to_string())
                    .with_metadata("tool_name", Value::from(call.name().to_owned()))
            }
        }
    }

    /// Executes every call concurrently, preserving input order in the
    /// returned results.
    ///
    /// Each call runs on its own task, so a failing or panicking tool body
    /// cannot affect sibling calls. A task-level failure still maps to a
    /// failed result for its slot; the output length always equals the
    /// input length.
    pub async fn execute_batch(&self, calls: Vec<ToolCall>) -> Vec<ToolResult> {
        if calls.is_empty() {
            return Vec::new();
        }

        let handles: Vec<_> = calls
            .into_iter()
            .map(|mut call| {
                let executor = self.executor(call.name());
                let call_id = call.id().to_owned();
                let tool_name = call.name().to_owned();
                let handle = tokio::spawn(async move {
                    match executor {
                        Some(executor) => Self::run(executor, &mut call).await,
                        None => Self::not_found(&call),
                    }
                });
                (call_id, tool_name, handle)
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (call_id, tool_name, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(err) => {
                    warn!(
                        tool = %tool_name,
                        call_id = %call_id,
                        error = %err,
                        "tool task failed to run"
                    );
                    ToolResult::failure(call_id, err.to_string())
                        .with_metadata("tool_name", Value::from(tool_name))
                }
            };
            results.push(result);
        }

        results
    }
}

/// Errors produced by descriptor construction and tool bodies.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Descriptor fields failed validation at registration time.
    #[error("invalid tool descriptor: {reason}")]
    InvalidDescriptor {
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// Tool execution failed.
    #[error("tool execution failed: {reason}")]
    Execution {
        /// Human-readable error returned by the tool implementation.
        reason: String,
    },
}

impl ToolError {
    /// Creates an execution error from the supplied reason.
    #[must_use]
    pub fn execution(reason: impl Into<String>) -> Self {
        Self::Execution {
            reason: reason.into(),
        }
    }
}
