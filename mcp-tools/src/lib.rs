//! Tool discovery, validation, and execution for the MCP runtime.
//!
//! The registry exposed here maps operation names to descriptors and
//! executors, checks calls against their declared parameter schemas, and
//! runs batches of calls with per-call fault isolation.

#![warn(missing_docs, clippy::pedantic)]

pub mod registry;

pub use registry::{RegistryResult, Tool, ToolDescriptor, ToolError, ToolRegistry};
