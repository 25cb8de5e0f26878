//! MCP runtime core facade.
//!
//! Bundles the tool registry and session store crates behind feature flags
//! so a transport layer can depend on exactly the components it serves.
//! Both components are constructed explicitly and passed by handle into
//! the transport at startup; neither is a global.

#![warn(missing_docs, clippy::pedantic)]

/// Re-export shared primitives for convenience.
pub use mcp_primitives as primitives;

/// Tool registration, validation, and execution (enabled by `tools`).
#[cfg(feature = "tools")]
pub use mcp_tools as tools;

/// Bounded session storage with TTL expiry (enabled by `sessions`).
#[cfg(feature = "sessions")]
pub use mcp_sessions as sessions;
