//! Bounded, concurrently accessible storage of per-session conversational
//! state.
//!
//! The store enforces a maximum session count through synchronous
//! least-recently-active eviction at creation time and an idle TTL through
//! a periodic background sweep with graceful shutdown.

#![warn(missing_docs, clippy::pedantic)]

mod store;
mod sweeper;

pub use store::{SessionConfig, SessionError, SessionRecord, SessionResult, SessionStore};
pub use sweeper::SweeperHandle;
