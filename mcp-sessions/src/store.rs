//! Session records, store operations, and capacity eviction.

use std::collections::{HashMap, VecDeque};
use std::num::NonZeroUsize;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use mcp_primitives::{Message, SessionInfo};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// Configuration for the session store.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    max_sessions: NonZeroUsize,
    max_messages: NonZeroUsize,
    session_ttl: Duration,
    sweep_interval: Duration,
}

impl SessionConfig {
    /// Creates a configuration with the supplied session capacity.
    #[must_use]
    pub fn new(max_sessions: NonZeroUsize) -> Self {
        Self {
            max_sessions,
            ..Self::default()
        }
    }

    /// Sets the per-session message history bound.
    #[must_use]
    pub const fn with_max_messages(mut self, max_messages: NonZeroUsize) -> Self {
        self.max_messages = max_messages;
        self
    }

    /// Sets the idle duration after which a session expires.
    #[must_use]
    pub const fn with_session_ttl(mut self, session_ttl: Duration) -> Self {
        self.session_ttl = session_ttl;
        self
    }

    /// Sets the period of the background expiry sweep.
    #[must_use]
    pub const fn with_sweep_interval(mut self, sweep_interval: Duration) -> Self {
        self.sweep_interval = sweep_interval;
        self
    }

    /// Returns the maximum number of live sessions.
    #[must_use]
    pub const fn max_sessions(self) -> NonZeroUsize {
        self.max_sessions
    }

    /// Returns the per-session message history bound.
    #[must_use]
    pub const fn max_messages(self) -> NonZeroUsize {
        self.max_messages
    }

    /// Returns the idle TTL.
    #[must_use]
    pub const fn session_ttl(self) -> Duration {
        self.session_ttl
    }

    /// Returns the sweep period.
    #[must_use]
    pub const fn sweep_interval(self) -> Duration {
        self.sweep_interval
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions: NonZeroUsize::new(100).expect("non-zero"),
            max_messages: NonZeroUsize::new(50).expect("non-zero"),
            session_ttl: Duration::from_secs(24 * 60 * 60),
            sweep_interval: Duration::from_secs(60 * 60),
        }
    }
}

/// Per-session conversational state owned by the store.
///
/// `get` hands out clones; no caller retains a live reference into the
/// store across calls.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    created_at: SystemTime,
    last_activity: SystemTime,
    messages: VecDeque<Message>,
    metadata: Map<String, Value>,
}

impl SessionRecord {
    fn new(now: SystemTime) -> Self {
        Self {
            created_at: now,
            last_activity: now,
            messages: VecDeque::new(),
            metadata: Map::new(),
        }
    }

    /// Returns the creation time.
    #[must_use]
    pub const fn created_at(&self) -> SystemTime {
        self.created_at
    }

    /// Returns the time of the most recent touch. Never decreases.
    #[must_use]
    pub const fn last_activity(&self) -> SystemTime {
        self.last_activity
    }

    /// Returns the retained message history, oldest first.
    #[must_use]
    pub const fn messages(&self) -> &VecDeque<Message> {
        &self.messages
    }

    /// Returns the caller-managed metadata map.
    #[must_use]
    pub const fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    // Keeps last_activity monotone even if the wall clock steps back.
    fn touch(&mut self, now: SystemTime) {
        self.last_activity = self.last_activity.max(now);
    }

    fn push_message(&mut self, message: Message, max_messages: usize) {
        self.messages.push_back(message);
        while self.messages.len() > max_messages {
            self.messages.pop_front();
        }
    }
}

/// Bounded, concurrently accessible store of session records.
///
/// All mutations serialize through one async lock, so concurrent appends
/// to the same session can never drop or interleave a message.
#[derive(Debug)]
pub struct SessionStore {
    config: SessionConfig,
    inner: RwLock<HashMap<String, SessionRecord>>,
}

impl SessionStore {
    /// Creates an empty store with the supplied configuration.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the store configuration.
    #[must_use]
    pub const fn config(&self) -> SessionConfig {
        self.config
    }

    /// Creates a session, generating an id when none is supplied.
    ///
    /// When the store is already at capacity the single least-recently
    /// active record is evicted synchronously before insertion, so the
    /// store never holds more than `max_sessions` records.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Duplicate`] when the id is already taken.
    pub async fn create(&self, session_id: Option<String>) -> SessionResult<String> {
        let session_id = session_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let mut inner = self.inner.write().await;

        if inner.contains_key(&session_id) {
            return Err(SessionError::Duplicate { id: session_id });
        }

        if inner.len() >= self.config.max_sessions().get() {
            Self::evict_oldest(&mut inner);
        }

        inner.insert(session_id.clone(), SessionRecord::new(SystemTime::now()));
        info!(session_id = %session_id, "created session");
        Ok(session_id)
    }

    // Ties on last_activity break first-found in iteration order.
    fn evict_oldest(inner: &mut HashMap<String, SessionRecord>) {
        let oldest = inner
            .iter()
            .min_by_key(|(_, record)| record.last_activity())
            .map(|(id, _)| id.clone());

        if let Some(id) = oldest {
            inner.remove(&id);
            info!(session_id = %id, "evicted least recently active session");
        }
    }

    /// Returns a snapshot of the session, refreshing its activity.
    ///
    /// Absent sessions yield `None`, not an error.
    pub async fn get(&self, session_id: &str) -> Option<SessionRecord> {
        let mut inner = self.inner.write().await;
        let record = inner.get_mut(session_id)?;
        record.touch(SystemTime::now());
        Some(record.clone())
    }

    /// Appends a message, truncating history to the configured bound.
    ///
    /// Returns `false` for an unknown session; nothing is auto-created.
    pub async fn append_message(&self, session_id: &str, message: Message) -> bool {
        let mut inner = self.inner.write().await;
        let Some(record) = inner.get_mut(session_id) else {
            return false;
        };

        record.touch(SystemTime::now());
        record.push_message(message, self.config.max_messages().get());
        debug!(
            session_id = %session_id,
            count = record.messages().len(),
            "appended message"
        );
        true
    }

    /// Returns the most recent `limit` messages in append order, or the
    /// whole history when `limit` is `None`. Unknown sessions yield an
    /// empty vec.
    pub async fn messages(&self, session_id: &str, limit: Option<usize>) -> Vec<Message> {
        let mut inner = self.inner.write().await;
        let Some(record) = inner.get_mut(session_id) else {
            return Vec::new();
        };

        record.touch(SystemTime::now());
        let messages = record.messages();
        let skip = limit.map_or(0, |limit| messages.len().saturating_sub(limit));
        messages.iter().skip(skip).cloned().collect()
    }

    /// Deletes the session, reporting whether it existed.
    pub async fn delete(&self, session_id: &str) -> bool {
        let mut inner = self.inner.write().await;
        let existed = inner.remove(session_id).is_some();
        if existed {
            info!(session_id = %session_id, "deleted session");
        }
        existed
    }

    /// Returns a snapshot of summaries for every live session.
    pub async fn list_summaries(&self) -> Vec<SessionInfo> {
        let inner = self.inner.read().await;
        inner
            .iter()
            .map(|(id, record)| {
                SessionInfo::new(
                    id.clone(),
                    DateTime::<Utc>::from(record.created_at()),
                    record.messages().len(),
                    DateTime::<Utc>::from(record.last_activity()),
                )
            })
            .collect()
    }

    /// Writes one metadata entry, refreshing activity.
    ///
    /// Returns `false` for an unknown session.
    pub async fn set_metadata(&self, session_id: &str, key: impl Into<String>, value: Value) -> bool {
        let mut inner = self.inner.write().await;
        let Some(record) = inner.get_mut(session_id) else {
            return false;
        };

        record.touch(SystemTime::now());
        record.metadata.insert(key.into(), value);
        true
    }

    /// Reads one metadata entry, refreshing activity.
    ///
    /// Returns `None` for an unknown session or key.
    pub async fn get_metadata(&self, session_id: &str, key: &str) -> Option<Value> {
        let mut inner = self.inner.write().await;
        let record = inner.get_mut(session_id)?;
        record.touch(SystemTime::now());
        record.metadata.get(key).cloned()
    }

    /// Returns the number of live sessions.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Returns `true` when no sessions are live.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Removes every session idle longer than the TTL, returning how many
    /// were removed.
    ///
    /// The periodic sweeper drives this; tests can run a single cycle
    /// directly. One removal never aborts the rest.
    pub async fn sweep_expired(&self) -> usize {
        let ttl = self.config.session_ttl();
        let now = SystemTime::now();
        let mut inner = self.inner.write().await;

        let expired: Vec<String> = inner
            .iter()
            .filter(|(_, record)| {
                now.duration_since(record.last_activity())
                    .is_ok_and(|idle| idle > ttl)
            })
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            inner.remove(id);
            info!(session_id = %id, "expired idle session");
        }

        expired.len()
    }
}

/// Errors produced by the session store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// A session with the supplied id already exists.
    #[error("session `{id}` already exists")]
    Duplicate {
        /// The conflicting session identifier.
        id: String,
    },
}

/// Result alias for session store operations.
pub type SessionResult<T> = Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use mcp_primitives::MessageRole;
    use serde_json::json;

    fn config(max_sessions: usize) -> SessionConfig {
        SessionConfig::new(NonZeroUsize::new(max_sessions).unwrap())
    }

    fn text(content: impl Into<String>) -> Message {
        Message::new(MessageRole::User, content)
    }

    #[tokio::test]
    async fn create_generates_id_and_rejects_duplicates() {
        let store = SessionStore::new(SessionConfig::default());

        let generated = store.create(None).await.unwrap();
        assert!(!generated.is_empty());

        store.create(Some("s1".into())).await.unwrap();
        let err = store.create(Some("s1".into())).await.unwrap_err();
        assert_eq!(err, SessionError::Duplicate { id: "s1".into() });
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn capacity_evicts_least_recently_active() {
        let store = SessionStore::new(config(1));

        store.create(Some("s1".into())).await.unwrap();
        store.create(Some("s2".into())).await.unwrap();

        let summaries = store.list_summaries().await;
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].session_id(), "s2");
    }

    #[tokio::test]
    async fn eviction_targets_smallest_last_activity() {
        let store = SessionStore::new(config(2));

        store.create(Some("old".into())).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        store.create(Some("stale".into())).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;

        // Touch "old" so "stale" becomes the eviction candidate.
        assert!(store.get("old").await.is_some());
        store.create(Some("new".into())).await.unwrap();

        assert_eq!(store.len().await, 2);
        assert!(store.get("stale").await.is_none());
        assert!(store.get("old").await.is_some());
        assert!(store.get("new").await.is_some());
    }

    #[tokio::test]
    async fn append_truncates_to_most_recent_bound() {
        let store = SessionStore::new(SessionConfig::default());
        store.create(Some("s1".into())).await.unwrap();

        for index in 0..60 {
            assert!(store.append_message("s1", text(format!("m{index}"))).await);
        }

        let messages = store.messages("s1", None).await;
        assert_eq!(messages.len(), 50);
        assert_eq!(messages[0].content(), "m10");
        assert_eq!(messages[49].content(), "m59");
    }

    #[tokio::test]
    async fn messages_honors_limit_and_order() {
        let store = SessionStore::new(SessionConfig::default());
        store.create(Some("s1".into())).await.unwrap();
        for index in 0..5 {
            store.append_message("s1", text(format!("m{index}"))).await;
        }

        let tail = store.messages("s1", Some(2)).await;
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].content(), "m3");
        assert_eq!(tail[1].content(), "m4");

        let oversized = store.messages("s1", Some(99)).await;
        assert_eq!(oversized.len(), 5);
    }

    #[tokio::test]
    async fn unknown_session_is_not_an_error() {
        let store = SessionStore::new(SessionConfig::default());

        assert!(store.get("nope").await.is_none());
        assert!(!store.append_message("nope", text("hi")).await);
        assert!(store.messages("nope", None).await.is_empty());
        assert!(!store.delete("nope").await);
        assert!(!store.set_metadata("nope", "k", json!(1)).await);
        assert!(store.get_metadata("nope", "k").await.is_none());
    }

    #[tokio::test]
    async fn reads_are_idempotent_but_refresh_activity() {
        let store = SessionStore::new(SessionConfig::default());
        store.create(Some("s1".into())).await.unwrap();
        store.append_message("s1", text("hello")).await;
        store.set_metadata("s1", "caller", json!("cli")).await;

        let before = store.list_summaries().await[0].last_activity();
        tokio::time::sleep(Duration::from_millis(5)).await;

        let first = store.get("s1").await.unwrap();
        let second = store.get("s1").await.unwrap();
        assert_eq!(first.messages().len(), second.messages().len());
        assert_eq!(first.metadata(), second.metadata());

        let after = store.list_summaries().await[0].last_activity();
        assert!(after > before);
    }

    #[tokio::test]
    async fn metadata_round_trip() {
        let store = SessionStore::new(SessionConfig::default());
        store.create(Some("s1".into())).await.unwrap();

        assert!(store.set_metadata("s1", "browser", json!("firefox")).await);
        assert_eq!(
            store.get_metadata("s1", "browser").await,
            Some(json!("firefox"))
        );
        assert_eq!(store.get_metadata("s1", "absent").await, None);
    }

    #[tokio::test]
    async fn sweep_with_zero_ttl_removes_everything() {
        let store = SessionStore::new(
            SessionConfig::default().with_session_ttl(Duration::ZERO),
        );
        store.create(Some("s1".into())).await.unwrap();
        store.create(Some("s2".into())).await.unwrap();

        tokio::time::sleep(Duration::from_millis(5)).await;
        let removed = store.sweep_expired().await;

        assert_eq!(removed, 2);
        assert!(store.list_summaries().await.is_empty());
    }

    #[tokio::test]
    async fn sweep_spares_recently_active_sessions() {
        let store = SessionStore::new(
            SessionConfig::default().with_session_ttl(Duration::from_millis(50)),
        );
        store.create(Some("idle".into())).await.unwrap();
        store.create(Some("busy".into())).await.unwrap();

        tokio::time::sleep(Duration::from_millis(60)).await;
        store.append_message("busy", text("still here")).await;

        let removed = store.sweep_expired().await;
        assert_eq!(removed, 1);
        assert!(store.get("idle").await.is_none());
        assert!(store.get("busy").await.is_some());
    }

    #[tokio::test]
    async fn concurrent_appends_lose_nothing() {
        let store = Arc::new(SessionStore::new(SessionConfig::default()));
        store.create(Some("s1".into())).await.unwrap();

        let mut handles = Vec::new();
        for index in 0..20 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.append_message("s1", text(format!("m{index}"))).await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap());
        }

        assert_eq!(store.messages("s1", None).await.len(), 20);
    }
}
