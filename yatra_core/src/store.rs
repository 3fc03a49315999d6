//! The session store seam: the only stateful component in the system.
//!
//! One writer per session id at a time: callers take the session lock
//! for the duration of a turn, so an entity merge can never interleave
//! with a message append for the same session. Different sessions share
//! nothing and proceed fully in parallel.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::OwnedMutexGuard;

use crate::capability::OutputKind;
use crate::error::Result;
use crate::intent::EntitySlots;
use crate::state::ConversationState;
use crate::Role;

/// A session row as seen by the engine.
#[derive(Debug, Clone, Serialize)]
pub struct SessionRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub metadata: HashMap<String, String>,
    pub entities: EntitySlots,
    pub state: ConversationState,
    pub language: Option<String>,
}

/// One entry of the append-only conversation history.
#[derive(Debug, Clone, Serialize)]
pub struct MessageRecord {
    pub role: Role,
    pub content: String,
    pub metadata: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

/// One persisted capability invocation result.
#[derive(Debug, Clone, Serialize)]
pub struct AgentOutputRecord {
    pub agent_name: String,
    pub task_name: String,
    pub kind: OutputKind,
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionStats {
    pub message_count: u64,
    pub agent_call_count: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub last_activity: Option<DateTime<Utc>>,
}

/// Durable keyed storage for sessions, turn history, and agent outputs.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create a fresh session in the `Collecting` state and return its id.
    async fn create_session(&self, metadata: HashMap<String, String>) -> Result<String>;

    async fn get_session(&self, id: &str) -> Result<Option<SessionRecord>>;

    /// Atomic append; touches the session's last-activity time.
    /// Fails with `SessionNotFound` for an unknown id.
    async fn append_message(
        &self,
        id: &str,
        role: Role,
        content: &str,
        metadata: Option<serde_json::Value>,
    ) -> Result<()>;

    async fn append_agent_output(
        &self,
        id: &str,
        agent_name: &str,
        task_name: &str,
        kind: OutputKind,
        payload: serde_json::Value,
    ) -> Result<()>;

    /// Read-modify-write merge honoring the non-empty rule.
    /// Returns the merged record.
    async fn merge_entity_slots(&self, id: &str, partial: &EntitySlots) -> Result<EntitySlots>;

    /// Replace the slot record wholesale (service-switch retention).
    async fn replace_entity_slots(&self, id: &str, slots: &EntitySlots) -> Result<()>;

    async fn set_state(&self, id: &str, state: ConversationState) -> Result<()>;

    async fn set_language(&self, id: &str, language: &str) -> Result<()>;

    /// Remove a session and everything it owns. Idempotent; the return
    /// value reports whether the session existed.
    async fn delete_session(&self, id: &str) -> Result<bool>;

    /// Most-recent-first agent outputs, optionally filtered by kind.
    /// An empty `kinds` slice means no filter.
    async fn recent_agent_outputs(
        &self,
        id: &str,
        kinds: &[OutputKind],
        limit: u64,
    ) -> Result<Vec<AgentOutputRecord>>;

    /// The last `limit` messages, in chronological order.
    async fn conversation_history(&self, id: &str, limit: u64) -> Result<Vec<MessageRecord>>;

    async fn session_stats(&self, id: &str) -> Result<SessionStats>;

    /// Acquire this session's writer lock for the duration of a turn.
    async fn lock_session(&self, id: &str) -> OwnedMutexGuard<()>;

    /// Storage health probe.
    async fn ping(&self) -> Result<()>;
}
