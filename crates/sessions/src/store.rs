//! Conversation store contract.

use std::time::Duration;

use {async_trait::async_trait, serde::Serialize};

use crate::{Result, key::ConversationKey};

/// Opaque per-conversation payload. Only the handler owning the route reads it.
pub type ConversationState = serde_json::Map<String, serde_json::Value>;

/// The persisted continuation for one conversation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationRecord {
    pub key: ConversationKey,
    /// Name of the route that handles this conversation's next event.
    pub route: String,
    pub state: ConversationState,
    /// Milliseconds since the Unix epoch. The record is live strictly before this instant.
    pub expires_at: i64,
}

impl ConversationRecord {
    #[must_use]
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at
    }
}

/// Persistent storage for pending conversation routes.
///
/// Operations on the same key must be linearizable; `put` replaces the whole
/// record and never merges.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// The live record for `key`, or `None` if it was never written, was
    /// deleted, or has expired.
    async fn get(&self, key: &ConversationKey) -> Result<Option<ConversationRecord>>;

    /// Unconditionally replace the record for `key`, expiring `ttl` from now.
    async fn put(
        &self,
        key: &ConversationKey,
        route: &str,
        state: &ConversationState,
        ttl: Duration,
    ) -> Result<()>;

    /// Remove the record for `key`. Deleting a missing record is not an error.
    async fn delete(&self, key: &ConversationKey) -> Result<()>;

    /// Drop every expired record, returning how many were removed.
    async fn sweep_expired(&self) -> Result<u64>;

    /// Number of live records.
    async fn active_count(&self) -> Result<u64>;
}
