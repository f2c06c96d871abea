//! In-memory conversation store.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use {async_trait::async_trait, tracing::trace};

use crate::{
    Result,
    clock::{Clock, SystemClock, duration_ms},
    key::ConversationKey,
    store::{ConversationRecord, ConversationState, ConversationStore},
};

/// Process-local store backed by a `HashMap`. Conversations do not survive a restart.
///
/// Expired records are dropped when a lookup finds them and by
/// [`ConversationStore::sweep_expired`], so the map only ever holds
/// conversations that are live or awaiting their next sweep.
pub struct MemoryConversationStore {
    records: Mutex<HashMap<ConversationKey, ConversationRecord>>,
    clock: Arc<dyn Clock>,
}

impl MemoryConversationStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Raw record count, expired entries included. Test/diagnostic helper.
    pub fn stored_len(&self) -> usize {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Default for MemoryConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversationStore for MemoryConversationStore {
    async fn get(&self, key: &ConversationKey) -> Result<Option<ConversationRecord>> {
        let now = self.clock.now_ms();
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        match records.get(key) {
            Some(record) if record.is_expired(now) => {
                trace!(conversation = %key, "dropping expired record");
                records.remove(key);
                Ok(None)
            },
            Some(record) => Ok(Some(record.clone())),
            None => Ok(None),
        }
    }

    async fn put(
        &self,
        key: &ConversationKey,
        route: &str,
        state: &ConversationState,
        ttl: Duration,
    ) -> Result<()> {
        let record = ConversationRecord {
            key: key.clone(),
            route: route.to_string(),
            state: state.clone(),
            expires_at: self.clock.now_ms().saturating_add(duration_ms(ttl)),
        };
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.insert(key.clone(), record);
        Ok(())
    }

    async fn delete(&self, key: &ConversationKey) -> Result<()> {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.remove(key);
        Ok(())
    }

    async fn sweep_expired(&self) -> Result<u64> {
        let now = self.clock.now_ms();
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        let before = records.len();
        records.retain(|_, r| !r.is_expired(now));
        Ok((before - records.len()) as u64)
    }

    async fn active_count(&self) -> Result<u64> {
        let now = self.clock.now_ms();
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        Ok(records.values().filter(|r| !r.is_expired(now)).count() as u64)
    }
}
