//! In-memory reply sink.

use std::sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
};

use {async_trait::async_trait, tracing::debug};

use crate::{
    Error, Result,
    outbound::{OutboundMessage, ReplySink, ReplyTarget},
};

/// Records every reply in order. Used by tests and by transcript-style replay.
#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<(ReplyTarget, OutboundMessage)>>,
    failing: AtomicBool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every `say` fails with [`Error::Unavailable`] and records nothing.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All recorded replies, oldest first.
    pub fn messages(&self) -> Vec<(ReplyTarget, OutboundMessage)> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Just the text of every recorded reply.
    pub fn texts(&self) -> Vec<String> {
        let sent = self.sent.lock().unwrap_or_else(|e| e.into_inner());
        sent.iter().map(|(_, m)| m.text().to_string()).collect()
    }

    /// Remove and return everything recorded so far.
    pub fn take(&self) -> Vec<(ReplyTarget, OutboundMessage)> {
        std::mem::take(&mut *self.sent.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

#[async_trait]
impl ReplySink for RecordingSink {
    async fn say(&self, to: &ReplyTarget, message: &OutboundMessage) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::unavailable("recording sink set to fail"));
        }
        debug!(channel = %to.channel, user = %to.user, "recorded reply");
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((to.clone(), message.clone()));
        Ok(())
    }
}
