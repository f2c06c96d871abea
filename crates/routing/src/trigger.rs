use std::{fmt, sync::Arc};

use palaver_channels::ContextSet;

use crate::{
    handler::TriggerHandler,
    pattern::{Pattern, PatternMatch},
};

/// A pattern, the contexts it listens in, and what to do on a hit.
pub struct Trigger {
    pub pattern: Pattern,
    pub contexts: ContextSet,
    pub handler: Arc<dyn TriggerHandler>,
}

impl fmt::Debug for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trigger")
            .field("pattern", &self.pattern)
            .field("contexts", &self.contexts)
            .finish_non_exhaustive()
    }
}

/// Ordered trigger list. When several triggers match, the one registered
/// first wins.
#[derive(Debug, Default)]
pub struct TriggerRegistry {
    triggers: Vec<Trigger>,
}

impl TriggerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a trigger and return its index.
    pub fn register(
        &mut self,
        pattern: Pattern,
        contexts: ContextSet,
        handler: impl TriggerHandler + 'static,
    ) -> usize {
        self.triggers.push(Trigger {
            pattern,
            contexts,
            handler: Arc::new(handler),
        });
        self.triggers.len() - 1
    }

    /// First trigger whose contexts intersect `categories` and whose pattern
    /// matches `text`.
    pub fn find(&self, text: &str, categories: ContextSet) -> Option<(usize, &Trigger, PatternMatch)> {
        if categories.is_empty() {
            return None;
        }
        self.triggers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.contexts.intersects(categories))
            .find_map(|(i, t)| t.pattern.find(text).map(|m| (i, t, m)))
    }

    pub fn get(&self, index: usize) -> Option<&Trigger> {
        self.triggers.get(index)
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }
}
