//! The dispatcher: one inbound event in, at most one handler run.

use std::{any::Any, panic::AssertUnwindSafe, sync::Arc, time::Duration};

use {
    futures::FutureExt,
    palaver_channels::{ContextSet, InboundEvent, ReplySink, classify},
    palaver_sessions::{ConversationKey, ConversationRecord, ConversationStore},
    tokio::task::JoinHandle,
    tracing::{debug, error, info, warn},
};

use crate::{
    Error, Result,
    handler::{MessageContext, RouteRequest},
    locks::StripedLocks,
    pick::{RandomPicker, ReplyPicker},
    routes::RouteTable,
    trigger::TriggerRegistry,
};

/// What happened to one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A stored conversation's route handled the event.
    Continued {
        route: String,
        next_route: Option<String>,
    },
    /// The trigger at this registration index handled the event.
    Triggered {
        trigger: usize,
        next_route: Option<String>,
    },
    /// No stored conversation and no trigger matched.
    Unmatched,
    /// The stored conversation named a route that is not registered. The
    /// record was discarded and the event dropped.
    UnknownRoute { route: String },
    /// The handler returned an error or panicked. Its route request, if
    /// any, was discarded.
    HandlerFailed,
    /// The conversation store could not be read or written.
    StoreFailed,
}

impl DispatchOutcome {
    /// The route the conversation is parked on after this event, if any.
    pub fn next_route(&self) -> Option<&str> {
        match self {
            Self::Continued { next_route, .. } | Self::Triggered { next_route, .. } => {
                next_route.as_deref()
            },
            _ => None,
        }
    }

    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Continued { .. } | Self::Triggered { .. })
    }
}

/// Routes inbound events to conversation routes or triggers.
///
/// Events for the same (team, channel, user) are processed one at a time in
/// arrival order; events for different conversations proceed concurrently.
pub struct Dispatcher {
    triggers: TriggerRegistry,
    routes: RouteTable,
    store: Arc<dyn ConversationStore>,
    sink: Arc<dyn ReplySink>,
    picker: Arc<dyn ReplyPicker>,
    default_ttl: Duration,
    locks: StripedLocks,
}

impl Dispatcher {
    pub fn new(
        triggers: TriggerRegistry,
        routes: RouteTable,
        store: Arc<dyn ConversationStore>,
        sink: Arc<dyn ReplySink>,
    ) -> Self {
        Self {
            triggers,
            routes,
            store,
            sink,
            picker: Arc::new(RandomPicker),
            default_ttl: Duration::from_secs(3600),
            locks: StripedLocks::default(),
        }
    }

    #[must_use]
    pub fn with_picker(mut self, picker: Arc<dyn ReplyPicker>) -> Self {
        self.picker = picker;
        self
    }

    /// TTL applied when a handler routes without an explicit one.
    #[must_use]
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_lock_stripes(mut self, stripes: usize) -> Self {
        self.locks = StripedLocks::new(stripes);
        self
    }

    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        &self.store
    }

    pub fn triggers(&self) -> &TriggerRegistry {
        &self.triggers
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Handle one event. Never fails: every error is logged and reported
    /// through the returned outcome.
    pub async fn dispatch(&self, event: InboundEvent) -> DispatchOutcome {
        let categories = classify(&event);
        let key = ConversationKey::new(&event.team_id, &event.channel, &event.user);
        let _guard = self.locks.lock(&key).await;

        let record = match self.store.get(&key).await {
            Ok(record) => record,
            Err(e) => {
                error!(conversation = %key, error = %e, "conversation lookup failed, dropping event");
                return DispatchOutcome::StoreFailed;
            },
        };

        match record {
            Some(record) => self.continue_conversation(key, event, categories, record).await,
            None => self.run_trigger(key, event, categories).await,
        }
    }

    async fn continue_conversation(
        &self,
        key: ConversationKey,
        event: InboundEvent,
        categories: ContextSet,
        record: ConversationRecord,
    ) -> DispatchOutcome {
        // The continuation is consumed before its handler runs; only a fresh
        // route request from the handler re-arms it.
        if let Err(e) = self.store.delete(&key).await {
            error!(conversation = %key, route = %record.route, error = %e, "failed to consume conversation, dropping event");
            return DispatchOutcome::StoreFailed;
        }

        let Some(handler) = self.routes.get(&record.route) else {
            warn!(conversation = %key, route = %record.route, "stored conversation names an unknown route, discarding it");
            return DispatchOutcome::UnknownRoute { route: record.route };
        };

        debug!(conversation = %key, route = %record.route, "continuing conversation");
        let mut msg = self.context(event, categories);
        let result = AssertUnwindSafe(handler.handle(&mut msg, record.state))
            .catch_unwind()
            .await;
        if !self.handler_succeeded(&key, &record.route, result) {
            return DispatchOutcome::HandlerFailed;
        }

        match self.commit(&key, msg.take_route()).await {
            Ok(next_route) => {
                if next_route.is_none() {
                    info!(conversation = %key, route = %record.route, "conversation finished");
                }
                DispatchOutcome::Continued {
                    route: record.route,
                    next_route,
                }
            },
            Err(outcome) => outcome,
        }
    }

    async fn run_trigger(
        &self,
        key: ConversationKey,
        event: InboundEvent,
        categories: ContextSet,
    ) -> DispatchOutcome {
        let Some((index, trigger, matched)) = self.triggers.find(&event.text, categories) else {
            debug!(conversation = %key, ?categories, "no trigger matched");
            return DispatchOutcome::Unmatched;
        };

        debug!(conversation = %key, trigger = index, pattern = ?trigger.pattern, "trigger matched");
        let handler = Arc::clone(&trigger.handler);
        let mut msg = self.context(event, categories);
        let result = AssertUnwindSafe(handler.handle(&mut msg, &matched))
            .catch_unwind()
            .await;
        if !self.handler_succeeded(&key, &format!("trigger #{index}"), result) {
            return DispatchOutcome::HandlerFailed;
        }

        match self.commit(&key, msg.take_route()).await {
            Ok(next_route) => DispatchOutcome::Triggered {
                trigger: index,
                next_route,
            },
            Err(outcome) => outcome,
        }
    }

    fn context(&self, event: InboundEvent, categories: ContextSet) -> MessageContext {
        MessageContext::new(
            event,
            categories,
            Arc::clone(&self.sink),
            Arc::clone(&self.picker),
            self.default_ttl,
        )
    }

    fn handler_succeeded(
        &self,
        key: &ConversationKey,
        handler: &str,
        result: std::result::Result<anyhow::Result<()>, Box<dyn Any + Send>>,
    ) -> bool {
        match result {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                error!(conversation = %key, handler, error = %e, "handler failed, conversation abandoned");
                false
            },
            Err(panic) => {
                error!(conversation = %key, handler, panic = panic_message(panic.as_ref()), "handler panicked, conversation abandoned");
                false
            },
        }
    }

    /// Persist the handler's route request, if it made one.
    async fn commit(
        &self,
        key: &ConversationKey,
        request: Option<RouteRequest>,
    ) -> std::result::Result<Option<String>, DispatchOutcome> {
        let Some(request) = request else {
            return Ok(None);
        };
        match self.persist(key, &request).await {
            Ok(()) => Ok(Some(request.route)),
            Err(Error::UnknownRoute { name }) => {
                warn!(conversation = %key, route = %name, "handler routed to an unregistered route, ignoring");
                Ok(None)
            },
            Err(e) => {
                error!(conversation = %key, route = %request.route, error = %e, "failed to store conversation");
                Err(DispatchOutcome::StoreFailed)
            },
        }
    }

    async fn persist(&self, key: &ConversationKey, request: &RouteRequest) -> Result<()> {
        if !self.routes.contains(&request.route) {
            return Err(Error::unknown_route(&request.route));
        }
        self.store
            .put(key, &request.route, &request.state, request.ttl)
            .await?;
        Ok(())
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}

/// Periodically purge expired conversations. The first sweep runs one
/// `interval` after spawning. Abort the handle to stop.
pub fn spawn_sweeper(store: Arc<dyn ConversationStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match store.sweep_expired().await {
                Ok(0) => {},
                Ok(removed) => info!(removed, "swept expired conversations"),
                Err(e) => warn!(error = %e, "conversation sweep failed"),
            }
        }
    })
}
