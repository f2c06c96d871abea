//! Handler traits and the per-event context handed to them.

use std::{sync::Arc, time::Duration};

use {
    async_trait::async_trait,
    palaver_channels::{ContextSet, InboundEvent, OutboundMessage, ReplySink, ReplyTarget},
    palaver_sessions::ConversationState,
    tracing::warn,
};

use crate::{pattern::PatternMatch, pick::ReplyPicker};

/// Handles an event that matched a registered trigger.
#[async_trait]
pub trait TriggerHandler: Send + Sync {
    async fn handle(&self, msg: &mut MessageContext, matched: &PatternMatch) -> anyhow::Result<()>;
}

/// Handles the next event of a conversation parked on a named route.
///
/// `state` is what the previous step stored. The route is already consumed
/// when this runs: call [`MessageContext::route`] to keep the conversation
/// going, otherwise it ends.
#[async_trait]
pub trait RouteHandler: Send + Sync {
    async fn handle(&self, msg: &mut MessageContext, state: ConversationState) -> anyhow::Result<()>;
}

/// A continuation requested by a handler, committed once it returns `Ok`.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub route: String,
    pub state: ConversationState,
    pub ttl: Duration,
}

/// The event being handled plus the ways a handler can respond to it.
pub struct MessageContext {
    event: InboundEvent,
    categories: ContextSet,
    target: ReplyTarget,
    sink: Arc<dyn ReplySink>,
    picker: Arc<dyn ReplyPicker>,
    default_ttl: Duration,
    next: Option<RouteRequest>,
    failed_replies: usize,
}

impl MessageContext {
    pub fn new(
        event: InboundEvent,
        categories: ContextSet,
        sink: Arc<dyn ReplySink>,
        picker: Arc<dyn ReplyPicker>,
        default_ttl: Duration,
    ) -> Self {
        Self {
            target: event.reply_target(),
            event,
            categories,
            sink,
            picker,
            default_ttl,
            next: None,
            failed_replies: 0,
        }
    }

    pub fn event(&self) -> &InboundEvent {
        &self.event
    }

    /// Message text with any leading bot mention already stripped.
    pub fn text(&self) -> &str {
        &self.event.text
    }

    pub fn categories(&self) -> ContextSet {
        self.categories
    }

    pub fn picker(&self) -> &dyn ReplyPicker {
        self.picker.as_ref()
    }

    /// Send a reply to the originating conversation.
    ///
    /// Delivery failures are logged and counted, never returned: a reply that
    /// could not be sent does not undo the handler's routing decision.
    pub async fn say(&mut self, message: impl Into<OutboundMessage>) {
        let message = message.into();
        if let Err(e) = self.sink.say(&self.target, &message).await {
            self.failed_replies += 1;
            warn!(
                channel = %self.target.channel,
                user = %self.target.user,
                error = %e,
                "failed to deliver reply"
            );
        }
    }

    /// Send one of `options`, chosen by the configured picker.
    pub async fn say_one_of(&mut self, options: &[&str]) {
        let picked = self.picker.pick(options).map(str::to_string);
        if let Some(text) = picked {
            self.say(text).await;
        }
    }

    /// Park the conversation on `route` with `state` for the default TTL.
    /// A later call in the same handler replaces an earlier one.
    pub fn route(&mut self, route: impl Into<String>, state: ConversationState) {
        let ttl = self.default_ttl;
        self.route_with_ttl(route, state, ttl);
    }

    pub fn route_with_ttl(
        &mut self,
        route: impl Into<String>,
        state: ConversationState,
        ttl: Duration,
    ) {
        self.next = Some(RouteRequest {
            route: route.into(),
            state,
            ttl,
        });
    }

    pub fn pending_route(&self) -> Option<&RouteRequest> {
        self.next.as_ref()
    }

    pub(crate) fn take_route(&mut self) -> Option<RouteRequest> {
        self.next.take()
    }

    /// Replies the sink rejected while handling this event.
    pub fn failed_replies(&self) -> usize {
        self.failed_replies
    }
}
