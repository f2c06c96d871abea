//! Route inbound events to handlers, carrying multi-turn conversations.
//!
//! Dispatch order for every event:
//! 1. A live continuation stored for the conversation (team, channel, user)
//!    wins. It is consumed before its handler runs; the handler re-arms it
//!    by calling [`MessageContext::route`].
//! 2. Otherwise the first registered trigger whose pattern matches the text
//!    and whose contexts intersect the event's classified contexts.
//! 3. Otherwise the event is dropped silently.

pub mod dispatch;
pub mod error;
pub mod handler;
pub mod locks;
pub mod pattern;
pub mod pick;
pub mod routes;
pub mod trigger;

pub use {
    dispatch::{DispatchOutcome, Dispatcher, spawn_sweeper},
    error::{Error, Result},
    handler::{MessageContext, RouteHandler, RouteRequest, TriggerHandler},
    pattern::{Pattern, PatternMatch},
    pick::{FixedPicker, RandomPicker, ReplyPicker},
    routes::RouteTable,
    trigger::{Trigger, TriggerRegistry},
};
