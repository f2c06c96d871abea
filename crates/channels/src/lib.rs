//! Inbound events, delivery-context classification, and the outbound reply contract.
//!
//! Platform adapters (currently Slack's Events API payloads) decode raw
//! payloads into [`InboundEvent`]s; [`classify`] labels each one with the
//! delivery contexts it satisfies; handlers answer through a [`ReplySink`].

pub mod classify;
pub mod error;
pub mod event;
pub mod outbound;
pub mod sink;
pub mod slack;

pub use {
    classify::{ContextCategory, ContextSet, classify},
    error::{Error, Result},
    event::{ChannelKind, EventType, InboundEvent, Mention},
    outbound::{Attachment, OutboundMessage, ReplySink, ReplyTarget},
    sink::RecordingSink,
};
