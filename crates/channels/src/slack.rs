//! Slack Events API payload decoding.
//!
//! Turns the JSON envelope Slack posts to an events endpoint into an
//! [`InboundEvent`]. Transport and request signing live outside this crate.

use {serde::Deserialize, tracing::debug};

use crate::{
    Error, Result,
    event::{ChannelKind, EventType, InboundEvent, Mention},
};

/// Top-level Events API envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlackEnvelope {
    /// One-time handshake when the events URL is configured.
    UrlVerification { challenge: String },
    EventCallback {
        #[serde(default)]
        team_id: Option<String>,
        event: SlackEvent,
    },
    #[serde(other)]
    Unsupported,
}

/// The inner `event` object of an `event_callback`.
#[derive(Debug, Clone, Deserialize)]
pub struct SlackEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub channel_type: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub ts: Option<String>,
    #[serde(default)]
    pub event_ts: Option<String>,
    #[serde(default)]
    pub bot_id: Option<String>,
    /// What a reaction or pin points at; carries the channel for those events.
    #[serde(default)]
    pub item: Option<SlackItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlackItem {
    #[serde(default)]
    pub channel: Option<String>,
}

/// Message subtypes that restate or retract an earlier message rather than
/// carry a new action from the user.
const IGNORED_SUBTYPES: &[&str] = &[
    "bot_message",
    "message_changed",
    "message_deleted",
    "message_replied",
];

/// What a decoded payload asks of us.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// Answer the URL verification handshake with this challenge.
    Challenge(String),
    Event(InboundEvent),
    /// Well-formed but nothing to dispatch (bot echo, edit, unsupported envelope).
    Ignored,
}

/// Decode a raw Events API payload.
///
/// `bot_user_id` is the bot's own user ID; without it mentions cannot be
/// recognised and every channel message is treated as ambient.
pub fn decode(payload: &serde_json::Value, bot_user_id: Option<&str>) -> Result<Decoded> {
    let envelope: SlackEnvelope = serde_json::from_value(payload.clone())?;
    Ok(match envelope {
        SlackEnvelope::UrlVerification { challenge } => Decoded::Challenge(challenge),
        SlackEnvelope::EventCallback { team_id, event } => {
            match decode_event(team_id.as_deref(), &event, bot_user_id)? {
                Some(ev) => Decoded::Event(ev),
                None => Decoded::Ignored,
            }
        },
        SlackEnvelope::Unsupported => Decoded::Ignored,
    })
}

/// Convert a single `event_callback` event. Returns `None` for events the bot
/// must not react to (its own messages, edits and deletes). Other user
/// actions pass through, with empty text when they carry none.
pub fn decode_event(
    envelope_team: Option<&str>,
    event: &SlackEvent,
    bot_user_id: Option<&str>,
) -> Result<Option<InboundEvent>> {
    // Skip bot messages to prevent loops
    if event.bot_id.is_some() {
        debug!("ignoring bot message");
        return Ok(None);
    }
    if let Some(subtype) = event
        .subtype
        .as_deref()
        .filter(|s| IGNORED_SUBTYPES.contains(s))
    {
        debug!(subtype, "ignoring message subtype");
        return Ok(None);
    }

    let channel = event
        .channel
        .clone()
        .or_else(|| event.item.as_ref().and_then(|item| item.channel.clone()))
        .ok_or_else(|| Error::invalid_payload("event has no channel"))?;
    let user = event
        .user
        .clone()
        .ok_or_else(|| Error::invalid_payload("event has no user"))?;
    let team_id = envelope_team
        .map(str::to_string)
        .or_else(|| event.team.clone())
        .ok_or_else(|| Error::invalid_payload("event has no team"))?;

    let raw_text = event.text.clone().unwrap_or_default();
    let mention = bot_user_id.map_or(Mention::None, |bot| detect_mention(&raw_text, bot));
    let text = match (mention, bot_user_id) {
        (Mention::Leading, Some(bot)) => strip_direct_mention(&raw_text, bot),
        _ => raw_text,
    };

    Ok(Some(InboundEvent {
        team_id,
        channel_kind: channel_kind(event.channel_type.as_deref(), &channel),
        channel,
        user,
        text,
        event_type: EventType::from(event.event_type.clone()),
        ts: event
            .ts
            .as_deref()
            .or(event.event_ts.as_deref())
            .and_then(|ts| ts.parse().ok())
            .unwrap_or_default(),
        mention,
    }))
}

fn channel_kind(channel_type: Option<&str>, channel: &str) -> ChannelKind {
    match channel_type {
        Some("im") => ChannelKind::Direct,
        Some("mpim") => ChannelKind::Group,
        Some("channel" | "group") => ChannelKind::Channel,
        // Older payloads omit channel_type; DM channel IDs start with `D`.
        _ if channel.starts_with('D') => ChannelKind::Direct,
        _ if channel.starts_with('C') || channel.starts_with('G') => ChannelKind::Channel,
        _ => ChannelKind::Unknown,
    }
}

/// Locate `<@BOT>` or `<@BOT|name>` in the text.
fn find_mention(text: &str, bot_user_id: &str) -> Option<(usize, usize)> {
    let needle = format!("<@{bot_user_id}");
    let mut from = 0;
    while let Some(rel) = text[from..].find(&needle) {
        let start = from + rel;
        let after = start + needle.len();
        match text[after..].chars().next() {
            Some('>') => return Some((start, after + 1)),
            Some('|') => {
                let close = text[after..].find('>')?;
                return Some((start, after + close + 1));
            },
            // A longer user ID that merely shares our prefix.
            _ => from = after,
        }
    }
    None
}

/// Where, if anywhere, the bot is mentioned.
#[must_use]
pub fn detect_mention(text: &str, bot_user_id: &str) -> Mention {
    match find_mention(text, bot_user_id) {
        None => Mention::None,
        Some((start, _)) if text[..start].trim().is_empty() => Mention::Leading,
        Some(_) => Mention::Inline,
    }
}

/// Remove a leading `<@BOT>` (and an optional `:`), then trim.
#[must_use]
pub fn strip_direct_mention(text: &str, bot_user_id: &str) -> String {
    match find_mention(text, bot_user_id) {
        Some((start, end)) if text[..start].trim().is_empty() => {
            let rest = &text[end..];
            rest.strip_prefix(':').unwrap_or(rest).trim().to_string()
        },
        _ => text.trim().to_string(),
    }
}
