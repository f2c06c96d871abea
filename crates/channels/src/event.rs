use serde::{Deserialize, Serialize};

use crate::outbound::ReplyTarget;

/// Platform event type. Only `message` events carry user chatter; the rest
/// are passed through so continuations can still see them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    #[default]
    Message,
    AppMention,
    Other(String),
}

impl From<String> for EventType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "message" => Self::Message,
            "app_mention" => Self::AppMention,
            _ => Self::Other(s),
        }
    }
}

impl From<EventType> for String {
    fn from(t: EventType) -> Self {
        match t {
            EventType::Message => "message".into(),
            EventType::AppMention => "app_mention".into(),
            EventType::Other(s) => s,
        }
    }
}

/// What kind of conversation the event was posted in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// One-to-one DM with the bot.
    Direct,
    /// Multi-person DM.
    Group,
    /// Public or private channel.
    Channel,
    #[default]
    Unknown,
}

/// Where (if anywhere) the bot was @-mentioned in the message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mention {
    #[default]
    None,
    /// The message opens with the mention (`@bot hi`).
    Leading,
    /// The mention appears somewhere after the start.
    Inline,
}

/// A single inbound event, normalised across platforms.
///
/// Exists only for the duration of one dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub team_id: String,
    pub channel: String,
    pub user: String,
    /// Message text. A leading direct mention has already been stripped.
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub event_type: EventType,
    #[serde(default)]
    pub ts: f64,
    #[serde(default)]
    pub channel_kind: ChannelKind,
    #[serde(default)]
    pub mention: Mention,
}

impl InboundEvent {
    /// A plain direct message, the shape the CLI chat loop produces.
    pub fn direct_message(
        team_id: impl Into<String>,
        channel: impl Into<String>,
        user: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            team_id: team_id.into(),
            channel: channel.into(),
            user: user.into(),
            text: text.into(),
            event_type: EventType::Message,
            ts: 0.0,
            channel_kind: ChannelKind::Direct,
            mention: Mention::None,
        }
    }

    /// Where replies to this event should go.
    #[must_use]
    pub fn reply_target(&self) -> ReplyTarget {
        ReplyTarget {
            team_id: self.team_id.clone(),
            channel: self.channel.clone(),
            user: self.user.clone(),
        }
    }
}
