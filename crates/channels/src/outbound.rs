use {
    async_trait::async_trait,
    serde::{Deserialize, Serialize},
};

use crate::Result;

/// Where a reply goes: back to the conversation the event came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyTarget {
    pub team_id: String,
    pub channel: String,
    pub user: String,
}

/// A rich-message attachment (Slack "secondary attachment" shape).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Sidebar colour, e.g. `#7CD197`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// One outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutboundMessage {
    Text(String),
    Rich {
        text: String,
        attachments: Vec<Attachment>,
    },
}

impl OutboundMessage {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) | Self::Rich { text, .. } => text,
        }
    }

    #[must_use]
    pub fn attachments(&self) -> &[Attachment] {
        match self {
            Self::Text(_) => &[],
            Self::Rich { attachments, .. } => attachments,
        }
    }
}

impl From<&str> for OutboundMessage {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for OutboundMessage {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Delivers handler replies to the messaging platform.
///
/// Each call is an independent, ordered send; a failure affects only that
/// one message.
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn say(&self, to: &ReplyTarget, message: &OutboundMessage) -> Result<()>;
}
