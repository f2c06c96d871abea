//! Single-shot triggers that reply and never start a conversation.

use {
    async_trait::async_trait,
    palaver_channels::{Attachment, OutboundMessage},
    palaver_routing::{MessageContext, PatternMatch, TriggerHandler},
    tracing::trace,
};

pub const HELP_TEXT: &str = "\
I will respond to the following messages:
`help` - to see this message.
`hi` - to demonstrate a conversation that tracks state.
`thanks` - to demonstrate a simple response.
`<type-any-other-text>` - to demonstrate a random emoticon response, some of the time :wink:.
`attachment` - to see a Slack attachment message.
";

pub const THANKS_REPLIES: &[&str] = &[
    "You're welcome :smile:",
    "You bet",
    ":+1: Of course",
    "Anytime :sun_with_face: :full_moon_with_face:",
];

pub const AMBIENT_REPLIES: &[&str] = &[":wave:", ":pray:", ":raised_hands:"];

pub struct Help;

#[async_trait]
impl TriggerHandler for Help {
    async fn handle(&self, msg: &mut MessageContext, _: &PatternMatch) -> anyhow::Result<()> {
        msg.say(HELP_TEXT).await;
        Ok(())
    }
}

pub struct Thanks;

#[async_trait]
impl TriggerHandler for Thanks {
    async fn handle(&self, msg: &mut MessageContext, _: &PatternMatch) -> anyhow::Result<()> {
        msg.say_one_of(THANKS_REPLIES).await;
        Ok(())
    }
}

pub struct AttachmentDemo;

impl AttachmentDemo {
    pub fn message() -> OutboundMessage {
        OutboundMessage::Rich {
            text: "Check out this amazing attachment! :confetti_ball: ".into(),
            attachments: vec![Attachment {
                text: Some(
                    "Slapp is a robust open source library that sits on top of the Slack APIs"
                        .into(),
                ),
                title: Some("Slapp Library - Open Source".into()),
                title_link: Some("https://beepboophq.com/".into()),
                image_url: Some(
                    "https://storage.googleapis.com/beepboophq/_assets/bot-1.22f6fb.png".into(),
                ),
                color: Some("#7CD197".into()),
            }],
        }
    }
}

#[async_trait]
impl TriggerHandler for AttachmentDemo {
    async fn handle(&self, msg: &mut MessageContext, _: &PatternMatch) -> anyhow::Result<()> {
        msg.say(Self::message()).await;
        Ok(())
    }
}

/// Catch-all: occasionally answers with an emoji.
pub struct Ambient {
    pub probability: f64,
}

#[async_trait]
impl TriggerHandler for Ambient {
    async fn handle(&self, msg: &mut MessageContext, _: &PatternMatch) -> anyhow::Result<()> {
        if !msg.picker().chance(self.probability) {
            trace!(probability = self.probability, "staying quiet");
            return Ok(());
        }
        msg.say_one_of(AMBIENT_REPLIES).await;
        Ok(())
    }
}
