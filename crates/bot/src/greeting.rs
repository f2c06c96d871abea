//! The stateful greeting conversation: hi, then how are you, then favourite
//! colour, then a summary of everything collected.

use {
    async_trait::async_trait,
    palaver_routing::{MessageContext, PatternMatch, RouteHandler, TriggerHandler},
    palaver_sessions::ConversationState,
    serde_json::Value,
};

pub const HOW_ARE_YOU_ROUTE: &str = "how-are-you";
pub const COLOR_ROUTE: &str = "color";

/// Opens the conversation on `hi`, `hello` or `hey`, in any case.
pub struct Greeting;

#[async_trait]
impl TriggerHandler for Greeting {
    async fn handle(&self, msg: &mut MessageContext, _: &PatternMatch) -> anyhow::Result<()> {
        let greeting = msg.text().to_string();
        msg.say(format!("{greeting}, how are you?")).await;

        let mut state = ConversationState::new();
        state.insert("greeting".into(), Value::String(greeting));
        msg.route(HOW_ARE_YOU_ROUTE, state);
        Ok(())
    }
}

/// Records how the user is doing, then asks for a colour.
pub struct HowAreYou;

#[async_trait]
impl RouteHandler for HowAreYou {
    async fn handle(&self, msg: &mut MessageContext, mut state: ConversationState) -> anyhow::Result<()> {
        if msg.text().is_empty() {
            msg.say("Whoops, I'm still waiting to hear how you're doing.").await;
            msg.say("How are you?").await;
            msg.route(HOW_ARE_YOU_ROUTE, state);
            return Ok(());
        }

        state.insert("status".into(), Value::String(msg.text().to_string()));
        msg.say("Ok then. What's your favorite color?").await;
        msg.route(COLOR_ROUTE, state);
        Ok(())
    }
}

/// Records the colour and ends the conversation with a summary.
pub struct Color;

#[async_trait]
impl RouteHandler for Color {
    async fn handle(&self, msg: &mut MessageContext, mut state: ConversationState) -> anyhow::Result<()> {
        if msg.text().is_empty() {
            msg.say("I'm eagerly awaiting to hear your favorite color.").await;
            msg.route(COLOR_ROUTE, state);
            return Ok(());
        }

        state.insert("color".into(), Value::String(msg.text().to_string()));
        let summary = serde_json::to_string(&state)?;
        msg.say("Thanks for sharing.").await;
        msg.say(format!("Here's what you've told me so far: ```{summary}```"))
            .await;
        Ok(())
    }
}
