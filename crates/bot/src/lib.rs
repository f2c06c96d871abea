//! The demo bot: which triggers and routes exist and what they say.

pub mod canned;
pub mod greeting;

use std::sync::Arc;

use {
    palaver_channels::{ContextCategory, ContextSet, ReplySink},
    palaver_config::PalaverConfig,
    palaver_routing::{Dispatcher, Pattern, ReplyPicker, RouteTable, TriggerRegistry},
    palaver_sessions::ConversationStore,
};

pub use greeting::{COLOR_ROUTE, HOW_ARE_YOU_ROUTE};

const MENTION_OR_DM: ContextSet =
    ContextSet::of(&[ContextCategory::Mention, ContextCategory::DirectMessage]);
const ADDRESSED: ContextSet =
    ContextSet::of(&[ContextCategory::DirectMention, ContextCategory::DirectMessage]);

/// Triggers in priority order. The catch-all comes last and is omitted when
/// ambient replies are disabled.
pub fn triggers(config: &PalaverConfig) -> palaver_routing::Result<TriggerRegistry> {
    let literal_case = config.routing.literal_case_sensitive;
    let mut registry = TriggerRegistry::new();

    registry.register(Pattern::literal("help", literal_case), MENTION_OR_DM, canned::Help);
    registry.register(
        Pattern::regex_ignore_case("^(hi|hello|hey)$")?,
        ADDRESSED,
        greeting::Greeting,
    );
    registry.register(
        Pattern::regex_ignore_case("^(thanks|thank you)")?,
        MENTION_OR_DM,
        canned::Thanks,
    );
    registry.register(
        Pattern::literal("attachment", literal_case),
        MENTION_OR_DM,
        canned::AttachmentDemo,
    );
    if config.ambient.enabled {
        registry.register(Pattern::regex(".*")?, ADDRESSED, canned::Ambient {
            probability: config.ambient.reply_probability,
        });
    }
    Ok(registry)
}

/// Continuation handlers for the greeting conversation.
pub fn routes() -> palaver_routing::Result<RouteTable> {
    let mut table = RouteTable::new();
    table.register(HOW_ARE_YOU_ROUTE, greeting::HowAreYou)?;
    table.register(COLOR_ROUTE, greeting::Color)?;
    Ok(table)
}

/// A dispatcher wired with the demo bot's triggers and routes.
pub fn dispatcher(
    config: &PalaverConfig,
    store: Arc<dyn ConversationStore>,
    sink: Arc<dyn ReplySink>,
    picker: Arc<dyn ReplyPicker>,
) -> palaver_routing::Result<Dispatcher> {
    Ok(Dispatcher::new(triggers(config)?, routes()?, store, sink)
        .with_picker(picker)
        .with_default_ttl(config.routing.default_ttl()))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, palaver_channels::ContextCategory as C, rstest::rstest};

    #[rstest]
    #[case("help", &[C::DirectMessage], Some(0))]
    #[case("HELP", &[C::Mention], Some(0))]
    #[case("help", &[C::Ambient], None)]
    #[case("hi", &[C::DirectMessage], Some(1))]
    #[case("Hi", &[C::DirectMessage], Some(1))]
    #[case("HEY", &[C::DirectMention], Some(1))]
    #[case("hey", &[C::DirectMention, C::Mention], Some(1))]
    #[case("hi", &[C::Mention], None)]
    #[case("THANK YOU!", &[C::DirectMessage], Some(2))]
    #[case("thanks a lot", &[C::Mention], Some(2))]
    #[case("attachment", &[C::DirectMessage], Some(3))]
    #[case("what's up", &[C::DirectMessage], Some(4))]
    #[case("", &[C::DirectMessage], Some(4))]
    #[case("what's up", &[C::Mention], None)]
    fn trigger_selection(
        #[case] text: &str,
        #[case] categories: &[ContextCategory],
        #[case] expected: Option<usize>,
    ) {
        let registry = triggers(&PalaverConfig::default()).unwrap();
        let categories: ContextSet = categories.iter().copied().collect();
        assert_eq!(registry.find(text, categories).map(|(i, ..)| i), expected);
    }

    #[test]
    fn ambient_trigger_can_be_disabled() {
        let mut config = PalaverConfig::default();
        config.ambient.enabled = false;
        let registry = triggers(&config).unwrap();
        assert_eq!(registry.len(), 4);
        assert!(
            registry
                .find("what's up", ContextSet::of(&[C::DirectMessage]))
                .is_none()
        );
    }

    #[test]
    fn case_sensitive_literals_follow_config() {
        let mut config = PalaverConfig::default();
        config.routing.literal_case_sensitive = true;
        let registry = triggers(&config).unwrap();
        let dm = ContextSet::of(&[C::DirectMessage]);
        assert_eq!(registry.find("help", dm).map(|(i, ..)| i), Some(0));
        // Falls through to the catch-all.
        assert_eq!(registry.find("Help", dm).map(|(i, ..)| i), Some(4));
    }

    #[test]
    fn both_greeting_routes_exist() {
        let table = routes().unwrap();
        assert_eq!(table.names(), vec![COLOR_ROUTE, HOW_ARE_YOU_ROUTE]);
    }
}
