//! Delivery-context classification.
//!
//! Every inbound event is labelled with the set of contexts it satisfies;
//! triggers declare which contexts they listen in, and only fire when the two
//! sets intersect.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::event::{ChannelKind, EventType, InboundEvent, Mention};

/// How an event reached the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextCategory {
    /// Channel chatter that does not mention the bot.
    Ambient,
    /// The bot is @-mentioned anywhere in the message.
    Mention,
    /// The message starts with an @-mention of the bot.
    DirectMention,
    /// The message was sent in a DM with the bot.
    DirectMessage,
}

impl ContextCategory {
    pub const ALL: [Self; 4] = [
        Self::Ambient,
        Self::Mention,
        Self::DirectMention,
        Self::DirectMessage,
    ];

    const fn bit(self) -> u8 {
        match self {
            Self::Ambient => 1,
            Self::Mention => 1 << 1,
            Self::DirectMention => 1 << 2,
            Self::DirectMessage => 1 << 3,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ambient => "ambient",
            Self::Mention => "mention",
            Self::DirectMention => "direct_mention",
            Self::DirectMessage => "direct_message",
        }
    }
}

impl fmt::Display for ContextCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A small set of [`ContextCategory`] values.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ContextSet(u8);

impl ContextSet {
    pub const EMPTY: Self = Self(0);

    #[must_use]
    pub const fn of(categories: &[ContextCategory]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < categories.len() {
            bits |= categories[i].bit();
            i += 1;
        }
        Self(bits)
    }

    pub fn insert(&mut self, category: ContextCategory) {
        self.0 |= category.bit();
    }

    #[must_use]
    pub fn contains(self, category: ContextCategory) -> bool {
        self.0 & category.bit() != 0
    }

    #[must_use]
    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = ContextCategory> {
        ContextCategory::ALL
            .into_iter()
            .filter(move |c| self.contains(*c))
    }
}

impl FromIterator<ContextCategory> for ContextSet {
    fn from_iter<I: IntoIterator<Item = ContextCategory>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for c in iter {
            set.insert(c);
        }
        set
    }
}

impl fmt::Debug for ContextSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Label an event with every delivery context it satisfies.
///
/// Only `message` events are classified; anything else yields the empty set.
#[must_use]
pub fn classify(event: &InboundEvent) -> ContextSet {
    let mut set = ContextSet::EMPTY;
    if event.event_type != EventType::Message {
        return set;
    }

    let is_dm = event.channel_kind == ChannelKind::Direct;
    if is_dm {
        set.insert(ContextCategory::DirectMessage);
    }

    match event.mention {
        Mention::Leading => {
            set.insert(ContextCategory::DirectMention);
            set.insert(ContextCategory::Mention);
        },
        Mention::Inline => set.insert(ContextCategory::Mention),
        Mention::None if !is_dm => set.insert(ContextCategory::Ambient),
        Mention::None => {},
    }

    set
}

#[cfg(test)]
mod tests {
    use {
        super::{ContextCategory as C, *},
        rstest::rstest,
    };

    fn event(kind: ChannelKind, mention: Mention) -> InboundEvent {
        InboundEvent {
            channel_kind: kind,
            mention,
            ..InboundEvent::direct_message("T1", "C1", "U1", "hello")
        }
    }

    #[rstest]
    #[case(ChannelKind::Direct, Mention::None, &[C::DirectMessage])]
    #[case(ChannelKind::Direct, Mention::Leading, &[C::DirectMessage, C::DirectMention, C::Mention])]
    #[case(ChannelKind::Channel, Mention::None, &[C::Ambient])]
    #[case(ChannelKind::Channel, Mention::Leading, &[C::DirectMention, C::Mention])]
    #[case(ChannelKind::Channel, Mention::Inline, &[C::Mention])]
    #[case(ChannelKind::Group, Mention::Inline, &[C::Mention])]
    #[case(ChannelKind::Unknown, Mention::None, &[C::Ambient])]
    fn classifies_message_events(
        #[case] kind: ChannelKind,
        #[case] mention: Mention,
        #[case] expected: &[ContextCategory],
    ) {
        assert_eq!(classify(&event(kind, mention)), ContextSet::of(expected));
    }

    #[test]
    fn non_message_events_are_unclassified() {
        let mut ev = event(ChannelKind::Direct, Mention::Leading);
        ev.event_type = EventType::Other("reaction_added".into());
        assert!(classify(&ev).is_empty());

        ev.event_type = EventType::AppMention;
        assert!(classify(&ev).is_empty());
    }

    #[test]
    fn set_operations() {
        let triggers = ContextSet::of(&[C::Mention, C::DirectMessage]);
        assert!(triggers.intersects(ContextSet::of(&[C::DirectMessage])));
        assert!(!triggers.intersects(ContextSet::of(&[C::Ambient, C::DirectMention])));
        assert!(!triggers.intersects(ContextSet::EMPTY));

        let collected: ContextSet = [C::Ambient, C::Ambient].into_iter().collect();
        assert_eq!(collected.iter().count(), 1);
        assert_eq!(format!("{triggers:?}"), "{Mention, DirectMessage}");
    }
}
