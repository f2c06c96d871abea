#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{sync::Arc, time::Duration};

use {
    palaver_bot::{COLOR_ROUTE, HOW_ARE_YOU_ROUTE, canned},
    palaver_channels::{
        ChannelKind, InboundEvent, Mention, OutboundMessage, RecordingSink,
        slack::{self, Decoded},
    },
    palaver_config::PalaverConfig,
    palaver_routing::{DispatchOutcome, Dispatcher, FixedPicker},
    palaver_sessions::{
        ConversationKey, ConversationState, ConversationStore, ManualClock,
        MemoryConversationStore, SqliteConversationStore,
    },
    serde_json::json,
};

struct Bot {
    dispatcher: Dispatcher,
    store: Arc<dyn ConversationStore>,
    sink: Arc<RecordingSink>,
}

impl Bot {
    fn with_store(store: Arc<dyn ConversationStore>, picker: FixedPicker) -> Self {
        let sink = Arc::new(RecordingSink::new());
        let dispatcher = palaver_bot::dispatcher(
            &PalaverConfig::default(),
            Arc::clone(&store),
            sink.clone(),
            Arc::new(picker),
        )
        .unwrap();
        Self {
            dispatcher,
            store,
            sink,
        }
    }

    fn in_memory(clock: Arc<ManualClock>) -> Self {
        Self::with_store(
            Arc::new(MemoryConversationStore::with_clock(clock)),
            FixedPicker::never(),
        )
    }

    async fn say(&self, text: &str) -> DispatchOutcome {
        self.dispatcher.dispatch(dm(text)).await
    }

    async fn record(&self) -> Option<(String, ConversationState)> {
        self.store
            .get(&key())
            .await
            .unwrap()
            .map(|r| (r.route, r.state))
    }
}

fn dm(text: &str) -> InboundEvent {
    InboundEvent::direct_message("T1", "D1", "U1", text)
}

fn key() -> ConversationKey {
    ConversationKey::new("T1", "D1", "U1")
}

fn state(v: serde_json::Value) -> ConversationState {
    v.as_object().cloned().unwrap()
}

async fn run_full_flow(bot: &Bot) {
    bot.say("hi").await;
    assert_eq!(
        bot.record().await,
        Some((HOW_ARE_YOU_ROUTE.to_string(), state(json!({"greeting": "hi"}))))
    );

    bot.say("good").await;
    assert_eq!(
        bot.record().await,
        Some((
            COLOR_ROUTE.to_string(),
            state(json!({"greeting": "hi", "status": "good"}))
        ))
    );

    let outcome = bot.say("blue").await;
    assert_eq!(outcome, DispatchOutcome::Continued {
        route: COLOR_ROUTE.into(),
        next_route: None,
    });
    assert_eq!(bot.record().await, None);

    assert_eq!(bot.sink.texts(), vec![
        "hi, how are you?",
        "Ok then. What's your favorite color?",
        "Thanks for sharing.",
        r#"Here's what you've told me so far: ```{"greeting":"hi","status":"good","color":"blue"}```"#,
    ]);
}

#[tokio::test]
async fn greeting_flow_end_to_end() {
    let bot = Bot::in_memory(Arc::new(ManualClock::new(0)));
    run_full_flow(&bot).await;
}

#[tokio::test]
async fn greeting_flow_on_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("palaver.db").display());
    let store = Arc::new(SqliteConversationStore::new(&url).await.unwrap());
    let bot = Bot::with_store(store, FixedPicker::never());
    run_full_flow(&bot).await;
}

#[tokio::test]
async fn empty_replies_re_ask_without_changing_state() {
    let bot = Bot::in_memory(Arc::new(ManualClock::new(0)));
    bot.say("hey").await;
    let before = bot.record().await.unwrap();
    bot.sink.take();

    for _ in 0..3 {
        let outcome = bot.say("").await;
        assert_eq!(outcome.next_route(), Some(HOW_ARE_YOU_ROUTE));
        let after = bot.record().await.unwrap();
        assert_eq!(after, before);
        assert_eq!(
            serde_json::to_string(&after.1).unwrap(),
            serde_json::to_string(&before.1).unwrap()
        );
    }
    assert_eq!(bot.sink.texts(), [
        "Whoops, I'm still waiting to hear how you're doing.",
        "How are you?"
    ]
    .repeat(3));

    bot.say("fine").await;
    bot.sink.take();
    bot.say("").await;
    assert_eq!(bot.record().await.unwrap().0, COLOR_ROUTE);
    assert_eq!(bot.sink.texts(), vec![
        "I'm eagerly awaiting to hear your favorite color."
    ]);
}

#[tokio::test]
async fn whitespace_reply_is_an_answer() {
    let bot = Bot::in_memory(Arc::new(ManualClock::new(0)));
    bot.say("hi").await;
    bot.say(" ").await;
    assert_eq!(
        bot.record().await,
        Some((
            COLOR_ROUTE.to_string(),
            state(json!({"greeting": "hi", "status": " "}))
        ))
    );
}

#[tokio::test]
async fn capitalised_greeting_starts_conversation() {
    let bot = Bot::in_memory(Arc::new(ManualClock::new(0)));
    let outcome = bot.say("Hi").await;
    assert_eq!(outcome, DispatchOutcome::Triggered {
        trigger: 1,
        next_route: Some(HOW_ARE_YOU_ROUTE.into()),
    });
    assert_eq!(bot.sink.texts(), vec!["Hi, how are you?"]);
    assert_eq!(
        bot.record().await.unwrap().1,
        state(json!({"greeting": "Hi"}))
    );
}

#[tokio::test]
async fn file_upload_while_waiting_re_asks() {
    let bot = Bot::in_memory(Arc::new(ManualClock::new(0)));
    bot.say("hello").await;
    let before = bot.record().await.unwrap();
    bot.sink.take();

    let upload = json!({
        "type": "event_callback",
        "team_id": "T1",
        "event": {
            "type": "message", "subtype": "file_share", "channel": "D1",
            "channel_type": "im", "user": "U1", "text": "", "ts": "2.0",
            "files": [{ "id": "F1", "name": "photo.png" }]
        }
    });
    let Decoded::Event(event) = slack::decode(&upload, Some("UBOT")).unwrap() else {
        panic!("file upload should reach the dispatcher");
    };

    let outcome = bot.dispatcher.dispatch(event).await;
    assert_eq!(outcome, DispatchOutcome::Continued {
        route: HOW_ARE_YOU_ROUTE.into(),
        next_route: Some(HOW_ARE_YOU_ROUTE.into()),
    });
    assert_eq!(bot.record().await.unwrap(), before);
    assert_eq!(bot.sink.texts(), vec![
        "Whoops, I'm still waiting to hear how you're doing.",
        "How are you?"
    ]);
}

#[tokio::test]
async fn finished_conversation_falls_back_to_triggers() {
    let bot = Bot::in_memory(Arc::new(ManualClock::new(0)));
    for text in ["hello", "great", "green"] {
        bot.say(text).await;
    }
    assert_eq!(bot.record().await, None);

    // "hi" starts a fresh conversation rather than reaching a stale route.
    let outcome = bot.say("hi").await;
    assert!(matches!(outcome, DispatchOutcome::Triggered { trigger: 1, .. }));
    assert_eq!(
        bot.record().await.unwrap().1,
        state(json!({"greeting": "hi"}))
    );
}

#[tokio::test]
async fn expired_conversation_restarts_from_triggers() {
    let clock = Arc::new(ManualClock::new(0));
    let bot = Bot::in_memory(clock.clone());
    bot.say("hi").await;

    clock.advance(Duration::from_secs(3600));
    let outcome = bot.say("help").await;
    assert!(matches!(outcome, DispatchOutcome::Triggered { trigger: 0, .. }));
    assert_eq!(bot.sink.texts().last().unwrap(), canned::HELP_TEXT);
    assert_eq!(bot.record().await, None);
}

#[tokio::test]
async fn one_record_per_identity() {
    let bot = Bot::in_memory(Arc::new(ManualClock::new(0)));
    for text in ["hi", "hi", "ok", "hello", "", "meh"] {
        bot.say(text).await;
        assert!(bot.store.active_count().await.unwrap() <= 1);
    }
}

#[tokio::test]
async fn thanks_reply_uses_picker() {
    let bot = Bot::with_store(
        Arc::new(MemoryConversationStore::new()),
        FixedPicker::new(2, 1.0),
    );
    let outcome = bot.say("THANK YOU!").await;
    assert!(matches!(outcome, DispatchOutcome::Triggered { trigger: 2, .. }));
    assert_eq!(bot.sink.texts(), vec![":+1: Of course"]);
}

#[tokio::test]
async fn ambient_reply_depends_on_roll() {
    let quiet = Bot::with_store(
        Arc::new(MemoryConversationStore::new()),
        FixedPicker::new(0, 0.9),
    );
    quiet.say("anyone around?").await;
    assert!(quiet.sink.messages().is_empty());

    let chatty = Bot::with_store(
        Arc::new(MemoryConversationStore::new()),
        FixedPicker::new(1, 0.1),
    );
    chatty.say("anyone around?").await;
    assert_eq!(chatty.sink.texts(), vec![":pray:"]);
}

#[tokio::test]
async fn attachment_is_sent_as_rich_message() {
    let bot = Bot::in_memory(Arc::new(ManualClock::new(0)));
    bot.say("attachment").await;

    let sent = bot.sink.messages();
    assert_eq!(sent.len(), 1);
    let OutboundMessage::Rich { attachments, .. } = &sent[0].1 else {
        panic!("expected a rich message");
    };
    assert_eq!(attachments[0].color.as_deref(), Some("#7CD197"));
}

#[tokio::test]
async fn leading_mention_in_channel_starts_conversation() {
    let bot = Bot::in_memory(Arc::new(ManualClock::new(0)));
    let mut event = dm("hey");
    event.channel = "C1".into();
    event.channel_kind = ChannelKind::Channel;
    event.mention = Mention::Leading;

    let outcome = bot.dispatcher.dispatch(event.clone()).await;
    assert_eq!(outcome.next_route(), Some(HOW_ARE_YOU_ROUTE));

    // Inline mention of "help" is answered; an unaddressed "hey" is not.
    event.text = "help".into();
    event.user = "U2".into();
    event.mention = Mention::Inline;
    assert!(bot.dispatcher.dispatch(event.clone()).await.is_handled());

    event.text = "hey".into();
    event.user = "U3".into();
    event.mention = Mention::None;
    assert_eq!(
        bot.dispatcher.dispatch(event).await,
        DispatchOutcome::Unmatched
    );
}
