use std::path::Path;

use {
    anyhow::{Context, Result},
    palaver_channels::{
        InboundEvent,
        slack::{self, Decoded},
    },
    palaver_routing::DispatchOutcome,
    tokio::io::{AsyncBufReadExt, BufReader},
    tracing::{debug, warn},
};

use crate::Runtime;

/// Read stdin line by line, dispatching each line as a direct message.
pub async fn chat(runtime: &Runtime, team: &str, channel: &str, user: &str) -> Result<()> {
    eprintln!("Chatting as {user} in {channel}. Type `help` to start, Ctrl-D to quit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let event = InboundEvent::direct_message(team, channel, user, line.trim());
        let outcome = runtime.dispatcher.dispatch(event).await;
        debug!(?outcome, "dispatched");
    }
    Ok(())
}

/// One replay line: a raw Slack payload or an already-normalised event.
fn parse_line(line: &str, bot_user_id: Option<&str>) -> Result<Option<InboundEvent>> {
    let value: serde_json::Value = serde_json::from_str(line)?;
    if value.get("type").is_some() {
        return Ok(match slack::decode(&value, bot_user_id)? {
            Decoded::Event(event) => Some(event),
            Decoded::Challenge(_) | Decoded::Ignored => None,
        });
    }
    Ok(Some(serde_json::from_value(value)?))
}

/// Dispatch every event in a JSON-lines file, in order.
pub async fn replay(runtime: &Runtime, file: &Path) -> Result<()> {
    let contents = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    let bot_user_id = runtime.config.bot.user_id.as_deref();

    let (mut handled, mut skipped) = (0usize, 0usize);
    for (n, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let event = match parse_line(line, bot_user_id) {
            Ok(Some(event)) => event,
            Ok(None) => {
                debug!(line = n + 1, "nothing to dispatch");
                skipped += 1;
                continue;
            },
            Err(e) => {
                warn!(line = n + 1, error = %e, "skipping malformed line");
                skipped += 1;
                continue;
            },
        };
        println!("{}> {}", event.user, event.text);
        match runtime.dispatcher.dispatch(event).await {
            outcome @ (DispatchOutcome::Continued { .. } | DispatchOutcome::Triggered { .. }) => {
                debug!(line = n + 1, ?outcome, "dispatched");
                handled += 1;
            },
            outcome => {
                debug!(line = n + 1, ?outcome, "not handled");
                skipped += 1;
            },
        }
    }
    eprintln!("{handled} handled, {skipped} skipped");
    Ok(())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        palaver_channels::{ChannelKind, Mention},
    };

    #[test]
    fn plain_event_lines() {
        let event = parse_line(
            r#"{"team_id":"T1","channel":"D1","user":"U1","text":"hi","channel_kind":"direct"}"#,
            None,
        )
        .unwrap()
        .unwrap();
        assert_eq!(event.text, "hi");
        assert_eq!(event.channel_kind, ChannelKind::Direct);
    }

    #[test]
    fn slack_envelope_lines() {
        let line = r#"{"type":"event_callback","team_id":"T1","event":{"type":"message","channel":"C1","channel_type":"channel","user":"U1","text":"<@UBOT> hey","ts":"1.0"}}"#;
        let event = parse_line(line, Some("UBOT")).unwrap().unwrap();
        assert_eq!(event.text, "hey");
        assert_eq!(event.mention, Mention::Leading);
    }

    #[test]
    fn handshakes_and_bot_echoes_are_skipped() {
        assert!(
            parse_line(r#"{"type":"url_verification","challenge":"abc"}"#, None)
                .unwrap()
                .is_none()
        );
        let echo = r#"{"type":"event_callback","team_id":"T1","event":{"type":"message","channel":"D1","user":"U1","text":"hi","bot_id":"B1"}}"#;
        assert!(parse_line(echo, None).unwrap().is_none());
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_line("not json", None).is_err());
        assert!(parse_line(r#"{"text":"missing ids"}"#, None).is_err());
    }
}
