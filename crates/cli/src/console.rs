use std::io::Write;

use {
    async_trait::async_trait,
    palaver_channels::{Error, OutboundMessage, ReplySink, ReplyTarget, Result},
};

/// Prints replies to stdout, one block per message.
pub struct ConsoleSink;

pub fn render(message: &OutboundMessage) -> String {
    let mut out = format!("bot> {}", message.text().trim_end());
    for attachment in message.attachments() {
        out.push_str("\n     |");
        if let Some(title) = &attachment.title {
            out.push_str(&format!(" {title}"));
        }
        if let Some(link) = &attachment.title_link {
            out.push_str(&format!(" <{link}>"));
        }
        if let Some(text) = &attachment.text {
            out.push_str(&format!("\n     | {text}"));
        }
        if let Some(image) = &attachment.image_url {
            out.push_str(&format!("\n     | [image] {image}"));
        }
    }
    out
}

#[async_trait]
impl ReplySink for ConsoleSink {
    async fn say(&self, _to: &ReplyTarget, message: &OutboundMessage) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", render(message))
            .and_then(|()| stdout.flush())
            .map_err(|e| Error::external("writing reply to stdout", e))
    }
}
