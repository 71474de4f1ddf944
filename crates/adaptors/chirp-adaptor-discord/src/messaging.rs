//! Text replies over the Discord HTTP API

use async_trait::async_trait;
use chirp_core::{ChirpError, MessageSink, Result};
use serenity::http::Http;
use serenity::model::id::ChannelId;
use std::sync::Arc;
use tracing::debug;

/// Discord's per-message character limit
pub const MAX_MESSAGE_CHARS: usize = 2000;

pub struct DiscordMessenger {
    http: Arc<Http>,
}

impl DiscordMessenger {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl MessageSink for DiscordMessenger {
    async fn send_message(&self, channel_id: u64, text: &str) -> Result<()> {
        let content = truncate(text, MAX_MESSAGE_CHARS);
        ChannelId::new(channel_id)
            .say(self.http.as_ref(), content)
            .await
            .map_err(|e| ChirpError::service(format!("discord send error: {:?}", e)))?;
        debug!(channel_id, len = content.len(), "Message sent");
        Ok(())
    }
}

/// Cut `text` to at most `max` characters on a char boundary
fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello", 5), "hello");
        assert_eq!(truncate("hello", 3), "hel");
        assert_eq!(truncate("héllo", 2), "hé");

        let long = "x".repeat(MAX_MESSAGE_CHARS + 50);
        assert_eq!(truncate(&long, MAX_MESSAGE_CHARS).len(), MAX_MESSAGE_CHARS);
    }
}
