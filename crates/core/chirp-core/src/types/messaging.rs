//! Outbound text messages and per-invocation context

use super::voice::VoiceGateway;
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Sends text back to a chat channel
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Post `text` to the given text channel
    async fn send_message(&self, channel_id: u64, text: &str) -> Result<()>;
}

/// Process-scoped platform services handed to every command
#[derive(Clone)]
pub struct BotServices {
    pub messenger: Arc<dyn MessageSink>,
    pub voice: Arc<dyn VoiceGateway>,
}

impl BotServices {
    pub fn new(messenger: Arc<dyn MessageSink>, voice: Arc<dyn VoiceGateway>) -> Self {
        Self { messenger, voice }
    }
}

/// A chat message as seen by the dispatcher
#[derive(Debug, Clone, Default)]
pub struct IncomingMessage {
    pub user_id: u64,
    pub user_name: String,
    /// None for direct messages
    pub guild_id: Option<u64>,
    pub channel_id: u64,
    pub content: String,
    /// Voice channel the author currently occupies in `guild_id`
    pub voice_channel_id: Option<u64>,
}

/// One execution of a command triggered by a single user message
#[derive(Debug, Clone)]
pub struct Invocation {
    pub id: Uuid,
    pub user_id: u64,
    pub user_name: String,
    pub guild_id: Option<u64>,
    /// Text channel replies go to
    pub text_channel_id: u64,
    /// Resolved command name
    pub command: String,
    /// Free-form text after the command name
    pub text: String,
    pub voice_channel_id: Option<u64>,
}

impl Invocation {
    /// Build an invocation from a message and its parsed command
    pub fn from_message(message: &IncomingMessage, command: &str, text: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: message.user_id,
            user_name: message.user_name.clone(),
            guild_id: message.guild_id,
            text_channel_id: message.channel_id,
            command: command.to_string(),
            text: text.to_string(),
            voice_channel_id: message.voice_channel_id,
        }
    }
}
