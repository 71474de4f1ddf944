//! Discord adaptor for Chirp
//!
//! Connects to the Discord gateway with serenity, loads the plugin
//! registry once the gateway reports ready, and routes prefixed messages
//! through the [`CommandDispatcher`]. Voice goes through songbird.

use async_trait::async_trait;
use chirp_core::{
    BotServices, ChirpError, CommandDispatcher, DispatchOutcome, IncomingMessage, Plugin, Result,
    Service,
};
use serenity::async_trait as serenity_async_trait;
use serenity::cache::Settings as CacheSettings;
use serenity::gateway::ShardManager;
use serenity::model::channel::Message as DiscordMessage;
use serenity::model::gateway::{GatewayIntents, Ready};
use serenity::model::guild::Guild;
use serenity::model::voice::VoiceState;
use serenity::prelude::*;
use songbird::serenity::SerenityInit;
use songbird::Songbird;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

pub mod messaging;
pub mod state;
pub mod voice;

pub use messaging::DiscordMessenger;
pub use state::VoiceStateTracker;
pub use voice::SongbirdGateway;

#[derive(Clone)]
pub struct DiscordConfig {
    pub token: String,
    pub prefix: String,
    pub intents: GatewayIntents,
}

impl DiscordConfig {
    pub fn new(token: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            prefix: prefix.into(),
            intents: default_intents(),
        }
    }
}

/// Default intents plus message content, which prefix commands need.
/// Includes GUILDS and GUILD_VOICE_STATES.
pub fn default_intents() -> GatewayIntents {
    GatewayIntents::non_privileged() | GatewayIntents::MESSAGE_CONTENT
}

struct Handler {
    prefix: String,
    plugins: Vec<Arc<dyn Plugin>>,
    /// Set on the first ready event; reconnects reuse it
    dispatcher: Arc<OnceCell<Arc<CommandDispatcher>>>,
    voice: Arc<SongbirdGateway>,
    voice_states: VoiceStateTracker,
}

impl Handler {
    fn new(
        prefix: impl Into<String>,
        plugins: Vec<Arc<dyn Plugin>>,
        voice: Arc<SongbirdGateway>,
        voice_states: VoiceStateTracker,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            plugins,
            dispatcher: Arc::new(OnceCell::new()),
            voice,
            voice_states,
        }
    }

    /// Dispatcher for this session; plugins are loaded by the first caller only
    async fn ensure_dispatcher(&self) -> Arc<CommandDispatcher> {
        if let Some(dispatcher) = self.dispatcher.get() {
            debug!("Gateway ready again after reconnect; plugins already loaded");
            return dispatcher.clone();
        }
        self.dispatcher
            .get_or_init(|| async {
                let dispatcher = self.load_dispatcher().await;
                info!("Bot is fully operational!");
                dispatcher
            })
            .await
            .clone()
    }

    async fn load_dispatcher(&self) -> Arc<CommandDispatcher> {
        let mut dispatcher = CommandDispatcher::new(self.prefix.clone());
        let report = dispatcher.load_plugins(&self.plugins).await;
        if !report.is_clean() {
            warn!(
                loaded = report.loaded.len(),
                failed = report.failed.len(),
                "Some plugins failed to load"
            );
        }
        info!(commands = ?dispatcher.command_names(), "Commands registered");
        Arc::new(dispatcher)
    }

    /// Voice channel of the author, from tracked state or the guild cache
    fn voice_channel_of(&self, ctx: &Context, msg: &DiscordMessage) -> Option<u64> {
        let guild_id = msg.guild_id?;
        let tracked = self
            .voice_states
            .channel_of(guild_id.get(), msg.author.id.get());
        if tracked.is_some() {
            return tracked;
        }
        let guild = ctx.cache.guild(guild_id)?;
        guild
            .voice_states
            .get(&msg.author.id)
            .and_then(|state| state.channel_id)
            .map(|channel| channel.get())
    }
}

#[serenity_async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            guilds_count = %ready.guilds.len(),
            "Logged in as {} (ID: {})",
            ready.user.name,
            ready.user.id.get()
        );
        self.ensure_dispatcher().await;
    }

    /// Populate initial voice states when guild data is received
    async fn guild_create(&self, _ctx: Context, guild: Guild, _is_new: Option<bool>) {
        let guild_id = guild.id.get();
        let members = guild.voice_states.iter().filter_map(|(user_id, state)| {
            state.channel_id.map(|channel| (user_id.get(), channel.get()))
        });
        let tracked = self.voice_states.populate(guild_id, members);
        info!(
            guild_id = %guild_id,
            guild_name = %guild.name,
            tracked_users = %tracked,
            "Voice states initialized from guild_create"
        );
    }

    async fn voice_state_update(&self, _ctx: Context, _old: Option<VoiceState>, new: VoiceState) {
        let Some(guild_id) = new.guild_id else {
            return;
        };
        let channel_id = new.channel_id.map(|c| c.get());
        debug!(
            guild_id = %guild_id.get(),
            user_id = %new.user_id.get(),
            channel_id = ?channel_id,
            "Voice state update"
        );
        self.voice_states
            .update(guild_id.get(), new.user_id.get(), channel_id);
    }

    async fn message(&self, ctx: Context, msg: DiscordMessage) {
        if msg.author.bot {
            return;
        }
        let Some(dispatcher) = self.dispatcher.get().cloned() else {
            debug!("Message received before ready; ignoring");
            return;
        };
        if dispatcher.parse(&msg.content).is_none() {
            return;
        }

        let incoming = IncomingMessage {
            user_id: msg.author.id.get(),
            user_name: msg.author.name.clone(),
            guild_id: msg.guild_id.map(|g| g.get()),
            channel_id: msg.channel_id.get(),
            voice_channel_id: self.voice_channel_of(&ctx, &msg),
            content: msg.content.clone(),
        };
        let services = BotServices::new(
            Arc::new(DiscordMessenger::new(ctx.http.clone())),
            self.voice.clone(),
        );

        // Long-running commands must not stall the gateway event loop
        tokio::spawn(async move {
            let outcome = dispatcher.dispatch(&incoming, &services).await;
            if outcome == DispatchOutcome::Failed {
                warn!(channel_id = %incoming.channel_id, "Command failed");
            }
        });
    }
}

pub struct DiscordAdapterService {
    config: DiscordConfig,
    plugins: Vec<Arc<dyn Plugin>>,
    voice_states: VoiceStateTracker,
    shard_manager: Option<Arc<ShardManager>>,
    running: bool,
}

impl DiscordAdapterService {
    pub fn new(config: DiscordConfig, plugins: Vec<Arc<dyn Plugin>>) -> Self {
        Self {
            config,
            plugins,
            voice_states: VoiceStateTracker::new(),
            shard_manager: None,
            running: false,
        }
    }
}

#[async_trait]
impl Service for DiscordAdapterService {
    fn service_type(&self) -> &str {
        "discord-adapter"
    }

    async fn start(&mut self) -> Result<()> {
        if self.running {
            return Ok(());
        }
        if self.config.token.trim().is_empty() {
            return Err(ChirpError::config("Discord token is empty"));
        }

        let songbird = Songbird::serenity();
        let handler = Handler::new(
            self.config.prefix.clone(),
            self.plugins.clone(),
            Arc::new(SongbirdGateway::new(songbird.clone())),
            self.voice_states.clone(),
        );

        // Voice states live in the guild cache; used as a fallback lookup
        let mut cache_settings = CacheSettings::default();
        cache_settings.cache_guilds = true;
        cache_settings.cache_channels = true;
        cache_settings.cache_users = true;

        let mut client = Client::builder(&self.config.token, self.config.intents)
            .event_handler(handler)
            .cache_settings(cache_settings)
            .register_songbird_with(songbird)
            .await
            .map_err(|e| ChirpError::service(format!("Err creating Discord client: {:?}", e)))?;

        self.shard_manager = Some(client.shard_manager.clone());

        tokio::spawn(async move {
            if let Err(why) = client.start().await {
                error!(error = %format!("{:?}", why), "Discord client error");
            }
        });

        self.running = true;
        info!(prefix = %self.config.prefix, "Discord adapter started");
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(shard_manager) = self.shard_manager.take() {
            shard_manager.shutdown_all().await;
            info!("Discord adapter stopped");
        }
        self.running = false;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
