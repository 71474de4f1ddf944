//! Chirp bot entry point
//!
//! Loads configuration, builds the plugin registry and runs the Discord
//! adaptor until Ctrl-C.

use anyhow::Context as _;
use chirp_adaptor_discord::{DiscordAdapterService, DiscordConfig};
use chirp_core::{init_logging, load_env, load_env_from_path, BotSettings, Plugin, Service};
use chirp_plugin_tts::TtsPlugin;
use chirp_provider_voice::SpeechService;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Environment file to load instead of searching for `.env`
    #[arg(short, long)]
    env_file: Option<PathBuf>,

    /// Command prefix (overrides CHIRP_PREFIX)
    #[arg(short, long)]
    prefix: Option<String>,
}

/// Plugins compiled into the bot, loaded in order on the first ready event
fn plugin_registry(settings: &BotSettings) -> Vec<Arc<dyn Plugin>> {
    let speech = Arc::new(SpeechService::from_settings(&settings.tts));
    vec![Arc::new(TtsPlugin::from_settings(speech, &settings.tts))]
}

fn log_env_source(loaded: Option<&Path>) {
    match loaded {
        Some(path) => info!("Loaded environment from: {}", path.display()),
        None => warn!("No .env file found - using system environment variables only"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load before logging so CHIRP_LOG_LEVEL from the file applies
    let env_loaded = match &cli.env_file {
        Some(path) => load_env_from_path(path).map(Some),
        None => load_env(),
    };
    init_logging();
    log_env_source(env_loaded.context("loading environment")?.as_deref());

    let mut settings = match BotSettings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "Cannot start bot");
            return Err(e.into());
        }
    };
    if let Some(prefix) = cli.prefix {
        settings.prefix = prefix;
    }

    info!(
        prefix = %settings.prefix,
        engine = settings.tts.engine.as_str(),
        language = %settings.tts.language,
        scratch_dir = %settings.tts.scratch_dir.display(),
        "Starting Chirp"
    );

    let plugins = plugin_registry(&settings);
    let mut discord = DiscordAdapterService::new(
        DiscordConfig::new(settings.token.clone(), settings.prefix.clone()),
        plugins,
    );
    discord.start().await.context("starting Discord adapter")?;
    info!(health = ?discord.health_check().await?, "Discord adapter health");

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    info!("Shutting down");
    discord.stop().await?;

    Ok(())
}
