//! TTS plugin for Chirp
//!
//! Provides the `tts` command: the bot joins the invoker's voice channel,
//! speaks the given text, and leaves again.
//!
//! ```text
//! !tts hello everyone
//! ```

#![warn(clippy::all)]

pub mod lifecycle;
pub mod scratch;

pub use lifecycle::{LifecycleOutcome, TtsLifecycle, FAILURE_MESSAGE, REJECTION_MESSAGE};
pub use scratch::ScratchAudio;

use async_trait::async_trait;
use chirp_core::{
    BotServices, ChirpError, Command, Invocation, Plugin, Result, SpeechSynthesizer, TtsSettings,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Plugin name used in load logs
pub const PLUGIN_NAME: &str = "tts";

/// Text-to-speech plugin
pub struct TtsPlugin {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    language: String,
    scratch_dir: PathBuf,
}

impl TtsPlugin {
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        language: impl Into<String>,
        scratch_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            synthesizer,
            language: language.into(),
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Build from bot settings
    pub fn from_settings(synthesizer: Arc<dyn SpeechSynthesizer>, settings: &TtsSettings) -> Self {
        Self::new(
            synthesizer,
            settings.language.clone(),
            settings.scratch_dir.clone(),
        )
    }
}

#[async_trait]
impl Plugin for TtsPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn description(&self) -> &str {
        "Speaks text in the caller's voice channel"
    }

    async fn init(&self) -> Result<()> {
        if !self.synthesizer.is_ready().await {
            return Err(ChirpError::plugin(
                "speech engine is not configured (check OPENAI_API_KEY)",
            ));
        }
        tokio::fs::create_dir_all(&self.scratch_dir)
            .await
            .map_err(|e| {
                ChirpError::plugin(format!(
                    "cannot create audio directory {}: {}",
                    self.scratch_dir.display(),
                    e
                ))
            })?;
        debug!(dir = %self.scratch_dir.display(), "TTS audio directory ready");
        Ok(())
    }

    fn commands(&self) -> Vec<Arc<dyn Command>> {
        vec![Arc::new(TtsCommand {
            synthesizer: self.synthesizer.clone(),
            language: self.language.clone(),
            scratch_dir: self.scratch_dir.clone(),
        })]
    }
}

/// The `tts` command
pub struct TtsCommand {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    language: String,
    scratch_dir: PathBuf,
}

#[async_trait]
impl Command for TtsCommand {
    fn name(&self) -> &str {
        "tts"
    }

    fn help(&self) -> &str {
        "Joins your voice channel and says the given text."
    }

    fn usage(&self) -> String {
        "tts <text>".to_string()
    }

    async fn execute(&self, invocation: Invocation, services: BotServices) -> Result<()> {
        let lifecycle = TtsLifecycle::new(
            services,
            self.synthesizer.clone(),
            self.language.clone(),
            self.scratch_dir.clone(),
        );
        // Failures are reported to the channel and logged by the lifecycle.
        lifecycle.handle_voice_command(&invocation).await;
        Ok(())
    }
}
