//! Voice-command lifecycle
//!
//! One invocation runs through fixed phases:
//!
//! 1. precondition: the invoker must be in a voice channel, otherwise a
//!    rejection is sent and nothing else happens
//! 2. connect: any existing connection in the guild is dropped first, then
//!    the bot joins the invoker's channel
//! 3. synthesize: acknowledgment message, then text-to-speech into a
//!    per-invocation scratch file
//! 4. play and wait for the player to report completion
//! 5. cleanup: disconnect (always, it is idempotent), delete the scratch
//!    file, log
//!
//! Any error (or panic) in phases 2-4 is logged, reported to the channel
//! with one generic message, and followed by cleanup. Phase 5 always runs
//! once the precondition passes.

use crate::scratch::ScratchAudio;
use chirp_core::{BotServices, ChirpError, Invocation, Result, SpeechSynthesizer};
use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub const REJECTION_MESSAGE: &str = "You need to be in a voice channel to use this command!";

pub const FAILURE_MESSAGE: &str =
    "An error occurred during TTS or playback. Check console for details.";

/// Acknowledgment sent before synthesis starts
pub fn acknowledgment(text: &str) -> String {
    format!("Generating audio for: `{}`", text)
}

/// Terminal state of an invocation
#[derive(Debug)]
pub enum LifecycleOutcome {
    /// Invoker was not in a voice channel; no resources were touched
    Rejected,
    /// Cleanup ran; `error` holds the failure from phases 2-4, if any
    Completed { error: Option<ChirpError> },
}

impl LifecycleOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, LifecycleOutcome::Completed { error: None })
    }
}

pub struct TtsLifecycle {
    services: BotServices,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    language: String,
    scratch_dir: PathBuf,
}

impl TtsLifecycle {
    pub fn new(
        services: BotServices,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        language: impl Into<String>,
        scratch_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            services,
            synthesizer,
            language: language.into(),
            scratch_dir: scratch_dir.into(),
        }
    }

    pub async fn handle_voice_command(&self, invocation: &Invocation) -> LifecycleOutcome {
        let (guild_id, channel_id) = match voice_target(invocation) {
            Ok(target) => target,
            Err(e) => {
                info!(
                    invocation_id = %invocation.id,
                    user = %invocation.user_name,
                    kind = e.kind(),
                    "Rejected: {}",
                    e
                );
                self.send(invocation.text_channel_id, REJECTION_MESSAGE).await;
                return LifecycleOutcome::Rejected;
            }
        };

        let scratch = ScratchAudio::new(&self.scratch_dir, guild_id, invocation.id);

        let phases = self.run_phases(invocation, guild_id, channel_id, &scratch);
        let phases = AssertUnwindSafe(phases).catch_unwind().await;
        let error = match phases {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(e),
            Err(panic) => Some(ChirpError::other(format!(
                "invocation panicked: {}",
                panic_message(panic.as_ref())
            ))),
        };

        if let Some(e) = &error {
            error!(
                invocation_id = %invocation.id,
                guild_id,
                kind = e.kind(),
                error = %e,
                "An error occurred during TTS or playback"
            );
            self.send(invocation.text_channel_id, FAILURE_MESSAGE).await;
        }

        self.cleanup(invocation, guild_id, &scratch).await;

        LifecycleOutcome::Completed { error }
    }

    async fn run_phases(
        &self,
        invocation: &Invocation,
        guild_id: u64,
        channel_id: u64,
        scratch: &ScratchAudio,
    ) -> Result<()> {
        let voice = &self.services.voice;

        // Last connector wins: drop whatever the bot holds in this guild.
        if voice.is_connected(guild_id).await {
            info!(guild_id, "Leaving current voice channel before joining");
            voice.disconnect(guild_id).await?;
        }
        voice.connect(guild_id, channel_id).await?;
        info!(guild_id, channel_id, "Joined voice channel");

        self.services
            .messenger
            .send_message(invocation.text_channel_id, &acknowledgment(&invocation.text))
            .await?;

        let audio = self
            .synthesizer
            .synthesize(&invocation.text, &self.language, scratch.path())
            .await?;
        debug!(
            invocation_id = %invocation.id,
            size_bytes = audio.size_bytes,
            format = audio.format,
            "Audio ready"
        );

        let playback = voice.play(guild_id, &audio.path).await?;
        playback.finished().await?;
        info!(invocation_id = %invocation.id, guild_id, "Playback finished");

        Ok(())
    }

    async fn cleanup(&self, invocation: &Invocation, guild_id: u64, scratch: &ScratchAudio) {
        // Unconditional: a kicked bot can hold a call with no live connection
        if let Err(e) = self.services.voice.disconnect(guild_id).await {
            warn!(guild_id, error = %e, "Failed to leave voice channel during cleanup");
        }

        match scratch.remove().await {
            Ok(true) => debug!(path = %scratch.path().display(), "Removed audio file"),
            Ok(false) => {}
            Err(e) => warn!(
                path = %scratch.path().display(),
                error = %e,
                "Failed to remove audio file"
            ),
        }

        info!(
            invocation_id = %invocation.id,
            "Cleanup complete for command: {}",
            invocation.text
        );
    }

    async fn send(&self, channel_id: u64, text: &str) {
        if let Err(e) = self.services.messenger.send_message(channel_id, text).await {
            warn!(channel_id, error = %e, "Failed to send message");
        }
    }
}

/// Guild and voice channel to speak in, if the invoker is in one
fn voice_target(invocation: &Invocation) -> Result<(u64, u64)> {
    match (invocation.guild_id, invocation.voice_channel_id) {
        (Some(guild_id), Some(channel_id)) => Ok((guild_id, channel_id)),
        (None, _) => Err(ChirpError::precondition("command used outside a guild")),
        (Some(_), None) => Err(ChirpError::precondition("invoker is not in a voice channel")),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
