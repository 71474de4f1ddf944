//! Voice collaborator seams: connections, playback and synthesis

use crate::{ChirpError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// How a playback ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// Track played to the end
    Completed,
    /// Decoder or transport reported an error
    Failed(String),
}

/// Reporting half of a playback completion channel.
///
/// Cloneable so that both the "ended" and "errored" callbacks of a player
/// can hold it; only the first report is delivered.
#[derive(Debug, Clone)]
pub struct PlaybackNotifier {
    tx: Arc<Mutex<Option<oneshot::Sender<PlaybackOutcome>>>>,
}

impl PlaybackNotifier {
    /// Report successful completion
    pub fn complete(&self) -> bool {
        self.report(PlaybackOutcome::Completed)
    }

    /// Report a playback failure
    pub fn fail(&self, reason: impl Into<String>) -> bool {
        self.report(PlaybackOutcome::Failed(reason.into()))
    }

    /// Deliver an outcome. Returns false if one was already delivered.
    pub fn report(&self, outcome: PlaybackOutcome) -> bool {
        let sender = {
            let mut guard = self.tx.lock().unwrap_or_else(|e| e.into_inner());
            guard.take()
        };
        match sender {
            // Receiver may already be gone if the invocation bailed out
            Some(tx) => {
                let _ = tx.send(outcome);
                true
            }
            None => false,
        }
    }
}

/// Awaitable half of a playback completion channel
#[derive(Debug)]
pub struct PlaybackHandle {
    rx: oneshot::Receiver<PlaybackOutcome>,
}

impl PlaybackHandle {
    /// Create a linked notifier/handle pair
    pub fn channel() -> (PlaybackNotifier, PlaybackHandle) {
        let (tx, rx) = oneshot::channel();
        (
            PlaybackNotifier {
                tx: Arc::new(Mutex::new(Some(tx))),
            },
            PlaybackHandle { rx },
        )
    }

    /// Wait until the player reports an outcome.
    ///
    /// A notifier dropped without reporting counts as a playback error.
    pub async fn finished(self) -> Result<()> {
        match self.rx.await {
            Ok(PlaybackOutcome::Completed) => Ok(()),
            Ok(PlaybackOutcome::Failed(reason)) => Err(ChirpError::playback(reason)),
            Err(_) => Err(ChirpError::playback(
                "player stopped without reporting completion",
            )),
        }
    }
}

/// Voice connections and audio playback for one chat platform.
///
/// At most one connection per guild; `connect` does not tear down an
/// existing one, callers disconnect first.
#[async_trait]
pub trait VoiceGateway: Send + Sync {
    /// Whether the bot currently holds a voice connection in `guild_id`
    async fn is_connected(&self, guild_id: u64) -> bool;

    /// Join `channel_id` in `guild_id`
    async fn connect(&self, guild_id: u64, channel_id: u64) -> Result<()>;

    /// Leave the guild's voice channel. No-op when not connected.
    async fn disconnect(&self, guild_id: u64) -> Result<()>;

    /// Start playing an audio file on the guild's connection
    async fn play(&self, guild_id: u64, audio: &Path) -> Result<PlaybackHandle>;
}

/// Audio produced for one invocation
#[derive(Debug, Clone)]
pub struct SynthesizedAudio {
    /// Source text
    pub text: String,
    /// Language code used
    pub language: String,
    /// Where the audio was written
    pub path: PathBuf,
    /// File extension of the encoding (e.g. "mp3")
    pub format: &'static str,
    /// Size of the written file
    pub size_bytes: usize,
}

/// Text-to-speech collaborator
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` and write the audio to `dest`
    async fn synthesize(&self, text: &str, language: &str, dest: &Path)
        -> Result<SynthesizedAudio>;

    /// Whether synthesis can work at all, e.g. credentials are present
    async fn is_ready(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_playback_completes() {
        let (notifier, handle) = PlaybackHandle::channel();
        assert!(notifier.complete());
        assert!(handle.finished().await.is_ok());
    }

    #[tokio::test]
    async fn test_first_report_wins() {
        let (notifier, handle) = PlaybackHandle::channel();
        let other = notifier.clone();
        assert!(other.fail("decoder exploded"));
        assert!(!notifier.complete());

        let err = handle.finished().await.unwrap_err();
        assert!(matches!(err, ChirpError::Playback(ref m) if m == "decoder exploded"));
    }

    #[tokio::test]
    async fn test_dropped_notifier_is_error() {
        let (notifier, handle) = PlaybackHandle::channel();
        drop(notifier);
        assert!(matches!(
            handle.finished().await,
            Err(ChirpError::Playback(_))
        ));
    }

    #[tokio::test]
    async fn test_report_from_another_task() {
        let (notifier, handle) = PlaybackHandle::channel();
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            notifier.complete();
        });
        assert!(handle.finished().await.is_ok());
    }
}
