//! Discord Voice Support
//!
//! Voice connections and file playback through songbird. Playback
//! completion is reported through a [`PlaybackHandle`] resolved by
//! track-end and track-error events.

use async_trait::async_trait;
use chirp_core::{
    ChirpError, PlaybackHandle, PlaybackNotifier, PlaybackOutcome, Result, VoiceGateway,
};
use serenity::model::id::{ChannelId, GuildId};
use songbird::events::{Event, EventContext, EventHandler as SongbirdEventHandler, TrackEvent};
use songbird::input::{File as SongbirdFile, Input};
use songbird::tracks::PlayMode;
use songbird::Songbird;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// [`VoiceGateway`] backed by songbird
#[derive(Clone)]
pub struct SongbirdGateway {
    songbird: Arc<Songbird>,
}

impl SongbirdGateway {
    pub fn new(songbird: Arc<Songbird>) -> Self {
        Self { songbird }
    }
}

#[async_trait]
impl VoiceGateway for SongbirdGateway {
    async fn is_connected(&self, guild_id: u64) -> bool {
        match self.songbird.get(GuildId::new(guild_id)) {
            Some(call) => call.lock().await.current_connection().is_some(),
            None => false,
        }
    }

    async fn connect(&self, guild_id: u64, channel_id: u64) -> Result<()> {
        let guild = GuildId::new(guild_id);
        match self.songbird.join(guild, ChannelId::new(channel_id)).await {
            Ok(_call) => {
                info!(guild_id = %guild_id, channel_id = %channel_id, "Joined voice channel");
                Ok(())
            }
            Err(e) => {
                // A failed join can leave a half-initialised call behind
                if self.songbird.get(guild).is_some() {
                    let _ = self.songbird.remove(guild).await;
                }
                Err(ChirpError::connection(format!(
                    "cannot join channel {}: {}",
                    channel_id, e
                )))
            }
        }
    }

    async fn disconnect(&self, guild_id: u64) -> Result<()> {
        let guild = GuildId::new(guild_id);
        if self.songbird.get(guild).is_none() {
            return Ok(());
        }
        self.songbird
            .remove(guild)
            .await
            .map_err(|e| ChirpError::connection(format!("cannot leave voice: {}", e)))?;
        info!(guild_id = %guild_id, "Left voice channel");
        Ok(())
    }

    async fn play(&self, guild_id: u64, audio: &Path) -> Result<PlaybackHandle> {
        let call_lock = self
            .songbird
            .get(GuildId::new(guild_id))
            .ok_or_else(|| ChirpError::playback("not connected to a voice channel"))?;

        let input: Input = SongbirdFile::new(audio.to_path_buf()).into();
        let track = {
            let mut call = call_lock.lock().await;
            call.play_input(input)
        };

        let (notifier, handle) = PlaybackHandle::channel();
        for event in [TrackEvent::End, TrackEvent::Error] {
            track
                .add_event(
                    Event::Track(event),
                    TrackEndNotifier {
                        notifier: notifier.clone(),
                    },
                )
                .map_err(|e| ChirpError::playback(format!("cannot watch track: {}", e)))?;
        }

        info!(
            guild_id = %guild_id,
            path = %audio.display(),
            "Started playing audio in voice channel"
        );
        Ok(handle)
    }
}

/// Resolves a [`PlaybackNotifier`] when songbird reports the track ended
struct TrackEndNotifier {
    notifier: PlaybackNotifier,
}

#[async_trait]
impl SongbirdEventHandler for TrackEndNotifier {
    async fn act(&self, ctx: &EventContext<'_>) -> Option<Event> {
        if let EventContext::Track(tracks) = ctx {
            for (state, _handle) in tracks.iter() {
                let outcome = outcome_for(&state.playing);
                if let PlaybackOutcome::Failed(reason) = &outcome {
                    warn!(reason = %reason, "Track errored");
                }
                if !self.notifier.report(outcome) {
                    debug!("Track outcome already reported");
                }
            }
        }
        Some(Event::Cancel)
    }
}

fn outcome_for(mode: &PlayMode) -> PlaybackOutcome {
    match mode {
        PlayMode::Errored(e) => PlaybackOutcome::Failed(format!("{:?}", e)),
        _ => PlaybackOutcome::Completed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_and_stop_count_as_completed() {
        assert_eq!(outcome_for(&PlayMode::End), PlaybackOutcome::Completed);
        assert_eq!(outcome_for(&PlayMode::Stop), PlaybackOutcome::Completed);
    }

    #[tokio::test]
    async fn test_unknown_guild_is_not_connected() {
        let gateway = SongbirdGateway::new(Songbird::serenity());
        assert!(!gateway.is_connected(42).await);
        assert!(gateway.disconnect(42).await.is_ok(), "disconnect is a no-op");
        assert!(matches!(
            gateway.play(42, Path::new("/tmp/none.mp3")).await,
            Err(ChirpError::Playback(_))
        ));
    }
}
