//! Fake platform services for lifecycle tests
//!
//! All fakes append to one shared [`EventLog`] so tests can assert on the
//! relative order of connects, messages, synthesis and playback.

#![allow(dead_code)]

use async_trait::async_trait;
use chirp_core::{
    BotServices, ChirpError, Invocation, MessageSink, PlaybackHandle, Result, SpeechSynthesizer,
    SynthesizedAudio, VoiceGateway,
};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ============================================================================
// Event log
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Connect { guild: u64, channel: u64 },
    Disconnect { guild: u64 },
    Send { channel: u64, text: String },
    Synthesize { text: String, path: PathBuf },
    Play { guild: u64, path: PathBuf },
}

#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<Event>>>);

impl EventLog {
    pub fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Send { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn synthesized_paths(&self) -> Vec<PathBuf> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Synthesize { path, .. } => Some(path),
                _ => None,
            })
            .collect()
    }

    pub fn position(&self, pred: impl Fn(&Event) -> bool) -> Option<usize> {
        self.events().iter().position(pred)
    }
}

// ============================================================================
// Messenger
// ============================================================================

pub struct FakeMessenger {
    pub log: EventLog,
    pub fail: bool,
}

#[async_trait]
impl MessageSink for FakeMessenger {
    async fn send_message(&self, channel_id: u64, text: &str) -> Result<()> {
        self.log.push(Event::Send {
            channel: channel_id,
            text: text.to_string(),
        });
        if self.fail {
            return Err(ChirpError::service("message rejected"));
        }
        Ok(())
    }
}

// ============================================================================
// Voice gateway
// ============================================================================

/// How the fake player ends a track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayMode {
    Complete,
    Fail,
    /// Drop the notifier without reporting
    Vanish,
    /// Refuse to start playback
    Refuse,
    /// Finish, but leave the guild's call without a live connection, as
    /// when the bot is kicked from the channel mid-playback
    Kicked,
}

pub struct FakeVoice {
    pub log: EventLog,
    pub connections: Mutex<HashMap<u64, u64>>,
    /// Guilds whose call is still registered but no longer connected
    pub dropped: Mutex<HashSet<u64>>,
    pub fail_connect: bool,
    pub play_mode: PlayMode,
}

impl FakeVoice {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            connections: Mutex::new(HashMap::new()),
            dropped: Mutex::new(HashSet::new()),
            fail_connect: false,
            play_mode: PlayMode::Complete,
        }
    }

    pub fn connected_to(&self, guild_id: u64) -> Option<u64> {
        self.connections.lock().unwrap().get(&guild_id).copied()
    }

    pub fn preconnect(&self, guild_id: u64, channel_id: u64) {
        self.connections.lock().unwrap().insert(guild_id, channel_id);
    }
}

#[async_trait]
impl VoiceGateway for FakeVoice {
    async fn is_connected(&self, guild_id: u64) -> bool {
        !self.dropped.lock().unwrap().contains(&guild_id)
            && self.connections.lock().unwrap().contains_key(&guild_id)
    }

    async fn connect(&self, guild_id: u64, channel_id: u64) -> Result<()> {
        self.log.push(Event::Connect {
            guild: guild_id,
            channel: channel_id,
        });
        if self.fail_connect {
            return Err(ChirpError::connection("voice server unreachable"));
        }
        let mut connections = self.connections.lock().unwrap();
        if connections.contains_key(&guild_id) {
            return Err(ChirpError::connection("already connected"));
        }
        connections.insert(guild_id, channel_id);
        Ok(())
    }

    async fn disconnect(&self, guild_id: u64) -> Result<()> {
        self.log.push(Event::Disconnect { guild: guild_id });
        self.connections.lock().unwrap().remove(&guild_id);
        self.dropped.lock().unwrap().remove(&guild_id);
        Ok(())
    }

    async fn play(&self, guild_id: u64, audio: &Path) -> Result<PlaybackHandle> {
        self.log.push(Event::Play {
            guild: guild_id,
            path: audio.to_path_buf(),
        });
        if !audio.exists() {
            return Err(ChirpError::playback("audio file missing"));
        }
        if self.play_mode == PlayMode::Refuse {
            return Err(ChirpError::playback("player refused input"));
        }

        if self.play_mode == PlayMode::Kicked {
            self.dropped.lock().unwrap().insert(guild_id);
        }

        let (notifier, handle) = PlaybackHandle::channel();
        let mode = self.play_mode;
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            match mode {
                PlayMode::Complete | PlayMode::Kicked => {
                    notifier.complete();
                }
                PlayMode::Fail => {
                    notifier.fail("corrupt frame");
                }
                PlayMode::Vanish | PlayMode::Refuse => drop(notifier),
            }
        });
        Ok(handle)
    }
}

// ============================================================================
// Synthesizer
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthMode {
    Write,
    Fail,
    /// Write the file, then fail
    WriteThenFail,
    Panic,
}

pub struct FakeSynthesizer {
    pub log: EventLog,
    pub mode: SynthMode,
}

#[async_trait]
impl SpeechSynthesizer for FakeSynthesizer {
    async fn synthesize(
        &self,
        text: &str,
        language: &str,
        dest: &Path,
    ) -> Result<SynthesizedAudio> {
        self.log.push(Event::Synthesize {
            text: text.to_string(),
            path: dest.to_path_buf(),
        });
        match self.mode {
            SynthMode::Fail => return Err(ChirpError::synthesis("TTS service unreachable")),
            SynthMode::Panic => panic!("synthesizer blew up"),
            SynthMode::Write | SynthMode::WriteThenFail => {}
        }

        tokio::fs::write(dest, text.as_bytes()).await?;
        if self.mode == SynthMode::WriteThenFail {
            return Err(ChirpError::synthesis("truncated response"));
        }

        Ok(SynthesizedAudio {
            text: text.to_string(),
            language: language.to_string(),
            path: dest.to_path_buf(),
            format: "mp3",
            size_bytes: text.len(),
        })
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub log: EventLog,
    pub voice: Arc<FakeVoice>,
    pub messenger: Arc<FakeMessenger>,
    pub synthesizer: Arc<FakeSynthesizer>,
    pub scratch: tempfile::TempDir,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(|_| {}, SynthMode::Write)
    }

    pub fn with(configure: impl FnOnce(&mut FakeVoice), synth: SynthMode) -> Self {
        let log = EventLog::default();
        let mut voice = FakeVoice::new(log.clone());
        configure(&mut voice);
        Self {
            voice: Arc::new(voice),
            messenger: Arc::new(FakeMessenger {
                log: log.clone(),
                fail: false,
            }),
            synthesizer: Arc::new(FakeSynthesizer {
                log: log.clone(),
                mode: synth,
            }),
            scratch: tempfile::tempdir().unwrap(),
            log,
        }
    }

    pub fn services(&self) -> BotServices {
        BotServices::new(self.messenger.clone(), self.voice.clone())
    }

    pub fn lifecycle(&self) -> chirp_plugin_tts::TtsLifecycle {
        chirp_plugin_tts::TtsLifecycle::new(
            self.services(),
            self.synthesizer.clone(),
            "en",
            self.scratch.path(),
        )
    }

    pub fn scratch_is_empty(&self) -> bool {
        std::fs::read_dir(self.scratch.path()).unwrap().next().is_none()
    }
}

pub const TEXT_CHANNEL: u64 = 500;

pub fn invocation(guild: Option<u64>, voice_channel: Option<u64>, text: &str) -> Invocation {
    Invocation {
        id: Uuid::new_v4(),
        user_id: 42,
        user_name: "Alice".to_string(),
        guild_id: guild,
        text_channel_id: TEXT_CHANNEL,
        command: "tts".to_string(),
        text: text.to_string(),
        voice_channel_id: voice_channel,
    }
}
