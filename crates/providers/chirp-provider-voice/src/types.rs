//! Core types for the voice provider

use async_trait::async_trait;
use bytes::Bytes;
use chirp_core::Result;
use serde::{Deserialize, Serialize};

/// Encoding of synthesized audio
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// What Google always returns and what the player decodes
    #[default]
    Mp3,
    /// Uncompressed PCM in a RIFF container
    Wav,
}

impl AudioFormat {
    /// File extension, also the `response_format` value OpenAI expects
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
        }
    }
}

/// Google Translate knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleOptions {
    /// Top-level domain of the endpoint; selects the regional accent
    pub tld: String,
    /// Slower speech
    pub slow: bool,
}

impl Default for GoogleOptions {
    fn default() -> Self {
        Self {
            tld: "com".to_string(),
            slow: false,
        }
    }
}

/// OpenAI speech knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIOptions {
    pub voice: String,
    /// 0.25 to 4.0
    pub speed: f32,
    /// Overrides the engine's model when set
    pub model: Option<String>,
}

impl Default for OpenAIOptions {
    fn default() -> Self {
        Self {
            voice: "alloy".to_string(),
            speed: 1.0,
            model: None,
        }
    }
}

/// Per-request synthesis settings. Each engine reads its own section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceConfig {
    /// Language code (e.g. "en", "fr")
    pub language: String,
    pub format: AudioFormat,
    pub google: GoogleOptions,
    pub openai: OpenAIOptions,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            format: AudioFormat::Mp3,
            google: GoogleOptions::default(),
            openai: OpenAIOptions::default(),
        }
    }
}

/// Encoded speech returned by an engine
#[derive(Debug, Clone)]
pub struct AudioData {
    pub bytes: Bytes,
    pub format: AudioFormat,
}

impl AudioData {
    pub fn new(bytes: impl Into<Bytes>, format: AudioFormat) -> Self {
        Self {
            bytes: bytes.into(),
            format,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A text-to-speech backend
#[async_trait]
pub trait VoiceEngine: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Turn text into encoded audio
    async fn synthesize(&self, text: &str, config: &VoiceConfig) -> Result<AudioData>;

    /// Whether the engine has what it needs (credentials etc.) to synthesize
    async fn is_ready(&self) -> bool;

    /// Longest text, in characters, accepted in one call
    fn max_text_length(&self) -> usize {
        4096
    }
}

/// Why synthesis failed
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    #[error("nothing to speak")]
    EmptyText,

    #[error("text is {length} characters, limit is {max}")]
    TooLong { length: usize, max: usize },

    #[error("engine not configured: {0}")]
    NotConfigured(String),

    #[error("credentials rejected: {0}")]
    Unauthorized(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("TTS service unreachable: {0}")]
    Network(String),

    #[error("TTS service answered {status}: {detail}")]
    Rejected { status: u16, detail: String },

    #[error("TTS service returned no audio")]
    NoAudio,
}

impl From<VoiceError> for chirp_core::ChirpError {
    fn from(err: VoiceError) -> Self {
        chirp_core::ChirpError::synthesis(err.to_string())
    }
}

impl From<reqwest::Error> for VoiceError {
    fn from(err: reqwest::Error) -> Self {
        VoiceError::Network(err.to_string())
    }
}
