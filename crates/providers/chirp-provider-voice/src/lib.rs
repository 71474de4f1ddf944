//! Voice Provider for Chirp
//!
//! Text-to-speech for the `tts` command.
//!
//! ## TTS Engines
//! - Google Translate TTS (default) - free, no key, accent selected by TLD
//! - OpenAI TTS (tts-1 by default, `CHIRP_TTS_MODEL` overrides) - needs `OPENAI_API_KEY`
//!
//! [`SpeechService`] wraps one engine and implements the core
//! [`SpeechSynthesizer`] seam by writing the audio to a file.

#![warn(clippy::all)]

mod engines;
mod types;

pub use engines::*;
pub use types::*;

use async_trait::async_trait;
use chirp_core::{Result, SpeechSynthesizer, SynthesizedAudio, TtsEngineKind, TtsSettings};
use std::path::Path;
use tracing::{info, warn};

/// Speech synthesis backed by a single [`VoiceEngine`]
pub struct SpeechService {
    engine: Box<dyn VoiceEngine>,
    config: VoiceConfig,
}

impl SpeechService {
    /// Create a service for the given engine and configuration
    pub fn new(engine: Box<dyn VoiceEngine>, config: VoiceConfig) -> Self {
        Self { engine, config }
    }

    /// Google Translate TTS with the given accent domain
    pub fn with_google(tld: impl Into<String>, slow: bool) -> Self {
        let mut config = VoiceConfig::default();
        config.google = GoogleOptions {
            tld: tld.into(),
            slow,
        };
        Self::new(Box::new(GoogleTranslateEngine::new()), config)
    }

    /// OpenAI TTS with the given voice
    pub fn with_openai(api_key: Option<String>, voice: impl Into<String>) -> Self {
        let voice = voice.into();
        if !openai::OPENAI_VOICES.contains(&voice.as_str()) {
            warn!(voice = %voice, "Unknown OpenAI voice, request may be rejected");
        }
        let mut config = VoiceConfig::default();
        config.openai.voice = voice;
        Self::new(Box::new(OpenAIVoiceEngine::new(api_key)), config)
    }

    /// Build from bot settings
    pub fn from_settings(settings: &TtsSettings) -> Self {
        let mut service = match settings.engine {
            TtsEngineKind::Google => Self::with_google(settings.tld.clone(), settings.slow),
            TtsEngineKind::OpenAI => {
                Self::with_openai(settings.openai_api_key.clone(), settings.voice.clone())
            }
        };
        service.config.language = settings.language.clone();
        service.config.openai.model = settings.model.clone();
        info!(
            engine = service.engine.name(),
            language = %service.config.language,
            "Speech service configured"
        );
        service
    }

    /// Active configuration
    pub fn config(&self) -> &VoiceConfig {
        &self.config
    }

    /// Name of the active engine
    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }
}

#[async_trait]
impl SpeechSynthesizer for SpeechService {
    async fn synthesize(
        &self,
        text: &str,
        language: &str,
        dest: &Path,
    ) -> Result<SynthesizedAudio> {
        let mut config = self.config.clone();
        if !language.is_empty() {
            config.language = language.to_string();
        }

        let audio = self.engine.synthesize(text, &config).await?;
        if audio.is_empty() {
            return Err(VoiceError::NoAudio.into());
        }

        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(dest, &audio.bytes).await?;

        info!(
            engine = self.engine.name(),
            text_len = text.len(),
            audio_size = audio.len(),
            path = %dest.display(),
            "Synthesized speech"
        );

        Ok(SynthesizedAudio {
            text: text.to_string(),
            language: config.language,
            path: dest.to_path_buf(),
            format: audio.format.extension(),
            size_bytes: audio.len(),
        })
    }

    async fn is_ready(&self) -> bool {
        let ready = self.engine.is_ready().await;
        if !ready {
            warn!(engine = self.engine.name(), "Speech engine is not configured");
        }
        ready
    }
}
