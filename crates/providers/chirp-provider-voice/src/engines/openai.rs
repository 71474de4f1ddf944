//! OpenAI TTS Engine
//!
//! `POST /v1/audio/speech` with `tts-1` (low latency) unless the config
//! names another model such as `tts-1-hd`. Needs an API key, either passed
//! in or read from `OPENAI_API_KEY` at request time.

use async_trait::async_trait;
use chirp_core::Result;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::sync::OnceLock;
use std::time::Duration;

use crate::types::*;

const SPEECH_URL: &str = "https://api.openai.com/v1/audio/speech";

/// Used unless [`OpenAIOptions::model`] names another
const DEFAULT_MODEL: &str = "tts-1";

/// Voices accepted by the speech endpoint
pub const OPENAI_VOICES: &[&str] = &["alloy", "echo", "fable", "onyx", "nova", "shimmer"];

static HTTP_CLIENT: OnceLock<Client> = OnceLock::new();

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    speed: Option<f32>,
}

pub struct OpenAIVoiceEngine {
    api_key: Option<String>,
}

impl OpenAIVoiceEngine {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key }
    }

    fn client() -> &'static Client {
        HTTP_CLIENT.get_or_init(|| {
            Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .unwrap_or_else(|_| Client::new())
        })
    }

    fn api_key(&self) -> std::result::Result<String, VoiceError> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| VoiceError::NotConfigured("OPENAI_API_KEY is not set".to_string()))
    }

    fn request<'a>(
        &'a self,
        text: &'a str,
        config: &'a VoiceConfig,
    ) -> std::result::Result<SpeechRequest<'a>, VoiceError> {
        if text.trim().is_empty() {
            return Err(VoiceError::EmptyText);
        }
        let length = text.chars().count();
        if length > self.max_text_length() {
            return Err(VoiceError::TooLong {
                length,
                max: self.max_text_length(),
            });
        }

        let options = &config.openai;
        // The endpoint's default speed is 1.0; leave it out unless changed
        let speed = (options.speed - 1.0).abs() > f32::EPSILON;
        Ok(SpeechRequest {
            model: options.model.as_deref().unwrap_or(DEFAULT_MODEL),
            input: text,
            voice: &options.voice,
            response_format: config.format.extension(),
            speed: speed.then(|| options.speed.clamp(0.25, 4.0)),
        })
    }
}

#[async_trait]
impl VoiceEngine for OpenAIVoiceEngine {
    fn name(&self) -> &str {
        "openai"
    }

    async fn synthesize(&self, text: &str, config: &VoiceConfig) -> Result<AudioData> {
        let request = self.request(text, config)?;
        let api_key = self.api_key()?;

        tracing::debug!(
            model = request.model,
            voice = request.voice,
            text_len = text.len(),
            "OpenAI TTS request"
        );

        let response = Self::client()
            .post(SPEECH_URL)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(VoiceError::from)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let err = match status {
                StatusCode::UNAUTHORIZED => VoiceError::Unauthorized(detail),
                StatusCode::TOO_MANY_REQUESTS => VoiceError::RateLimited(detail),
                _ => VoiceError::Rejected {
                    status: status.as_u16(),
                    detail,
                },
            };
            return Err(err.into());
        }

        let bytes = response.bytes().await.map_err(VoiceError::from)?;
        Ok(AudioData::new(bytes, config.format))
    }

    async fn is_ready(&self) -> bool {
        self.api_key().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> OpenAIVoiceEngine {
        OpenAIVoiceEngine::new(Some("sk-test".into()))
    }

    #[test]
    fn test_request_body() {
        let engine = engine();
        let mut config = VoiceConfig::default();
        config.openai.voice = "nova".into();

        let request = engine.request("hello", &config).unwrap();
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "tts-1");
        assert_eq!(json["voice"], "nova");
        assert_eq!(json["response_format"], "mp3");
        assert!(json.get("speed").is_none(), "default speed is omitted");
    }

    #[test]
    fn test_model_and_speed_clamp() {
        let engine = engine();
        let mut config = VoiceConfig::default();
        config.openai.model = Some("tts-1-hd".into());
        config.openai.speed = 9.0;

        let request = engine.request("hello", &config).unwrap();
        assert_eq!(request.model, "tts-1-hd");
        assert_eq!(request.speed, Some(4.0));
    }

    #[test]
    fn test_rejects_bad_text() {
        let engine = engine();
        let config = VoiceConfig::default();

        assert!(matches!(
            engine.request(" ", &config),
            Err(VoiceError::EmptyText)
        ));
        assert!(matches!(
            engine.request(&"a".repeat(5000), &config),
            Err(VoiceError::TooLong { length: 5000, max: 4096 })
        ));
    }

    #[tokio::test]
    async fn test_explicit_key_is_ready() {
        assert!(engine().is_ready().await);
    }
}
