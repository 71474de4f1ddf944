//! Google Translate TTS Engine
//!
//! Uses the public `translate_tts` endpoint, the same service the `gTTS`
//! tool talks to. No API key is needed, but the endpoint only accepts short
//! inputs, so text is split into chunks of at most [`MAX_CHUNK_CHARS`]
//! characters and the returned MP3 segments are concatenated. MP3 frames
//! are self-delimiting, so the joined bytes play back as one stream.
//!
//! The top-level domain picks the regional accent (`com`, `co.uk`, `com.au`, ...).

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use chirp_core::Result;
use reqwest::{Client, StatusCode};
use std::sync::OnceLock;

use crate::types::*;

/// Longest chunk the endpoint accepts
pub const MAX_CHUNK_CHARS: usize = 100;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Shared HTTP client for connection pooling
static HTTP_CLIENT: OnceLock<Client> = OnceLock::new();

/// Google Translate voice engine
pub struct GoogleTranslateEngine;

impl GoogleTranslateEngine {
    /// Create new Google Translate voice engine
    pub fn new() -> Self {
        Self
    }

    fn client() -> &'static Client {
        HTTP_CLIENT.get_or_init(|| {
            Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_else(|_| Client::new())
        })
    }

    /// Endpoint for a top-level domain
    pub fn endpoint(tld: &str) -> String {
        format!(
            "https://translate.google.{}/translate_tts",
            tld.trim().trim_start_matches('.')
        )
    }

    async fn fetch_chunk(
        &self,
        chunk: &str,
        index: usize,
        total: usize,
        config: &VoiceConfig,
    ) -> std::result::Result<Bytes, VoiceError> {
        let google = &config.google;
        let speed = if google.slow { "0.3" } else { "1" };
        let total_str = total.to_string();
        let index_str = index.to_string();
        let len_str = chunk.chars().count().to_string();
        let params = [
            ("ie", "UTF-8"),
            ("q", chunk),
            ("tl", config.language.as_str()),
            ("ttsspeed", speed),
            ("total", total_str.as_str()),
            ("idx", index_str.as_str()),
            ("textlen", len_str.as_str()),
            ("client", "tw-ob"),
        ];

        let response = Self::client()
            .get(Self::endpoint(&google.tld))
            .header("Referer", format!("https://translate.google.{}/", google.tld))
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(VoiceError::RateLimited(format!(
                "chunk {}/{}",
                index + 1,
                total
            )));
        }
        if !status.is_success() {
            return Err(VoiceError::Rejected {
                status: status.as_u16(),
                detail: format!("chunk {}/{}", index + 1, total),
            });
        }

        Ok(response.bytes().await?)
    }
}

impl Default for GoogleTranslateEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VoiceEngine for GoogleTranslateEngine {
    fn name(&self) -> &str {
        "google"
    }

    async fn synthesize(&self, text: &str, config: &VoiceConfig) -> Result<AudioData> {
        let length = text.chars().count();
        if length > self.max_text_length() {
            return Err(VoiceError::TooLong {
                length,
                max: self.max_text_length(),
            }
            .into());
        }

        let chunks = split_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(VoiceError::EmptyText.into());
        }

        tracing::debug!(
            language = %config.language,
            tld = %config.google.tld,
            chunks = chunks.len(),
            text_len = length,
            "Google TTS request"
        );

        let total = chunks.len();
        let mut audio = BytesMut::new();
        for (index, chunk) in chunks.iter().enumerate() {
            let bytes = self.fetch_chunk(chunk, index, total, config).await?;
            audio.extend_from_slice(&bytes);
        }

        if audio.is_empty() {
            return Err(VoiceError::NoAudio.into());
        }
        Ok(AudioData::new(audio.freeze(), AudioFormat::Mp3))
    }

    async fn is_ready(&self) -> bool {
        true
    }
}

fn is_break(c: char) -> bool {
    matches!(
        c,
        '.' | '!' | '?' | ',' | ';' | ':' | '\n' | '…' | '。' | '，' | '、' | '！' | '？' | '¡' | '¿'
    )
}

/// Split at punctuation followed by whitespace (or end of text), so "3.14"
/// stays whole. Pieces made only of punctuation are dropped.
fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut iter = text.char_indices().peekable();

    while let Some((i, c)) = iter.next() {
        if !is_break(c) {
            continue;
        }
        let at_boundary = c == '\n' || iter.peek().map_or(true, |(_, next)| next.is_whitespace());
        if at_boundary {
            let end = i + c.len_utf8();
            out.push(&text[start..end]);
            start = end;
        }
    }
    if start < text.len() {
        out.push(&text[start..]);
    }

    out.into_iter()
        .map(str::trim)
        .filter(|s| !s.chars().all(|c| is_break(c) || c.is_whitespace()))
        .collect()
}

fn hard_split(word: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    chars
        .chunks(max_chars)
        .map(|c| c.iter().collect())
        .collect()
}

/// Split text into chunks of at most `max_chars` characters.
///
/// Sentence boundaries are preferred, then word boundaries; a single word
/// longer than the limit is cut mid-word. Short sentences are packed
/// together so that short inputs become a single request.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);

    let mut pieces: Vec<String> = Vec::new();
    for sentence in sentences(text) {
        if sentence.chars().count() <= max_chars {
            pieces.push(sentence.split_whitespace().collect::<Vec<_>>().join(" "));
            continue;
        }
        for word in sentence.split_whitespace() {
            if word.chars().count() <= max_chars {
                pieces.push(word.to_string());
            } else {
                pieces.extend(hard_split(word, max_chars));
            }
        }
    }

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    for piece in pieces {
        let piece_len = piece.chars().count();
        if current.is_empty() {
            current = piece;
            current_len = piece_len;
        } else if current_len + 1 + piece_len <= max_chars {
            current.push(' ');
            current.push_str(&piece);
            current_len += 1 + piece_len;
        } else {
            chunks.push(std::mem::take(&mut current));
            current = piece;
            current_len = piece_len;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
