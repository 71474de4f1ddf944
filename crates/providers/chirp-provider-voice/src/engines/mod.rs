//! Voice engine implementations (TTS)

pub mod google;
pub mod openai;

pub use google::{split_text, GoogleTranslateEngine};
pub use openai::OpenAIVoiceEngine;
