//! Chirp core
//!
//! Shared types for the Chirp text-to-speech bot: the error type, settings
//! and logging, the collaborator traits every platform adaptor implements
//! (`MessageSink`, `VoiceGateway`, `SpeechSynthesizer`), and the plugin /
//! prefix-command machinery.

#![warn(clippy::all)]

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod plugin;
pub mod types;
pub mod utils;

pub use config::{
    get_env, get_env_bool, get_env_or, get_required_env, load_env, load_env_from_path, BotSettings,
    TtsEngineKind, TtsSettings,
};
pub use dispatcher::{CommandDispatcher, DispatchOutcome};
pub use error::{ChirpError, Result};
pub use plugin::{validate_plugin, LoadReport};
pub use types::*;
pub use utils::init_logging;
