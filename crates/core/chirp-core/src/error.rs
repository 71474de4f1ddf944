//! Error types for Chirp core

use thiserror::Error;

/// Main error type for Chirp operations
#[derive(Debug, Error)]
pub enum ChirpError {
    /// Invoker does not satisfy a command precondition (e.g. not in a voice channel)
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Voice channel could not be joined or left
    #[error("Voice connection error: {0}")]
    Connection(String),

    /// Text-to-speech request failed
    #[error("Synthesis error: {0}")]
    Synthesis(String),

    /// Audio could not be decoded or streamed
    #[error("Playback error: {0}")]
    Playback(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Plugin-related error
    #[error("Plugin error: {0}")]
    Plugin(String),

    /// Command registration or execution error
    #[error("Command error: {0}")]
    Command(String),

    /// Service error
    #[error("Service error: {0}")]
    Service(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network/HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Convenient Result type using ChirpError
pub type Result<T> = std::result::Result<T, ChirpError>;

impl ChirpError {
    /// Create a precondition error
    pub fn precondition(msg: impl Into<String>) -> Self {
        ChirpError::Precondition(msg.into())
    }

    /// Create a voice connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        ChirpError::Connection(msg.into())
    }

    /// Create a synthesis error
    pub fn synthesis(msg: impl Into<String>) -> Self {
        ChirpError::Synthesis(msg.into())
    }

    /// Create a playback error
    pub fn playback(msg: impl Into<String>) -> Self {
        ChirpError::Playback(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        ChirpError::Config(msg.into())
    }

    /// Create a plugin error
    pub fn plugin(msg: impl Into<String>) -> Self {
        ChirpError::Plugin(msg.into())
    }

    /// Create a command error
    pub fn command(msg: impl Into<String>) -> Self {
        ChirpError::Command(msg.into())
    }

    /// Create a service error
    pub fn service(msg: impl Into<String>) -> Self {
        ChirpError::Service(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        ChirpError::Other(msg.into())
    }

    /// Short label for structured log fields
    pub fn kind(&self) -> &'static str {
        match self {
            ChirpError::Precondition(_) => "precondition",
            ChirpError::Connection(_) => "connection",
            ChirpError::Synthesis(_) => "synthesis",
            ChirpError::Playback(_) => "playback",
            ChirpError::Config(_) => "config",
            ChirpError::Plugin(_) => "plugin",
            ChirpError::Command(_) => "command",
            ChirpError::Service(_) => "service",
            ChirpError::Io(_) => "io",
            ChirpError::Network(_) => "network",
            ChirpError::Serialization(_) => "serialization",
            ChirpError::Other(_) => "other",
        }
    }
}
