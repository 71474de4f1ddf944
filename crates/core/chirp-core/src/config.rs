//! Configuration management and environment variable loading

use crate::{ChirpError, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable holding the Discord bot token
pub const TOKEN_VAR: &str = "TOKEN";

/// Default command prefix
pub const DEFAULT_PREFIX: &str = "!";

/// Load environment variables from .env file
///
/// Looks in the current directory and its parents. Returns the file that was
/// read, or `None` when there is none and the process falls back to the
/// system environment. Nothing is logged here since this usually runs before
/// the subscriber is installed.
///
/// # Example
///
/// ```no_run
/// use chirp_core::load_env;
///
/// load_env().ok();
/// let token = std::env::var("TOKEN").unwrap_or_default();
/// ```
pub fn load_env() -> Result<Option<PathBuf>> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(dotenvy::Error::LineParse(line, pos)) => Err(ChirpError::config(format!(
            "Failed to parse .env file at line {}, position {}",
            line, pos
        ))),
        Err(dotenvy::Error::Io(_)) => Ok(None),
        Err(e) => Err(ChirpError::config(format!(
            "Failed to load .env file: {}",
            e
        ))),
    }
}

/// Load environment variables from a specific file
pub fn load_env_from_path<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let path = path.as_ref();
    dotenvy::from_path(path)
        .map(|_| path.to_path_buf())
        .map_err(|e| {
            ChirpError::config(format!(
                "Failed to load {} environment file: {}",
                path.display(),
                e
            ))
        })
}

/// Get an environment variable; blank values count as unset
pub fn get_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get required environment variable
///
/// Returns an error if the variable is not set or is blank
pub fn get_required_env(key: &str) -> Result<String> {
    get_env(key).ok_or_else(|| {
        ChirpError::config(format!(
            "Required environment variable '{}' is not set. \
             Check your .env file or system environment.",
            key
        ))
    })
}

/// Get optional environment variable with default
pub fn get_env_or(key: &str, default: &str) -> String {
    get_env(key).unwrap_or_else(|| default.to_string())
}

/// Get environment variable as boolean
pub fn get_env_bool(key: &str, default: bool) -> bool {
    get_env(key).and_then(|v| parse_bool(&v)).unwrap_or(default)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Which text-to-speech backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtsEngineKind {
    /// Google Translate TTS (no API key required)
    Google,
    /// OpenAI audio/speech API
    OpenAI,
}

impl TtsEngineKind {
    /// Parse an engine name; unknown names yield `None`
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "google" | "gtts" => Some(Self::Google),
            "openai" => Some(Self::OpenAI),
            _ => None,
        }
    }

    /// Engine name as string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::OpenAI => "openai",
        }
    }
}

/// Text-to-speech settings
#[derive(Debug, Clone)]
pub struct TtsSettings {
    pub engine: TtsEngineKind,
    /// Language code passed to the synthesizer
    pub language: String,
    /// Google top-level domain (accent), e.g. "com", "co.uk"
    pub tld: String,
    /// Slower speech (Google only)
    pub slow: bool,
    /// Voice id (OpenAI only)
    pub voice: String,
    /// Model override, e.g. "tts-1-hd" (OpenAI only)
    pub model: Option<String>,
    pub openai_api_key: Option<String>,
    /// Directory for per-invocation audio files
    pub scratch_dir: PathBuf,
}

impl Default for TtsSettings {
    fn default() -> Self {
        Self {
            engine: TtsEngineKind::Google,
            language: "en".to_string(),
            tld: "com".to_string(),
            slow: false,
            voice: "alloy".to_string(),
            model: None,
            openai_api_key: None,
            scratch_dir: env::temp_dir(),
        }
    }
}

/// Settings needed to start the bot
#[derive(Debug, Clone)]
pub struct BotSettings {
    pub token: String,
    pub prefix: String,
    pub tts: TtsSettings,
}

impl BotSettings {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self> {
        let token = get_required_env(TOKEN_VAR)
            .map_err(|_| ChirpError::config("TOKEN not found. Please check your .env file."))?;

        let defaults = TtsSettings::default();
        let engine_name = get_env_or("CHIRP_TTS_ENGINE", defaults.engine.as_str());
        let engine = TtsEngineKind::parse(&engine_name).ok_or_else(|| {
            ChirpError::config(format!(
                "Unknown CHIRP_TTS_ENGINE '{}' (expected 'google' or 'openai')",
                engine_name
            ))
        })?;

        let tts = TtsSettings {
            engine,
            language: get_env_or("CHIRP_TTS_LANGUAGE", &defaults.language),
            tld: get_env_or("CHIRP_TTS_TLD", &defaults.tld),
            slow: get_env_bool("CHIRP_TTS_SLOW", defaults.slow),
            voice: get_env_or("CHIRP_TTS_VOICE", &defaults.voice),
            model: get_env("CHIRP_TTS_MODEL"),
            openai_api_key: get_env("OPENAI_API_KEY"),
            scratch_dir: get_env("CHIRP_SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.scratch_dir),
        };

        Ok(Self {
            token: token.trim().to_string(),
            prefix: get_env_or("CHIRP_PREFIX", DEFAULT_PREFIX),
            tts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Settings tests share fixed variable names like TOKEN
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const SETTINGS_VARS: &[&str] = &[
        "TOKEN",
        "CHIRP_PREFIX",
        "CHIRP_TTS_ENGINE",
        "CHIRP_TTS_LANGUAGE",
        "CHIRP_TTS_TLD",
        "CHIRP_TTS_SLOW",
        "CHIRP_TTS_VOICE",
        "CHIRP_TTS_MODEL",
        "OPENAI_API_KEY",
        "CHIRP_SCRATCH_DIR",
    ];

    fn settings_with(pairs: &[(&str, &str)]) -> Result<BotSettings> {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        for key in SETTINGS_VARS {
            env::remove_var(key);
        }
        for (key, value) in pairs {
            env::set_var(key, value);
        }
        let settings = BotSettings::from_env();
        for key in SETTINGS_VARS {
            env::remove_var(key);
        }
        settings
    }

    #[test]
    fn test_get_env_bool() {
        env::set_var("CHIRP_TEST_BOOL_TRUE", "true");
        env::set_var("CHIRP_TEST_BOOL_0", "0");
        env::set_var("CHIRP_TEST_BOOL_JUNK", "maybe");

        assert!(get_env_bool("CHIRP_TEST_BOOL_TRUE", false));
        assert!(!get_env_bool("CHIRP_TEST_BOOL_0", true));
        assert!(get_env_bool("CHIRP_TEST_BOOL_JUNK", true));
        assert!(get_env_bool("CHIRP_TEST_NONEXISTENT", true));

        env::remove_var("CHIRP_TEST_BOOL_TRUE");
        env::remove_var("CHIRP_TEST_BOOL_0");
        env::remove_var("CHIRP_TEST_BOOL_JUNK");
    }

    #[test]
    fn test_get_env_or() {
        env::set_var("CHIRP_TEST_STRING", "hello");
        env::set_var("CHIRP_TEST_BLANK", "  ");
        assert_eq!(get_env_or("CHIRP_TEST_STRING", "default"), "hello");
        assert_eq!(get_env_or("CHIRP_TEST_BLANK", "default"), "default");
        assert_eq!(get_env_or("CHIRP_TEST_NONEXISTENT", "default"), "default");
        assert!(get_required_env("CHIRP_TEST_BLANK").is_err());
        env::remove_var("CHIRP_TEST_STRING");
        env::remove_var("CHIRP_TEST_BLANK");
    }

    #[test]
    fn test_load_env_from_path() {
        let path = env::temp_dir().join(format!("chirp-test-{}.env", std::process::id()));
        std::fs::write(&path, "CHIRP_TEST_FROM_FILE=loaded\n").unwrap();

        let loaded = load_env_from_path(&path).unwrap();
        assert_eq!(loaded, path);
        assert_eq!(get_env_or("CHIRP_TEST_FROM_FILE", ""), "loaded");

        std::fs::remove_file(&path).unwrap();
        env::remove_var("CHIRP_TEST_FROM_FILE");

        let err = load_env_from_path(&path).unwrap_err();
        assert!(matches!(err, ChirpError::Config(_)));
    }

    #[test]
    fn test_missing_token_is_config_error() {
        let err = settings_with(&[]).unwrap_err();
        assert!(matches!(err, ChirpError::Config(_)));
        assert!(err.to_string().contains("TOKEN not found"));

        let err = settings_with(&[("TOKEN", "   ")]).unwrap_err();
        assert!(matches!(err, ChirpError::Config(_)));
    }

    #[test]
    fn test_defaults() {
        let settings = settings_with(&[("TOKEN", "abc")]).unwrap();
        assert_eq!(settings.token, "abc");
        assert_eq!(settings.prefix, "!");
        assert_eq!(settings.tts.engine, TtsEngineKind::Google);
        assert_eq!(settings.tts.language, "en");
        assert_eq!(settings.tts.tld, "com");
        assert!(!settings.tts.slow);
        assert!(settings.tts.model.is_none());
        assert!(settings.tts.openai_api_key.is_none());
    }

    #[test]
    fn test_overrides() {
        let settings = settings_with(&[
            ("TOKEN", "abc"),
            ("CHIRP_PREFIX", "?"),
            ("CHIRP_TTS_ENGINE", "OpenAI"),
            ("CHIRP_TTS_VOICE", "nova"),
            ("CHIRP_TTS_MODEL", "tts-1-hd"),
            ("CHIRP_TTS_SLOW", "yes"),
            ("CHIRP_SCRATCH_DIR", "/var/tmp/chirp"),
        ])
        .unwrap();
        assert_eq!(settings.prefix, "?");
        assert_eq!(settings.tts.engine, TtsEngineKind::OpenAI);
        assert_eq!(settings.tts.voice, "nova");
        assert_eq!(settings.tts.model.as_deref(), Some("tts-1-hd"));
        assert!(settings.tts.slow);
        assert_eq!(settings.tts.scratch_dir, PathBuf::from("/var/tmp/chirp"));
    }

    #[test]
    fn test_unknown_engine_rejected() {
        let err = settings_with(&[("TOKEN", "abc"), ("CHIRP_TTS_ENGINE", "festival")]).unwrap_err();
        assert!(err.to_string().contains("festival"));
    }
}
