//! Per-invocation audio file location

use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Where one invocation's synthesized audio lives.
///
/// Keyed by guild and invocation id so concurrent invocations never share
/// a file. Nothing is created on construction.
#[derive(Debug, Clone)]
pub struct ScratchAudio {
    path: PathBuf,
}

impl ScratchAudio {
    pub fn new(dir: &Path, guild_id: u64, invocation_id: Uuid) -> Self {
        Self {
            path: dir.join(format!("chirp-tts-{}-{}.mp3", guild_id, invocation_id)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file. Returns `Ok(false)` if it was never created.
    pub async fn remove(&self) -> io::Result<bool> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}
