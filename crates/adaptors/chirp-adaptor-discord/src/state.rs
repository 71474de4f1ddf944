//! Voice presence tracking

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Maps (guild_id, user_id) -> voice channel_id.
///
/// Fed from `guild_create` (initial snapshot) and `voice_state_update`
/// (joins, moves, leaves). Cheap to clone; clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct VoiceStateTracker {
    states: Arc<RwLock<HashMap<(u64, u64), u64>>>,
}

impl VoiceStateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a voice state change. `None` means the user left voice.
    pub fn update(&self, guild_id: u64, user_id: u64, channel_id: Option<u64>) {
        let mut states = self.states.write().unwrap_or_else(|e| e.into_inner());
        match channel_id {
            Some(channel_id) => {
                states.insert((guild_id, user_id), channel_id);
            }
            None => {
                states.remove(&(guild_id, user_id));
            }
        }
    }

    /// Replace everything known about a guild with a fresh snapshot
    pub fn populate(
        &self,
        guild_id: u64,
        members: impl IntoIterator<Item = (u64, u64)>,
    ) -> usize {
        let mut states = self.states.write().unwrap_or_else(|e| e.into_inner());
        states.retain(|(g, _), _| *g != guild_id);
        let mut count = 0;
        for (user_id, channel_id) in members {
            states.insert((guild_id, user_id), channel_id);
            count += 1;
        }
        count
    }

    /// Voice channel the user currently occupies in the guild
    pub fn channel_of(&self, guild_id: u64, user_id: u64) -> Option<u64> {
        let states = self.states.read().unwrap_or_else(|e| e.into_inner());
        states.get(&(guild_id, user_id)).copied()
    }
}
