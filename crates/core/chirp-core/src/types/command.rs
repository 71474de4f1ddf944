//! Command and plugin traits

use super::messaging::{BotServices, Invocation};
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// A text command such as `!tts <text>`
#[async_trait]
pub trait Command: Send + Sync {
    /// Command name as typed after the prefix (unique)
    fn name(&self) -> &str;

    /// One-line description shown by `help`
    fn help(&self) -> &str;

    /// Usage string without the prefix, e.g. `tts <text>`
    fn usage(&self) -> String {
        self.name().to_string()
    }

    /// Whether the command needs free-form text after its name
    fn requires_text(&self) -> bool {
        true
    }

    /// Run the command for one invocation
    async fn execute(&self, invocation: Invocation, services: BotServices) -> Result<()>;
}

/// Plugin trait: a named bundle of commands
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Plugin name (unique identifier)
    fn name(&self) -> &str;

    /// Plugin description
    fn description(&self) -> &str;

    /// Initialize plugin before its commands are registered
    async fn init(&self) -> Result<()> {
        Ok(())
    }

    /// Commands provided by this plugin
    fn commands(&self) -> Vec<Arc<dyn Command>> {
        vec![]
    }
}
