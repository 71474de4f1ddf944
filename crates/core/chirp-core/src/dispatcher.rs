//! Prefix command dispatch

use crate::plugin::{validate_plugin, LoadReport};
use crate::types::{BotServices, Command, IncomingMessage, Invocation, Plugin};
use crate::{ChirpError, Result};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Name of the built-in command listing
pub const HELP_COMMAND: &str = "help";

/// What happened to an incoming message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Not a command, or an unknown one
    Ignored,
    /// Built-in help was sent
    Help,
    /// Command needs text and none was given; usage was sent
    MissingArgument,
    /// Command ran to completion
    Executed,
    /// Command returned an error (already logged)
    Failed,
}

/// Resolves prefixed messages to registered commands
pub struct CommandDispatcher {
    prefix: String,
    commands: BTreeMap<String, Arc<dyn Command>>,
}

impl CommandDispatcher {
    /// Create an empty dispatcher for the given prefix
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            commands: BTreeMap::new(),
        }
    }

    /// Command prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Names of registered commands, sorted
    pub fn command_names(&self) -> Vec<&str> {
        self.commands.keys().map(String::as_str).collect()
    }

    /// Register a single command
    pub fn register(&mut self, command: Arc<dyn Command>) -> Result<()> {
        let name = command.name().to_string();
        if name == HELP_COMMAND || self.commands.contains_key(&name) {
            return Err(ChirpError::command(format!(
                "Command '{}' is already registered",
                name
            )));
        }
        self.commands.insert(name, command);
        Ok(())
    }

    /// Load plugins in order, registering their commands.
    ///
    /// A plugin that fails validation, initialization or registration is
    /// logged and skipped; none of its commands are registered.
    pub async fn load_plugins(&mut self, plugins: &[Arc<dyn Plugin>]) -> LoadReport {
        let mut report = LoadReport::default();

        for plugin in plugins {
            let name = plugin.name().to_string();
            match self.load_plugin(plugin).await {
                Ok(count) => {
                    info!(plugin = %name, commands = count, "Successfully loaded plugin: {}", name);
                    report.loaded.push(name);
                }
                Err(e) => {
                    error!(plugin = %name, error = %e, "Failed to load plugin {}: {}", name, e);
                    report.failed.push((name, e.to_string()));
                }
            }
        }

        report
    }

    async fn load_plugin(&mut self, plugin: &Arc<dyn Plugin>) -> Result<usize> {
        validate_plugin(plugin)?;
        plugin.init().await?;

        let commands = plugin.commands();
        for command in &commands {
            let name = command.name();
            if name == HELP_COMMAND || self.commands.contains_key(name) {
                return Err(ChirpError::command(format!(
                    "Command '{}' is already registered",
                    name
                )));
            }
        }
        let count = commands.len();
        for command in commands {
            self.register(command)?;
        }
        Ok(count)
    }

    /// Split `content` into command name and remaining text.
    ///
    /// Returns `None` when the prefix is missing or no name follows it
    /// directly (`! tts` is not a command).
    pub fn parse<'a>(&self, content: &'a str) -> Option<(&'a str, &'a str)> {
        let rest = content.strip_prefix(self.prefix.as_str())?;
        let (name, text) = match rest.find(char::is_whitespace) {
            Some(idx) => (&rest[..idx], rest[idx..].trim()),
            None => (rest, ""),
        };
        if name.is_empty() {
            return None;
        }
        Some((name, text))
    }

    /// Resolve and run the command in `message`
    pub async fn dispatch(
        &self,
        message: &IncomingMessage,
        services: &BotServices,
    ) -> DispatchOutcome {
        let Some((name, text)) = self.parse(&message.content) else {
            return DispatchOutcome::Ignored;
        };

        if name == HELP_COMMAND {
            self.reply(services, message.channel_id, &self.help_text()).await;
            return DispatchOutcome::Help;
        }

        let Some(command) = self.commands.get(name).cloned() else {
            debug!(command = %name, "Unknown command");
            return DispatchOutcome::Ignored;
        };

        if command.requires_text() && text.is_empty() {
            let usage = format!("Missing text. Usage: `{}{}`", self.prefix, command.usage());
            self.reply(services, message.channel_id, &usage).await;
            return DispatchOutcome::MissingArgument;
        }

        let invocation = Invocation::from_message(message, name, text);
        info!(
            command = %name,
            invocation_id = %invocation.id,
            user = %invocation.user_name,
            guild_id = ?invocation.guild_id,
            "Dispatching command"
        );

        match command.execute(invocation, services.clone()).await {
            Ok(()) => DispatchOutcome::Executed,
            Err(e) => {
                error!(command = %name, kind = e.kind(), error = %e, "Command failed");
                DispatchOutcome::Failed
            }
        }
    }

    /// Text of the built-in help command
    pub fn help_text(&self) -> String {
        let mut lines = vec!["Commands:".to_string()];
        for command in self.commands.values() {
            lines.push(format!("`{}{}` - {}", self.prefix, command.usage(), command.help()));
        }
        lines.push(format!("`{}{}` - Shows this message.", self.prefix, HELP_COMMAND));
        lines.join("\n")
    }

    async fn reply(&self, services: &BotServices, channel_id: u64, text: &str) {
        if let Err(e) = services.messenger.send_message(channel_id, text).await {
            warn!(channel_id, error = %e, "Failed to send reply");
        }
    }
}
