//! Plugin loading utilities

use crate::types::Plugin;
use crate::{ChirpError, Result};
use std::collections::HashSet;
use std::sync::Arc;

/// Validate a plugin's structure
///
/// A plugin needs a name, and the commands it exports must have distinct,
/// non-empty, whitespace-free names.
pub fn validate_plugin(plugin: &Arc<dyn Plugin>) -> Result<()> {
    let mut errors = Vec::new();

    if plugin.name().trim().is_empty() {
        errors.push("Plugin must have a name".to_string());
    }

    let mut seen = HashSet::new();
    for command in plugin.commands() {
        let name = command.name();
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            errors.push(format!("Invalid command name '{}'", name));
        } else if !seen.insert(name.to_string()) {
            errors.push(format!("Command '{}' declared twice", name));
        }
    }

    if !errors.is_empty() {
        return Err(ChirpError::plugin(format!(
            "Plugin validation failed: {}",
            errors.join(", ")
        )));
    }

    Ok(())
}

/// Outcome of loading a plugin registry
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Names of plugins whose commands were registered
    pub loaded: Vec<String>,
    /// (plugin name, reason) for each skipped plugin
    pub failed: Vec<(String, String)>,
}

impl LoadReport {
    /// True if every plugin loaded
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BotServices, Command, Invocation};
    use async_trait::async_trait;

    struct Named(&'static str);

    #[async_trait]
    impl Command for Named {
        fn name(&self) -> &str {
            self.0
        }
        fn help(&self) -> &str {
            "test"
        }
        async fn execute(&self, _invocation: Invocation, _services: BotServices) -> Result<()> {
            Ok(())
        }
    }

    struct TestPlugin {
        name: &'static str,
        commands: Vec<&'static str>,
    }

    #[async_trait]
    impl Plugin for TestPlugin {
        fn name(&self) -> &str {
            self.name
        }
        fn description(&self) -> &str {
            "Test plugin"
        }
        fn commands(&self) -> Vec<Arc<dyn Command>> {
            self.commands
                .iter()
                .map(|n| Arc::new(Named(n)) as Arc<dyn Command>)
                .collect()
        }
    }

    #[test]
    fn test_validate_plugin() {
        let plugin: Arc<dyn Plugin> = Arc::new(TestPlugin {
            name: "tts",
            commands: vec!["tts"],
        });
        assert!(validate_plugin(&plugin).is_ok());
    }

    #[test]
    fn test_empty_name_validation() {
        let plugin: Arc<dyn Plugin> = Arc::new(TestPlugin {
            name: "",
            commands: vec![],
        });
        assert!(validate_plugin(&plugin).is_err());
    }

    #[test]
    fn test_bad_command_names() {
        let plugin: Arc<dyn Plugin> = Arc::new(TestPlugin {
            name: "p",
            commands: vec!["say it", "x", "x"],
        });
        let err = validate_plugin(&plugin).unwrap_err().to_string();
        assert!(err.contains("Invalid command name 'say it'"));
        assert!(err.contains("declared twice"));
    }
}
