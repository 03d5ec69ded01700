use std::collections::BTreeMap;

use super::deprecated::Deprecation;
use crate::config::Config;

/// Immutable registry of what the current release of the wrapped tool accepts.
///
/// Built once (from configuration or with the `with_*` builders) and shared
/// read-only afterwards. Subcommand lists keep their configured order, which
/// is also the enumeration order of suggestion pools.
#[derive(Debug, Clone, Default)]
pub struct CommandDictionary {
    commands: BTreeMap<String, Vec<String>>,
    standalone: Vec<String>,
    deprecated: BTreeMap<String, Deprecation>,
}

impl CommandDictionary {
    /// An empty dictionary. Every main command is unknown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the dictionary from configuration.
    pub fn from_config(config: &Config) -> Self {
        let mut dict = Self::new();
        for (name, subs) in &config.dictionary.commands {
            dict = dict.with_command(name, subs);
        }
        for name in &config.dictionary.standalone {
            dict = dict.with_standalone(name);
        }
        for (name, entry) in &config.deprecated.renamed {
            dict = dict.with_deprecation(name, Deprecation::renamed(&entry.to, &entry.rationale));
        }
        for (name, rationale) in &config.deprecated.discontinued {
            dict = dict.with_deprecation(name, Deprecation::discontinued(rationale));
        }
        log::debug!(
            "dictionary: {} commands, {} standalone, {} deprecated",
            dict.commands.len(),
            dict.standalone.len(),
            dict.deprecated.len()
        );
        dict
    }

    /// Register a main command with its valid subcommands (deduped, order kept).
    pub fn with_command<S: AsRef<str>>(mut self, name: &str, subcommands: &[S]) -> Self {
        let entry = self.commands.entry(name.to_string()).or_default();
        for sub in subcommands {
            let sub = sub.as_ref();
            if !entry.iter().any(|s| s == sub) {
                entry.push(sub.to_string());
            }
        }
        self
    }

    /// Register a command that accepts no subcommand.
    pub fn with_standalone(mut self, name: &str) -> Self {
        if !self.standalone.iter().any(|s| s == name) {
            self.standalone.push(name.to_string());
        }
        self
    }

    /// Mark a main command as deprecated.
    pub fn with_deprecation(mut self, name: &str, deprecation: Deprecation) -> Self {
        self.deprecated.insert(name.to_string(), deprecation);
        self
    }

    /// True for regular and standalone main commands.
    pub fn is_main_command(&self, name: &str) -> bool {
        self.commands.contains_key(name) || self.is_standalone(name)
    }

    pub fn is_standalone(&self, name: &str) -> bool {
        self.standalone.iter().any(|s| s == name)
    }

    /// Valid subcommands of a regular main command.
    pub fn subcommands(&self, name: &str) -> Option<&[String]> {
        self.commands.get(name).map(Vec::as_slice)
    }

    pub fn allows_subcommand(&self, name: &str, sub: &str) -> bool {
        self.subcommands(name)
            .is_some_and(|subs| subs.iter().any(|s| s == sub))
    }

    pub fn deprecation(&self, name: &str) -> Option<&Deprecation> {
        self.deprecated.get(name)
    }

    /// Every accepted main command: regular ones in name order, then
    /// standalone ones in registration order.
    pub fn main_commands(&self) -> Vec<&str> {
        self.commands
            .keys()
            .map(String::as_str)
            .chain(
                self.standalone
                    .iter()
                    .filter(|s| !self.commands.contains_key(*s))
                    .map(String::as_str),
            )
            .collect()
    }

    /// Deprecated main commands in name order.
    pub fn deprecated(&self) -> impl Iterator<Item = (&str, &Deprecation)> {
        self.deprecated.iter().map(|(k, v)| (k.as_str(), v))
    }
}
