use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config.default.toml");

/// Errors reading an explicit configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

// ── Final (merged) config types ──

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub dictionary: DictionaryConfig,
    #[serde(default)]
    pub deprecated: DeprecatedConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub suggest: SuggestConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Settings {
    /// Leading word identifying an invocation of the wrapped tool.
    #[serde(default)]
    pub keyword: String,
    /// Comment prefix appended to rewritten lines.
    #[serde(default)]
    pub marker: String,
    /// Generated-file header written above migrated scripts.
    #[serde(default)]
    pub header: String,
    /// Base URL for rule reference links.
    #[serde(default)]
    pub reference_url: String,
    /// Worker threads for script processing (0 = available parallelism).
    #[serde(default)]
    pub jobs: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DictionaryConfig {
    /// Commands that accept no subcommand.
    #[serde(default)]
    pub standalone: Vec<String>,
    /// Main command → valid subcommands.
    #[serde(default)]
    pub commands: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RenamedEntry {
    pub to: String,
    #[serde(default)]
    pub rationale: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DeprecatedConfig {
    /// Old main command → replacement.
    #[serde(default)]
    pub renamed: BTreeMap<String, RenamedEntry>,
    /// Retired main command → rationale.
    #[serde(default)]
    pub discontinued: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RulesConfig {
    #[serde(default)]
    pub output_format: OutputFormatConfig,
    #[serde(default)]
    pub selector: SelectorConfig,
    /// Alias → canonical main command.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
    #[serde(default)]
    pub spacing: SpacingConfig,
    /// User-defined rules, applied after the built-in ones in file order.
    #[serde(default)]
    pub custom: Vec<CustomRuleConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct OutputFormatConfig {
    #[serde(default)]
    pub options: Vec<String>,
    /// Legacy value → current value.
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct SelectorConfig {
    /// Option name; empty disables the rule.
    #[serde(default)]
    pub option: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct SpacingConfig {
    #[serde(default)]
    pub options: Vec<String>,
}

/// A user rule: a regex and a replacement template (`$1`, `${name}`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CustomRuleConfig {
    pub name: String,
    pub pattern: String,
    pub replacement: String,
    #[serde(default)]
    pub rationale: String,
    #[serde(default)]
    pub reference_url: String,
    /// Only rewrite invocations of the wrapped tool.
    #[serde(default = "default_true")]
    pub invocation_only: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct SuggestConfig {
    /// Maximum suggestions per unrecognized word.
    #[serde(default)]
    pub max: usize,
    /// Known misspelling → intended candidate.
    #[serde(default)]
    pub typos: BTreeMap<String, String>,
}

// ── Overlay types (user config that merges with defaults) ──

#[derive(Debug, Deserialize, Default)]
struct ConfigOverlay {
    #[serde(default)]
    settings: SettingsOverlay,
    #[serde(default)]
    dictionary: DictionaryOverlay,
    #[serde(default)]
    deprecated: DeprecatedOverlay,
    #[serde(default)]
    rules: RulesOverlay,
    #[serde(default)]
    suggest: SuggestOverlay,
}

#[derive(Debug, Deserialize, Default)]
struct SettingsOverlay {
    keyword: Option<String>,
    marker: Option<String>,
    header: Option<String>,
    reference_url: Option<String>,
    jobs: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
struct DictionaryOverlay {
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    standalone: Vec<String>,
    #[serde(default)]
    remove_standalone: Vec<String>,
    #[serde(default)]
    commands: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    remove_commands: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
struct DeprecatedOverlay {
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    renamed: BTreeMap<String, RenamedEntry>,
    #[serde(default)]
    discontinued: BTreeMap<String, String>,
    #[serde(default)]
    remove_renamed: Vec<String>,
    #[serde(default)]
    remove_discontinued: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
struct RulesOverlay {
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    output_format: OutputFormatOverlay,
    #[serde(default)]
    selector: SelectorOverlay,
    #[serde(default)]
    aliases: BTreeMap<String, String>,
    #[serde(default)]
    remove_aliases: Vec<String>,
    #[serde(default)]
    spacing: SpacingOverlay,
    #[serde(default)]
    custom: Vec<CustomRuleConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct OutputFormatOverlay {
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default)]
    remove_options: Vec<String>,
    #[serde(default)]
    values: BTreeMap<String, String>,
    #[serde(default)]
    remove_values: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
struct SelectorOverlay {
    option: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct SpacingOverlay {
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default)]
    remove_options: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
struct SuggestOverlay {
    max: Option<usize>,
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    typos: BTreeMap<String, String>,
    #[serde(default)]
    remove_typos: Vec<String>,
}

// ── Merge logic ──

/// Merge a user list into a default list.
/// In replace mode: user list replaces default entirely.
/// In merge mode: remove items first, then extend with additions (deduped).
fn merge_list(base: &mut Vec<String>, add: Vec<String>, remove: &[String], replace: bool) {
    if replace {
        *base = add;
    } else {
        base.retain(|item| !remove.contains(item));
        for item in add {
            if !base.contains(&item) {
                base.push(item);
            }
        }
    }
}

/// Merge a user map into a default map. Overlay values win per key.
fn merge_map<V>(
    base: &mut BTreeMap<String, V>,
    add: BTreeMap<String, V>,
    remove: &[String],
    replace: bool,
) {
    if replace {
        *base = add;
    } else {
        base.retain(|key, _| !remove.contains(key));
        base.extend(add);
    }
}

impl Config {
    /// Load the default embedded configuration.
    pub fn default_config() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("embedded default config must parse")
    }

    /// Load configuration with resolution order:
    /// 1. Start with embedded defaults
    /// 2. Merge user overlay from ~/.config/tool-migrate/config.toml (if exists)
    ///
    /// A malformed user overlay is logged and ignored.
    pub fn load() -> Self {
        let mut config = Self::default_config();
        if let Some(overlay) = Self::load_user_overlay() {
            config.apply_overlay(overlay);
        }
        config
    }

    /// Load defaults merged with an explicit overlay file. A leading `~` in
    /// the path is expanded.
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let expanded = shellexpand::tilde(path);
        let path = Path::new(expanded.as_ref());
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let overlay: ConfigOverlay = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::default_config();
        config.apply_overlay(overlay);
        log::debug!("loaded config overlay from {}", path.display());
        Ok(config)
    }

    /// Try to load user overlay from ~/.config/tool-migrate/config.toml.
    fn load_user_overlay() -> Option<ConfigOverlay> {
        let home = std::env::var_os("HOME")?;
        let path = Path::new(&home).join(".config/tool-migrate/config.toml");
        let content = std::fs::read_to_string(&path).ok()?;
        match toml::from_str(&content) {
            Ok(overlay) => Some(overlay),
            Err(e) => {
                log::warn!("ignoring {}: {e}", path.display());
                None
            }
        }
    }

    /// Serialize the merged configuration (for `--dump-config`).
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Apply an overlay on top of this config (merge semantics).
    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        // Settings: scalar overrides
        let s = overlay.settings;
        if let Some(v) = s.keyword {
            self.settings.keyword = v;
        }
        if let Some(v) = s.marker {
            self.settings.marker = v;
        }
        if let Some(v) = s.header {
            self.settings.header = v;
        }
        if let Some(v) = s.reference_url {
            self.settings.reference_url = v;
        }
        if let Some(v) = s.jobs {
            self.settings.jobs = v;
        }

        // Dictionary: subcommand lists of an existing command extend
        let d = overlay.dictionary;
        merge_list(
            &mut self.dictionary.standalone,
            d.standalone,
            &d.remove_standalone,
            d.replace,
        );
        if d.replace {
            self.dictionary.commands = d.commands;
        } else {
            self.dictionary
                .commands
                .retain(|name, _| !d.remove_commands.contains(name));
            for (name, subs) in d.commands {
                let entry = self.dictionary.commands.entry(name).or_default();
                merge_list(entry, subs, &[], false);
            }
        }

        // Deprecated
        let dep = overlay.deprecated;
        merge_map(
            &mut self.deprecated.renamed,
            dep.renamed,
            &dep.remove_renamed,
            dep.replace,
        );
        merge_map(
            &mut self.deprecated.discontinued,
            dep.discontinued,
            &dep.remove_discontinued,
            dep.replace,
        );

        // Rules
        let r = overlay.rules;
        let of = r.output_format;
        merge_list(
            &mut self.rules.output_format.options,
            of.options,
            &of.remove_options,
            of.replace,
        );
        merge_map(
            &mut self.rules.output_format.values,
            of.values,
            &of.remove_values,
            of.replace,
        );
        if let Some(v) = r.selector.option {
            self.rules.selector.option = v;
        }
        merge_map(&mut self.rules.aliases, r.aliases, &r.remove_aliases, r.replace);
        merge_list(
            &mut self.rules.spacing.options,
            r.spacing.options,
            &r.spacing.remove_options,
            r.spacing.replace,
        );
        if r.replace {
            self.rules.custom = r.custom;
        } else {
            self.rules.custom.extend(r.custom);
        }

        // Suggest
        let sg = overlay.suggest;
        if let Some(v) = sg.max {
            self.suggest.max = v;
        }
        merge_map(&mut self.suggest.typos, sg.typos, &sg.remove_typos, sg.replace);
    }

    /// Apply an overlay from a TOML string. Used for testing.
    #[cfg(test)]
    pub(crate) fn apply_overlay_str(&mut self, toml_str: &str) {
        let overlay: ConfigOverlay = toml::from_str(toml_str).unwrap();
        self.apply_overlay(overlay);
    }
}
