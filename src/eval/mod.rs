pub mod classification;

pub use classification::{Classification, Validation};

use crate::commands::CommandDictionary;
use crate::config::Config;
use crate::parse::{self, ParseError, ParsedCommand};
use crate::suggest::{SimilarityResult, Suggester};

/// Default cap on suggestions per unrecognized word.
pub const DEFAULT_MAX_SUGGESTIONS: usize = 3;

/// Classifies parsed invocations against a [`CommandDictionary`] and offers
/// corrections for unrecognized words.
///
/// Holds only immutable data; share it freely across threads.
pub struct Validator {
    keyword: String,
    dictionary: CommandDictionary,
    suggester: Suggester,
    max_suggestions: usize,
}

impl Validator {
    pub fn new(keyword: impl Into<String>, dictionary: CommandDictionary, suggester: Suggester) -> Self {
        Self {
            keyword: keyword.into(),
            dictionary,
            suggester,
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
        }
    }

    /// Build the validator from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.settings.keyword.clone(),
            CommandDictionary::from_config(config),
            Suggester::from_config(config),
        )
        .with_max_suggestions(config.suggest.max)
    }

    pub fn with_max_suggestions(mut self, max: usize) -> Self {
        self.max_suggestions = max;
        self
    }

    pub fn dictionary(&self) -> &CommandDictionary {
        &self.dictionary
    }

    pub fn suggester(&self) -> &Suggester {
        &self.suggester
    }

    /// Classify a parsed command. Total: checks run in a fixed order and the
    /// first that applies decides.
    ///
    /// 1. Deprecated main command → `Deprecated`
    /// 2. Unknown main command → `InvalidMainCommand`
    /// 3. Standalone command with a subcommand → `StandaloneCommandMisuse`
    /// 4. Subcommand given but not accepted → `InvalidSubcommand`
    /// 5. Everything else → `Valid`
    pub fn classify(&self, cmd: &ParsedCommand) -> Classification {
        let main = cmd.main_command();
        let sub = cmd.sub_command();

        let result = if let Some(dep) = self.dictionary.deprecation(main) {
            Classification::Deprecated {
                command: main.to_string(),
                kind: dep.kind(),
                replacement: dep.replacement().map(str::to_string),
                rationale: dep.rationale().to_string(),
            }
        } else if !self.dictionary.is_main_command(main) {
            Classification::InvalidMainCommand {
                command: main.to_string(),
            }
        } else if self.dictionary.is_standalone(main) {
            if sub.is_empty() {
                Classification::Valid
            } else {
                Classification::StandaloneCommandMisuse {
                    command: main.to_string(),
                    subcommand: sub.to_string(),
                }
            }
        } else if !sub.is_empty() && !self.dictionary.allows_subcommand(main, sub) {
            Classification::InvalidSubcommand {
                command: main.to_string(),
                subcommand: sub.to_string(),
            }
        } else {
            Classification::Valid
        };

        log::debug!("classify {main:?} {sub:?} -> {}", result.as_str());
        result
    }

    /// Ranked corrections for the word a classification rejected.
    pub fn suggestions(&self, classification: &Classification) -> Vec<SimilarityResult> {
        match classification {
            Classification::InvalidMainCommand { command } => {
                let pool = self.dictionary.main_commands();
                self.suggester.rank(command, &pool, self.max_suggestions)
            }
            Classification::InvalidSubcommand {
                command,
                subcommand,
            } => {
                let pool = self.dictionary.subcommands(command).unwrap_or_default();
                self.suggester.rank(subcommand, pool, self.max_suggestions)
            }
            Classification::Valid
            | Classification::Deprecated { .. }
            | Classification::StandaloneCommandMisuse { .. } => Vec::new(),
        }
    }

    /// Classify and attach suggestions.
    pub fn validate(&self, command: ParsedCommand) -> Validation {
        let classification = self.classify(&command);
        let suggestions = self.suggestions(&classification);
        Validation {
            command,
            classification,
            suggestions,
        }
    }

    /// Parse a raw line with this validator's keyword, then validate it.
    pub fn validate_line(&self, line: &str) -> Result<Validation, ParseError> {
        parse::parse(line, &self.keyword).map(|cmd| self.validate(cmd))
    }

    /// Validate every non-blank, non-comment line of a script.
    ///
    /// Returns 1-based line numbers with each line's outcome, in order.
    /// Callers decide whether parse errors are fatal.
    pub fn validate_script(&self, text: &str) -> Vec<(usize, Result<Validation, ParseError>)> {
        text.lines()
            .enumerate()
            .filter(|(_, line)| {
                let trimmed = line.trim_start();
                !trimmed.is_empty() && !trimmed.starts_with('#')
            })
            .map(|(i, line)| (i + 1, self.validate_line(line)))
            .collect()
    }
}
