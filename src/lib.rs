//! tool-migrate: rewrites scripted `tool` invocations from the legacy syntax
//! generation to the current one, and validates invocations against the
//! command dictionary.
//!
//! Migration is line based. Each line runs through an ordered [`rules::RuleSet`]
//! of pattern rewrites (output formats, the removed selector idiom, renamed
//! resources, aliases, discontinued commands, option spacing and any custom
//! rules from configuration). Changed lines get a trailing marker comment, so
//! running the migration twice is a no-op.
//!
//! Validation parses an invocation into a [`parse::ParsedCommand`] and classifies
//! it with a [`eval::Validator`]; unknown words come back with ranked
//! "did you mean" suggestions from [`suggest::Suggester`].
//!
//! # Architecture
//!
//! - **[`parse`]** — Tokenizer and invocation parser (main command, subcommand, options, flags).
//! - **[`commands`]** — Command dictionary and deprecation records.
//! - **[`eval`]** — Classification of parsed invocations.
//! - **[`suggest`]** — Levenshtein distance and suggestion ranking.
//! - **[`rules`]** — Rewrite rules and the ordered rule set.
//! - **[`engine`]** — Line, script and parallel rule application.
//! - **[`config`]** — Configuration loading: embedded defaults + user overlay merge.
//! - **[`logging`]** — Terminal and file logging setup for the CLI.

/// Command dictionary and deprecation records.
pub mod commands;
/// Configuration types, loading, and overlay merge logic.
pub mod config;
/// Rule application over lines and scripts.
pub mod engine;
/// Validation: classification of parsed invocations.
pub mod eval;
/// Logger setup.
pub mod logging;
/// Tokenizer and invocation parser.
pub mod parse;
/// Rewrite rules.
pub mod rules;
/// Typo suggestions.
pub mod suggest;

use engine::{Engine, LineResult};
use eval::Validation;
use parse::ParseError;

/// Build the engine from the default config and migrate one line.
///
/// This is the main entry point for tests and simple usage.
/// For CLI usage with a user config, build the [`Engine`] directly.
pub fn migrate_line(line: &str) -> LineResult {
    let config = config::Config::default_config();
    let engine = Engine::from_config(&config).expect("embedded default rules must compile");
    engine.apply(line)
}

/// Build the validator from the default config and validate one line.
pub fn validate_line(line: &str) -> Result<Validation, ParseError> {
    let config = config::Config::default_config();
    eval::Validator::from_config(&config).validate_line(line)
}
