//! Types produced by the tokenizer/parser and consumed by the eval layer.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use thiserror::Error;

/// Why a line could not be parsed into a [`ParsedCommand`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The line is empty or whitespace only.
    #[error("empty input")]
    EmptyInput,
    /// The leading token is not the invocation keyword.
    #[error("not an invocation of `{expected}` (found `{found}`)")]
    NotRecognizedInvocation { expected: String, found: String },
    /// A quote opened at byte offset `position` is never closed.
    #[error("unterminated quote at byte {position}")]
    MalformedQuoting { position: usize },
}

/// A single word of a command line after quote removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Word text with quotes and escapes removed.
    pub text: String,
    /// Byte offset of the first character of the word in the source line.
    pub start: usize,
    /// True if any part of the word was quoted. Quoted words are never
    /// treated as options or flags.
    pub quoted: bool,
}

impl Token {
    /// Whether this word looks like an option or flag (`-x`, `--name`).
    pub fn is_dashed(&self) -> bool {
        !self.quoted && self.text.starts_with('-') && self.text.len() > 1
    }
}

/// A structured invocation of the wrapped tool.
///
/// Built once by [`parse`](crate::parse::parse) and never mutated afterwards;
/// fields are only reachable through accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedCommand {
    raw: String,
    main_command: String,
    sub_command: String,
    arguments: Vec<String>,
    options: BTreeMap<String, String>,
    flags: BTreeSet<String>,
}

impl ParsedCommand {
    pub(crate) fn new(
        raw: String,
        main_command: String,
        sub_command: String,
        arguments: Vec<String>,
        options: BTreeMap<String, String>,
        flags: BTreeSet<String>,
    ) -> Self {
        Self {
            raw,
            main_command,
            sub_command,
            arguments,
            options,
            flags,
        }
    }

    /// The source line exactly as given to the parser.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// First word after the invocation keyword (empty if there is none).
    pub fn main_command(&self) -> &str {
        &self.main_command
    }

    /// Second word, when it is not dashed. Empty otherwise.
    pub fn sub_command(&self) -> &str {
        &self.sub_command
    }

    /// Positional arguments in source order.
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Long options keyed by name without the leading `--`.
    pub fn options(&self) -> &BTreeMap<String, String> {
        &self.options
    }

    /// Value of a long option, by name without dashes.
    pub fn option(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(String::as_str)
    }

    /// Boolean flags by name without leading dashes (`-x` → `x`, `--all` → `all`).
    pub fn flags(&self) -> &BTreeSet<String> {
        &self.flags
    }

    /// Check if a flag was given, by name without dashes.
    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.contains(name)
    }

    /// Render a canonical command line: keyword, commands, arguments, then
    /// options and flags in sorted order, each word shell-quoted as needed.
    pub fn to_command_line(&self, keyword: &str) -> String {
        let mut words: Vec<String> = vec![keyword.to_string()];
        let positional = [&self.main_command, &self.sub_command]
            .into_iter()
            .filter(|w| !w.is_empty())
            .chain(self.arguments.iter());
        words.extend(positional.map(|w| quote(w)));
        for (name, value) in &self.options {
            words.push(format!("--{name}={}", quote(value)));
        }
        for flag in &self.flags {
            if flag.chars().count() == 1 {
                words.push(format!("-{flag}"));
            } else {
                words.push(format!("--{flag}"));
            }
        }
        words.join(" ")
    }
}

/// Shell-quote a single word; words shlex refuses (NUL bytes) pass through.
fn quote(word: &str) -> String {
    shlex::try_quote(word)
        .map(|q| q.into_owned())
        .unwrap_or_else(|_| word.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ParsedCommand {
        ParsedCommand::new(
            "tool server list my-dc --output-type=json -v".into(),
            "server".into(),
            "list".into(),
            vec!["my-dc".into()],
            BTreeMap::from([("output-type".to_string(), "json".to_string())]),
            BTreeSet::from(["v".to_string()]),
        )
    }

    #[test]
    fn accessors() {
        let cmd = sample();
        assert_eq!(cmd.main_command(), "server");
        assert_eq!(cmd.sub_command(), "list");
        assert_eq!(cmd.arguments(), ["my-dc"]);
        assert_eq!(cmd.option("output-type"), Some("json"));
        assert!(cmd.has_flag("v"));
        assert!(!cmd.has_flag("all"));
    }

    #[test]
    fn command_line_round_trips_plain_words() {
        assert_eq!(
            sample().to_command_line("tool"),
            "tool server list my-dc --output-type=json -v"
        );
    }

    #[test]
    fn command_line_quotes_spaces() {
        let cmd = ParsedCommand::new(
            String::new(),
            "disk".into(),
            "read".into(),
            vec!["my disk".into()],
            BTreeMap::new(),
            BTreeSet::new(),
        );
        assert_eq!(cmd.to_command_line("tool"), "tool disk read 'my disk'");
    }

    #[test]
    fn dashed_token() {
        let t = Token { text: "-x".into(), start: 0, quoted: false };
        assert!(t.is_dashed());
        let q = Token { text: "-x".into(), start: 0, quoted: true };
        assert!(!q.is_dashed());
        let bare = Token { text: "-".into(), start: 0, quoted: false };
        assert!(!bare.is_dashed());
    }
}
