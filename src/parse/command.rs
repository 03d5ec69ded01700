use std::collections::{BTreeMap, BTreeSet};

use super::tokenize::tokenize;
use super::types::{ParseError, ParsedCommand, Token};

/// Parse a raw line into a [`ParsedCommand`].
///
/// The leading word must equal `keyword` exactly (case-sensitive). The word
/// after it is the main command; the next word, unless it starts with `-`,
/// is the subcommand. Remaining words are classified in order:
///
/// - `--name=value` → option
/// - `--name value` → option, when `value` is not dashed
/// - `--name` → flag otherwise
/// - `-x` → flag
/// - `--` → every later word is positional
/// - anything else → positional argument
pub fn parse(line: &str, keyword: &str) -> Result<ParsedCommand, ParseError> {
    if line.trim().is_empty() {
        return Err(ParseError::EmptyInput);
    }
    let tokens = tokenize(line)?;
    let mut iter = tokens.into_iter().peekable();

    match iter.next() {
        Some(first) if !first.quoted && first.text == keyword => {}
        other => {
            return Err(ParseError::NotRecognizedInvocation {
                expected: keyword.to_string(),
                found: other.map(|t| t.text).unwrap_or_default(),
            });
        }
    }

    let main_command = iter.next().map(|t| t.text).unwrap_or_default();
    let sub_command = match iter.peek() {
        Some(t) if !t.text.starts_with('-') => iter.next().map(|t| t.text).unwrap_or_default(),
        _ => String::new(),
    };

    let mut arguments = Vec::new();
    let mut options = BTreeMap::new();
    let mut flags = BTreeSet::new();
    let mut positional_only = false;

    while let Some(token) = iter.next() {
        if positional_only || !token.is_dashed() {
            arguments.push(token.text);
            continue;
        }
        if token.text == "--" {
            positional_only = true;
            continue;
        }
        if let Some(long) = token.text.strip_prefix("--") {
            if let Some((name, value)) = long.split_once('=') {
                options.insert(name.to_string(), value.to_string());
            } else if iter.peek().is_some_and(|next: &Token| !next.is_dashed()) {
                let value = iter.next().map(|t| t.text).unwrap_or_default();
                options.insert(long.to_string(), value);
            } else {
                flags.insert(long.to_string());
            }
        } else if let Some(short) = token.text.strip_prefix('-') {
            flags.insert(short.to_string());
        }
    }

    Ok(ParsedCommand::new(
        line.to_string(),
        main_command,
        sub_command,
        arguments,
        options,
        flags,
    ))
}
