//! Rewrite rules: pattern-driven, side-effect-free line transformations.
//!
//! Each category lives in its own module and builds a [`Rule`] from
//! configuration data. [`RuleSet::from_config`] assembles them in their
//! fixed application order:
//!
//! 1. [`output_format`] — legacy `--output-type` / `-o` values
//! 2. [`selector`] — `--selector key=value` → positional `value`
//! 3. [`rename`] (renamed resources) — old main command → new one
//! 4. [`rename`] (aliases) — alias main command → canonical one
//! 5. [`deprecation`] — comment out discontinued commands
//! 6. [`spacing`] — no whitespace around an option's `=`
//! 7. [`custom`] — user rules, in configuration order

/// User-defined regex rules.
pub mod custom;
/// Commenting out discontinued commands.
pub mod deprecation;
/// Legacy output format values.
pub mod output_format;
/// Main command substitution (renames and aliases).
pub mod rename;
/// Removed `--selector key=value` idiom.
pub mod selector;
/// Whitespace around `=` in option assignments.
pub mod spacing;

use std::collections::HashSet;
use std::fmt;

use regex::{Captures, Regex};
use thiserror::Error;

use crate::config::Config;
use crate::parse::{QuoteMap, is_invocation};

/// Rule definition errors. Raised while building a rule set, never while
/// applying one.
#[derive(Debug, Clone, Error)]
pub enum RuleError {
    #[error("rule {rule}: invalid pattern: {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },
    #[error("duplicate rule name: {0}")]
    DuplicateName(String),
}

/// Which lines a rule may touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Only lines whose leading word is this keyword (case-insensitive).
    Invocation(String),
    /// Any line.
    AnyLine,
}

impl Scope {
    pub fn admits(&self, line: &str) -> bool {
        match self {
            Scope::Invocation(keyword) => is_invocation(line, keyword),
            Scope::AnyLine => true,
        }
    }
}

type Replacer = Box<dyn Fn(&Captures) -> String + Send + Sync>;

/// Result of applying one rule to one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub line: String,
    pub changed: bool,
    /// Text of the first rewritten match (empty when unchanged).
    pub before: String,
    /// Replacement of the first rewritten match (empty when unchanged).
    pub after: String,
}

impl RuleOutcome {
    fn unchanged(line: &str) -> Self {
        Self {
            line: line.to_string(),
            changed: false,
            before: String::new(),
            after: String::new(),
        }
    }
}

/// A compiled pattern, a scope guard, and a pure replacement over captures.
pub struct Rule {
    name: String,
    pattern: Regex,
    scope: Scope,
    replace: Replacer,
    rationale: String,
    reference_url: String,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("pattern", &self.pattern.as_str())
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl Rule {
    /// Compile a rule. An invalid pattern is a [`RuleError::InvalidPattern`].
    pub fn new<F>(name: &str, pattern: &str, scope: Scope, replace: F) -> Result<Self, RuleError>
    where
        F: Fn(&Captures) -> String + Send + Sync + 'static,
    {
        let pattern = Regex::new(pattern).map_err(|source| RuleError::InvalidPattern {
            rule: name.to_string(),
            source,
        })?;
        Ok(Self {
            name: name.to_string(),
            pattern,
            scope,
            replace: Box::new(replace),
            rationale: String::new(),
            reference_url: String::new(),
        })
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>, reference_url: impl Into<String>) -> Self {
        self.rationale = rationale.into();
        self.reference_url = reference_url.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rationale(&self) -> &str {
        &self.rationale
    }

    pub fn reference_url(&self) -> &str {
        &self.reference_url
    }

    /// Rewrite every match in `line`. Lines outside the rule's scope, lines
    /// without a match, and matches whose replacement equals the matched
    /// text all leave the line untouched. A match starting inside quotes is
    /// argument text, not syntax, and is skipped.
    pub fn apply(&self, line: &str) -> RuleOutcome {
        if !self.scope.admits(line) {
            return RuleOutcome::unchanged(line);
        }

        let quotes = QuoteMap::new(line);
        let mut out = String::with_capacity(line.len());
        let mut last = 0;
        let mut first: Option<(String, String)> = None;

        for caps in self.pattern.captures_iter(line) {
            let Some(m) = caps.get(0) else { continue };
            if quotes.is_quoted(m.start()) {
                continue;
            }
            let replacement = (self.replace)(&caps);
            if replacement == m.as_str() {
                continue;
            }
            out.push_str(&line[last..m.start()]);
            out.push_str(&replacement);
            last = m.end();
            first.get_or_insert_with(|| (m.as_str().to_string(), replacement));
        }

        match first {
            None => RuleOutcome::unchanged(line),
            Some((before, after)) => {
                out.push_str(&line[last..]);
                RuleOutcome {
                    line: out,
                    changed: true,
                    before,
                    after,
                }
            }
        }
    }
}

/// Ordered, immutable list of rules. Names are unique.
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Result<Self, RuleError> {
        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.name.as_str()) {
                return Err(RuleError::DuplicateName(rule.name.clone()));
            }
        }
        Ok(Self { rules })
    }

    /// Build the built-in rules followed by custom rules. Categories whose
    /// configuration data is empty are left out.
    pub fn from_config(config: &Config) -> Result<Self, RuleError> {
        let keyword = &config.settings.keyword;
        let base = &config.settings.reference_url;
        let renamed = config
            .deprecated
            .renamed
            .iter()
            .map(|(old, entry)| (old.clone(), entry.to.clone()))
            .collect();

        let builtin = [
            output_format::rule(keyword, &config.rules.output_format, base)?,
            selector::rule(keyword, &config.rules.selector, base)?,
            rename::rule(
                rename::RESOURCE_RENAME,
                keyword,
                renamed,
                "resource renamed in the current release",
                &reference(base, rename::RESOURCE_RENAME),
            )?,
            rename::rule(
                rename::ALIAS,
                keyword,
                config.rules.aliases.clone(),
                "command alias no longer accepted",
                &reference(base, rename::ALIAS),
            )?,
            deprecation::rule(keyword, &config.deprecated.discontinued, base)?,
            spacing::rule(keyword, &config.rules.spacing, base)?,
        ];

        let mut rules: Vec<Rule> = builtin.into_iter().flatten().collect();
        for custom in &config.rules.custom {
            rules.push(custom::rule(custom, keyword)?);
        }
        log::debug!(
            "rule set: {}",
            rules.iter().map(Rule::name).collect::<Vec<_>>().join(", ")
        );
        Self::new(rules)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(Rule::name).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Reference link for a rule: `<base>#<anchor>`, or empty without a base.
pub fn reference(base: &str, anchor: &str) -> String {
    if base.is_empty() {
        String::new()
    } else {
        format!("{base}#{anchor}")
    }
}

/// Regex alternation of literal words, longest first.
pub(crate) fn alternation<'a>(words: impl IntoIterator<Item = &'a str>) -> String {
    let mut words: Vec<&str> = words.into_iter().filter(|w| !w.is_empty()).collect();
    words.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    words
        .into_iter()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|")
}

/// Alternation of option names, longest first, each anchored so it starts a
/// word. The anchor is zero-width, so a match that consumed the whitespace
/// after one option does not hide the next option from the scan.
pub(crate) fn option_alternation<'a>(options: impl IntoIterator<Item = &'a str>) -> String {
    let mut options: Vec<&str> = options.into_iter().filter(|o| !o.is_empty()).collect();
    options.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    options
        .into_iter()
        .map(|opt| {
            let starts_word = opt.chars().next().is_some_and(|c| c.is_alphanumeric() || c == '_');
            let anchor = if starts_word { r"\b" } else { r"\B" };
            format!("{anchor}{}", regex::escape(opt))
        })
        .collect::<Vec<_>>()
        .join("|")
}

/// Pattern prefix capturing leading whitespace, the keyword (any case) and
/// the whitespace after it as `head`.
pub(crate) fn invocation_head(keyword: &str) -> String {
    format!(r"^(?P<head>\s*(?i:{})\s+)", regex::escape(keyword))
}

/// Text of a named capture, or empty.
pub(crate) fn group<'h>(caps: &Captures<'h>, name: &str) -> &'h str {
    caps.name(name).map_or("", |m| m.as_str())
}
