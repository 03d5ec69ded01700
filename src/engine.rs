//! Sequential rule application over lines and scripts.

use std::num::NonZeroUsize;
use std::thread;

use serde::Serialize;

use crate::config::Config;
use crate::parse::QuoteMap;
use crate::rules::{RuleError, RuleSet};

/// One rule firing on one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub rule: String,
    pub before: String,
    pub after: String,
}

/// Result of running the engine over a single line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineResult {
    pub line: String,
    pub changed: bool,
    /// In rule application order.
    pub changes: Vec<Change>,
}

impl LineResult {
    fn unchanged(line: &str) -> Self {
        Self {
            line: line.to_string(),
            changed: false,
            changes: Vec::new(),
        }
    }
}

/// How an input line was terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    Lf,
    CrLf,
    /// Last line of input without a terminator.
    Eof,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
            LineEnding::Eof => "",
        }
    }
}

/// Split text into lines, keeping each line's terminator.
pub fn split_lines(text: &str) -> (Vec<&str>, Vec<LineEnding>) {
    text.split_inclusive('\n')
        .map(|raw| {
            if let Some(line) = raw.strip_suffix("\r\n") {
                (line, LineEnding::CrLf)
            } else if let Some(line) = raw.strip_suffix('\n') {
                (line, LineEnding::Lf)
            } else {
                (raw, LineEnding::Eof)
            }
        })
        .unzip()
}

/// Result of running the engine over a script, one entry per input line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptResult {
    pub lines: Vec<LineResult>,
    /// Terminator of each input line, in step with `lines`.
    pub endings: Vec<LineEnding>,
}

impl ScriptResult {
    /// Line numbers (1-based) of lines that changed.
    pub fn changed_lines(&self) -> Vec<usize> {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, r)| r.changed)
            .map(|(i, _)| i + 1)
            .collect()
    }

    pub fn change_count(&self) -> usize {
        self.lines.iter().map(|r| r.changes.len()).sum()
    }

    /// Output text with `header` as the first line. A header already present
    /// as the first line is not repeated; an empty header adds nothing.
    /// Every line keeps its input terminator; the header takes the first
    /// line's.
    pub fn render(&self, header: &str) -> String {
        let mut out = String::new();
        let has_header = self.lines.first().is_some_and(|r| r.line == header);
        if !header.is_empty() && !has_header {
            let ending = match self.endings.first() {
                Some(LineEnding::CrLf) => LineEnding::CrLf,
                _ => LineEnding::Lf,
            };
            out.push_str(header);
            out.push_str(ending.as_str());
        }
        for (result, ending) in self.lines.iter().zip(&self.endings) {
            out.push_str(&result.line);
            out.push_str(ending.as_str());
        }
        out
    }
}

/// Applies a [`RuleSet`] to lines of script text.
///
/// Rules run in registration order, each seeing the previous rule's output.
/// A line with at least one change gets a single trailing marker comment
/// naming the rationale and reference of every rule that fired, unless it
/// already carries the marker or was turned into a comment. Quoted text and
/// a trailing comment are never rewritten.
pub struct Engine {
    rules: RuleSet,
    marker: String,
    header: String,
}

impl Engine {
    pub fn new(rules: RuleSet, marker: impl Into<String>) -> Self {
        Self {
            rules,
            marker: marker.into(),
            header: String::new(),
        }
    }

    /// Build the engine from configuration. Fails on invalid rule definitions.
    pub fn from_config(config: &Config) -> Result<Self, RuleError> {
        let rules = RuleSet::from_config(config)?;
        Ok(Self::new(rules, config.settings.marker.clone()).with_header(config.settings.header.clone()))
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    /// Transform one line.
    pub fn apply(&self, line: &str) -> LineResult {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return LineResult::unchanged(line);
        }

        // Rules only see the code; a trailing comment, marker included, is kept as is.
        let (code, comment) = match QuoteMap::new(line).comment_start() {
            Some(pos) => (&line[..pos], Some(&line[pos..])),
            None => (line, None),
        };

        let mut current = code.to_string();
        let mut changes = Vec::new();
        let mut notes: Vec<&str> = Vec::new();
        let mut links: Vec<&str> = Vec::new();

        for rule in self.rules.iter() {
            let outcome = rule.apply(&current);
            if !outcome.changed {
                continue;
            }
            log::debug!("{}: {:?} -> {:?}", rule.name(), outcome.before, outcome.after);
            changes.push(Change {
                rule: rule.name().to_string(),
                before: outcome.before,
                after: outcome.after,
            });
            if !rule.rationale().is_empty() && !notes.contains(&rule.rationale()) {
                notes.push(rule.rationale());
            }
            if !rule.reference_url().is_empty() && !links.contains(&rule.reference_url()) {
                links.push(rule.reference_url());
            }
            current = outcome.line;
        }

        if changes.is_empty() {
            return LineResult::unchanged(line);
        }

        let commented_out = current.trim_start().starts_with('#');
        let marked = comment.is_some_and(|c| !self.marker.is_empty() && c.contains(&self.marker));
        let mut line = current.trim_end().to_string();
        if commented_out || marked {
            if let Some(comment) = comment {
                line.push(' ');
                line.push_str(comment);
            }
        } else {
            if let Some(comment) = comment {
                line.push(' ');
                line.push_str(comment.trim_end());
            }
            line.push(' ');
            line.push_str(&self.marker);
            if !notes.is_empty() {
                line.push(' ');
                line.push_str(&notes.join("; "));
            }
            if !links.is_empty() {
                line.push_str(&format!(" ({})", links.join(", ")));
            }
        }

        LineResult {
            line,
            changed: true,
            changes,
        }
    }

    /// Transform every line of a script, in order.
    pub fn apply_script(&self, text: &str) -> ScriptResult {
        let (lines, endings) = split_lines(text);
        ScriptResult {
            lines: lines.iter().map(|line| self.apply(line)).collect(),
            endings,
        }
    }

    /// Transform lines on up to `jobs` threads. Output order always matches
    /// input order and equals what [`apply`](Self::apply) gives line by line.
    pub fn apply_lines(&self, lines: &[&str], jobs: NonZeroUsize) -> Vec<LineResult> {
        let jobs = jobs.get().min(lines.len());
        if jobs <= 1 {
            return lines.iter().map(|line| self.apply(line)).collect();
        }
        let chunk_size = lines.len().div_ceil(jobs);

        thread::scope(|s| {
            let handles: Vec<_> = lines
                .chunks(chunk_size)
                .map(|chunk| s.spawn(move || chunk.iter().map(|line| self.apply(line)).collect::<Vec<_>>()))
                .collect();

            let mut results = Vec::with_capacity(lines.len());
            for (handle, chunk) in handles.into_iter().zip(lines.chunks(chunk_size)) {
                match handle.join() {
                    Ok(chunk_results) => results.extend(chunk_results),
                    // Rules are pure; redo the chunk inline rather than lose lines
                    Err(_) => {
                        log::warn!("worker thread panicked; reprocessing {} line(s)", chunk.len());
                        results.extend(chunk.iter().map(|line| self.apply(line)));
                    }
                }
            }
            results
        })
    }

    /// Like [`apply_script`](Self::apply_script), spreading lines over `jobs` threads.
    pub fn apply_script_parallel(&self, text: &str, jobs: NonZeroUsize) -> ScriptResult {
        let (lines, endings) = split_lines(text);
        ScriptResult {
            lines: self.apply_lines(&lines, jobs),
            endings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Rule, Scope};

    fn engine() -> Engine {
        Engine::from_config(&Config::default_config()).unwrap()
    }

    #[test]
    fn empty_and_comment_lines_verbatim() {
        let e = engine();
        for line in ["", "   ", "# tool summary", "   # tool server list -o csv"] {
            let r = e.apply(line);
            assert!(!r.changed);
            assert_eq!(r.line, line);
        }
    }

    #[test]
    fn unmatched_line_verbatim() {
        let r = engine().apply("tool server list --output-type=json  ");
        assert!(!r.changed);
        assert_eq!(r.line, "tool server list --output-type=json  ");
        assert!(r.changes.is_empty());
    }

    #[test]
    fn marker_appended_once() {
        let r = engine().apply("tool server list --output-type=csv");
        assert!(r.changed);
        assert!(r.line.starts_with("tool server list --output-type=json # updated: "));
        assert_eq!(r.line.matches("# updated:").count(), 1);
        assert!(r.line.ends_with("(https://docs.tool.dev/migration#output-format)"));
    }

    #[test]
    fn rules_chain_in_order() {
        let r = engine().apply("tool srv list --output-type = csv");
        let names: Vec<&str> = r.changes.iter().map(|c| c.rule.as_str()).collect();
        assert_eq!(names, vec!["output-format", "alias-consolidation", "option-spacing"]);
        assert!(r.line.starts_with("tool server list --output-type=json # updated: "));
    }

    #[test]
    fn later_rule_sees_earlier_output() {
        let first = Rule::new("a-to-b", r"\ba\b", Scope::AnyLine, |_| "b".into()).unwrap();
        let second = Rule::new("b-to-c", r"\bb\b", Scope::AnyLine, |_| "c".into()).unwrap();
        let e = Engine::new(RuleSet::new(vec![first, second]).unwrap(), "# m:");
        let r = e.apply("x a");
        assert_eq!(r.changes.len(), 2);
        assert_eq!(r.line, "x c # m:");
    }

    #[test]
    fn existing_marker_is_kept_not_duplicated() {
        let e = engine();
        let line = "tool srv list # updated: earlier note";
        let r = e.apply(line);
        assert!(r.changed);
        assert_eq!(r.line, "tool server list # updated: earlier note");
    }

    #[test]
    fn marker_comment_is_not_rewritten() {
        let e = engine();
        let line = "tool server list # updated: was -o csv";
        let r = e.apply(line);
        assert!(!r.changed);
        assert_eq!(r.line, line);
    }

    #[test]
    fn trailing_comment_is_not_rewritten() {
        let e = engine();
        let line = "tool server list # legacy scripts used -o csv here";
        let r = e.apply(line);
        assert!(!r.changed);
        assert_eq!(r.line, line);

        let r = e.apply("tool srv list # was -o csv");
        assert_eq!(r.changes.len(), 1);
        assert!(r.line.starts_with("tool server list # was -o csv # updated: "));
        assert!(!e.apply(&r.line).changed);
    }

    #[test]
    fn quoted_argument_is_not_rewritten() {
        let e = engine();
        let line = r#"tool label add --value "switch -o text now""#;
        let r = e.apply(line);
        assert!(!r.changed);
        assert_eq!(r.line, line);

        let r = e.apply(r#"tool label add --value "-o text" -o text"#);
        assert!(r.line.starts_with(r#"tool label add --value "-o text" -o table # updated: "#));
    }

    #[test]
    fn quoted_marker_text_is_not_a_marker() {
        let e = engine();
        let r = e.apply(r##"tool server create --note "# updated: x" -o csv"##);
        assert!(r.changed);
        assert!(r.line.starts_with(r##"tool server create --note "# updated: x" -o json # updated: "##));
        assert_eq!(e.apply(&r.line).line, r.line);
    }

    #[test]
    fn discontinued_line_keeps_its_comment() {
        let r = engine().apply("tool summary --all # nightly report");
        assert!(r.line.starts_with("# tool summary --all # discontinued: "));
        assert!(r.line.ends_with(" # nightly report"));
    }

    #[test]
    fn idempotent() {
        let e = engine();
        for line in [
            "tool server list --output-type=csv",
            "tool disk read --selector name=mydisk",
            "tool iso-image list",
            "tool summary",
            "tool srv list -o text --output-type = csv",
        ] {
            let once = e.apply(line);
            assert!(once.changed, "{line}");
            let twice = e.apply(&once.line);
            assert!(!twice.changed, "{line}");
            assert_eq!(twice.line, once.line);
        }
    }

    #[test]
    fn deprecated_line_has_no_marker() {
        let r = engine().apply("tool summary");
        assert!(r.changed);
        assert!(r.line.starts_with("# tool summary # discontinued: "));
        assert!(!r.line.contains("# updated:"));
    }

    #[test]
    fn script_keeps_order_and_count() {
        let e = engine();
        let text = "#!/bin/sh\ntool iso-image list\necho done\n";
        let result = e.apply_script(text);
        assert_eq!(result.lines.len(), 3);
        assert_eq!(result.changed_lines(), vec![2]);
        assert_eq!(result.change_count(), 1);
        assert_eq!(result.lines[2].line, "echo done");
    }

    #[test]
    fn render_adds_header_once() {
        let e = engine();
        let result = e.apply_script("tool server list\n");
        let out = result.render(e.header());
        assert!(out.starts_with(e.header()));
        assert!(out.ends_with("tool server list\n"));

        let again = e.apply_script(&out).render(e.header());
        assert_eq!(again, out);
    }

    #[test]
    fn render_keeps_crlf() {
        let e = engine();
        assert_eq!(e.apply_script("echo a\r\necho b\r\n").render(""), "echo a\r\necho b\r\n");

        let out = e.apply_script("tool iso-image list\r\n# note\r\n").render(e.header());
        assert!(out.starts_with(&format!("{}\r\n", e.header())));
        assert!(out.ends_with("\r\n# note\r\n"));
        assert_eq!(out.matches('\n').count(), out.matches("\r\n").count());
    }

    #[test]
    fn render_keeps_mixed_endings() {
        let text = "echo a\necho b\r\necho c";
        assert_eq!(engine().apply_script(text).render(""), text);
    }

    #[test]
    fn split_lines_records_endings() {
        let (lines, endings) = split_lines("a\r\nb\n\nc");
        assert_eq!(lines, vec!["a", "b", "", "c"]);
        assert_eq!(
            endings,
            vec![LineEnding::CrLf, LineEnding::Lf, LineEnding::Lf, LineEnding::Eof]
        );
        assert!(split_lines("").0.is_empty());
    }

    #[test]
    fn render_without_trailing_newline() {
        let e = engine();
        assert_eq!(e.apply_script("echo a\necho b").render(""), "echo a\necho b");
    }

    #[test]
    fn parallel_matches_sequential() {
        let e = engine();
        let lines: Vec<String> = (0..97)
            .map(|i| match i % 4 {
                0 => format!("tool server list --output-type=csv # {i}"),
                1 => format!("echo {i}"),
                2 => format!("tool iso-image get --id {i}"),
                _ => format!("tool disk read --selector name=d{i}"),
            })
            .collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let sequential: Vec<LineResult> = refs.iter().map(|l| e.apply(l)).collect();
        for jobs in [1, 2, 3, 8, 200] {
            let parallel = e.apply_lines(&refs, NonZeroUsize::new(jobs).unwrap());
            assert_eq!(parallel, sequential, "jobs = {jobs}");
        }
    }

    #[test]
    fn parallel_empty_input() {
        let e = engine();
        assert!(e.apply_lines(&[], NonZeroUsize::new(4).unwrap()).is_empty());
    }
}
