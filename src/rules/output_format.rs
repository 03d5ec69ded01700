use std::collections::BTreeMap;

use super::{Rule, RuleError, Scope, alternation, group, option_alternation, reference};
use crate::config::OutputFormatConfig;

pub const NAME: &str = "output-format";

/// Replace legacy output format values with their current equivalents.
///
/// Matches `<option>=<value>`, `<option> = <value>` and `<option> <value>`
/// for every configured option; values compare case-insensitively. The
/// separator is kept as written.
pub fn rule(
    keyword: &str,
    config: &OutputFormatConfig,
    base_url: &str,
) -> Result<Option<Rule>, RuleError> {
    if config.options.is_empty() || config.values.is_empty() {
        return Ok(None);
    }
    let values: BTreeMap<String, String> = config
        .values
        .iter()
        .map(|(legacy, current)| (legacy.to_lowercase(), current.clone()))
        .collect();
    let pattern = format!(
        r"(?P<opt>(?:{opts})(?:\s*=\s*|\s+))(?P<value>(?i:{vals}))(?P<tail>\s|$)",
        opts = option_alternation(config.options.iter().map(String::as_str)),
        vals = alternation(config.values.keys().map(String::as_str)),
    );

    let rule = Rule::new(NAME, &pattern, Scope::Invocation(keyword.to_string()), move |caps| {
        let value = group(caps, "value");
        let current = values
            .get(&value.to_lowercase())
            .map_or(value, String::as_str);
        format!("{}{}{}", group(caps, "opt"), current, group(caps, "tail"))
    })?;

    let mapping = config
        .values
        .iter()
        .map(|(legacy, current)| format!("{legacy} → {current}"))
        .collect::<Vec<_>>()
        .join(", ");
    Ok(Some(rule.with_rationale(
        format!("legacy output format replaced ({mapping})"),
        reference(base_url, NAME),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn rule() -> Rule {
        let config = Config::default_config();
        super::rule("tool", &config.rules.output_format, "https://docs.test")
            .unwrap()
            .unwrap()
    }

    fn apply(line: &str) -> String {
        rule().apply(line).line
    }

    #[test]
    fn equals_form() {
        let out = rule().apply("tool server list --output-type=csv");
        assert!(out.changed);
        assert_eq!(out.line, "tool server list --output-type=json");
        assert_eq!(out.before, "--output-type=csv");
        assert_eq!(out.after, "--output-type=json");
    }

    #[test]
    fn short_option() {
        assert_eq!(apply("tool server list -o text"), "tool server list -o table");
    }

    #[test]
    fn separate_value_mid_line() {
        assert_eq!(
            apply("tool server list --output-type csv --all"),
            "tool server list --output-type json --all"
        );
    }

    #[test]
    fn spacing_is_preserved() {
        assert_eq!(
            apply("tool server list --output-type = csv"),
            "tool server list --output-type = json"
        );
    }

    #[test]
    fn adjacent_options_both_rewritten() {
        assert_eq!(
            apply("tool server list -o text --output-type=csv"),
            "tool server list -o table --output-type=json"
        );
    }

    #[test]
    fn value_case_insensitive() {
        assert_eq!(apply("tool disk list -o CSV"), "tool disk list -o json");
    }

    #[test]
    fn current_values_untouched() {
        assert!(!rule().apply("tool server list --output-type=json").changed);
    }

    #[test]
    fn partial_value_untouched() {
        assert!(!rule().apply("tool server list --output-type=csvx").changed);
        assert!(!rule().apply("tool server list --output-type=csv-plain").changed);
    }

    #[test]
    fn other_commands_untouched() {
        let line = "mytool export --output-type=csv";
        assert_eq!(apply(line), line);
        let line = "grep -o text file.txt";
        assert_eq!(apply(line), line);
    }

    #[test]
    fn rationale_lists_mapping() {
        let r = rule();
        assert!(r.rationale().contains("csv → json"));
        assert_eq!(r.reference_url(), "https://docs.test#output-format");
    }

    #[test]
    fn empty_config_builds_nothing() {
        let config = OutputFormatConfig::default();
        assert!(super::rule("tool", &config, "").unwrap().is_none());
    }
}
