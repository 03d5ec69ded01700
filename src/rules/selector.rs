use super::{Rule, RuleError, Scope, group, option_alternation, reference};
use crate::config::SelectorConfig;

pub const NAME: &str = "selector-positional";

/// Rewrite the removed `--selector key=value` idiom into a bare positional
/// `value`. The option and the key are dropped. A value that came from a
/// quoted `"key=some value"` is re-quoted so it stays one word.
pub fn rule(keyword: &str, config: &SelectorConfig, base_url: &str) -> Result<Option<Rule>, RuleError> {
    if config.option.is_empty() {
        return Ok(None);
    }
    let pattern = format!(
        r#"(?:{opt})(?:\s*=\s*|\s+)(?:(?P<key>[\w.-]+)=(?P<value>[^\s"']+)|"(?P<dkey>[\w.-]+)=(?P<dvalue>[^"]*)"|'(?P<skey>[\w.-]+)=(?P<svalue>[^']*)')(?P<tail>\s|$)"#,
        opt = option_alternation([config.option.as_str()]),
    );

    let rule = Rule::new(NAME, &pattern, Scope::Invocation(keyword.to_string()), |caps| {
        let value = match (caps.name("value"), caps.name("dvalue"), caps.name("svalue")) {
            (Some(v), _, _) => v.as_str().to_string(),
            (None, Some(v), _) | (None, None, Some(v)) => requote(v.as_str()),
            (None, None, None) => String::new(),
        };
        format!("{}{}", value, group(caps, "tail"))
    })?;

    Ok(Some(rule.with_rationale(
        format!("{} was removed; the selected value is now a positional argument", config.option),
        reference(base_url, NAME),
    )))
}

/// Quote a formerly quoted value for the shell if it needs it.
fn requote(value: &str) -> String {
    shlex::try_quote(value)
        .map(|q| q.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule() -> Rule {
        let config = SelectorConfig {
            option: "--selector".into(),
        };
        super::rule("tool", &config, "").unwrap().unwrap()
    }

    fn apply(line: &str) -> String {
        rule().apply(line).line
    }

    #[test]
    fn selector_becomes_positional() {
        let out = rule().apply("tool disk read --selector name=mydisk");
        assert!(out.changed);
        assert_eq!(out.line, "tool disk read mydisk");
        assert_eq!(out.before, "--selector name=mydisk");
        assert_eq!(out.after, "mydisk");
    }

    #[test]
    fn selector_mid_line() {
        assert_eq!(
            apply("tool disk read --selector id=42 --wait"),
            "tool disk read 42 --wait"
        );
    }

    #[test]
    fn selector_with_equals() {
        assert_eq!(apply("tool disk read --selector=name=mydisk"), "tool disk read mydisk");
    }

    #[test]
    fn double_quoted_value_with_space() {
        assert_eq!(
            apply(r#"tool disk read --selector "name=my disk""#),
            "tool disk read 'my disk'"
        );
    }

    #[test]
    fn single_quoted_plain_value() {
        assert_eq!(apply("tool disk read --selector 'name=data'"), "tool disk read data");
    }

    #[test]
    fn selector_without_key_untouched() {
        let line = "tool disk read --selector mydisk";
        assert_eq!(apply(line), line);
    }

    #[test]
    fn other_commands_untouched() {
        let line = "kubectl get pods --selector app=web";
        assert_eq!(apply(line), line);
    }

    #[test]
    fn disabled_without_option() {
        assert!(super::rule("tool", &SelectorConfig::default(), "").unwrap().is_none());
    }
}
