use super::{Rule, RuleError, Scope, group, option_alternation, reference};
use crate::config::SpacingConfig;

pub const NAME: &str = "option-spacing";

/// Collapse whitespace around the `=` of `--option = value`.
pub fn rule(keyword: &str, config: &SpacingConfig, base_url: &str) -> Result<Option<Rule>, RuleError> {
    if config.options.is_empty() {
        return Ok(None);
    }
    let pattern = format!(
        r"(?P<opt>{opts})(?:\s+=\s*|=\s+)",
        opts = option_alternation(config.options.iter().map(String::as_str)),
    );
    let rule = Rule::new(NAME, &pattern, Scope::Invocation(keyword.to_string()), |caps| {
        format!("{}=", group(caps, "opt"))
    })?;
    Ok(Some(rule.with_rationale(
        "whitespace around '=' is not accepted",
        reference(base_url, NAME),
    )))
}
