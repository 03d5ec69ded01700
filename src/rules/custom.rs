use super::{Rule, RuleError, Scope};
use crate::config::CustomRuleConfig;

/// Build a user rule. The replacement is a regex template: `$1`, `${name}`
/// and `$$` for a literal dollar sign.
pub fn rule(config: &CustomRuleConfig, keyword: &str) -> Result<Rule, RuleError> {
    let scope = if config.invocation_only {
        Scope::Invocation(keyword.to_string())
    } else {
        Scope::AnyLine
    };
    let template = config.replacement.clone();
    let rule = Rule::new(&config.name, &config.pattern, scope, move |caps| {
        let mut out = String::new();
        caps.expand(&template, &mut out);
        out
    })?;
    let rationale = if config.rationale.is_empty() {
        format!("custom rule {}", config.name)
    } else {
        config.rationale.clone()
    };
    Ok(rule.with_rationale(rationale, config.reference_url.clone()))
}
