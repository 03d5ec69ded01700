use std::collections::BTreeMap;

use super::{Rule, RuleError, Scope, alternation, group, invocation_head};

/// Renamed resources (old main command → new main command).
pub const RESOURCE_RENAME: &str = "resource-rename";
/// Consolidated aliases (alias → canonical main command).
pub const ALIAS: &str = "alias-consolidation";

/// Substitute the main command word of an invocation through `names`.
///
/// Only the word directly after the keyword is considered, and only as a
/// whole word; arguments that happen to equal an old name are left alone.
pub fn rule(
    name: &str,
    keyword: &str,
    names: BTreeMap<String, String>,
    rationale: &str,
    reference_url: &str,
) -> Result<Option<Rule>, RuleError> {
    if names.is_empty() {
        return Ok(None);
    }
    let pattern = format!(
        r"{head}(?P<command>{names})(?P<tail>\s|$)",
        head = invocation_head(keyword),
        names = alternation(names.keys().map(String::as_str)),
    );

    let rule = Rule::new(name, &pattern, Scope::Invocation(keyword.to_string()), move |caps| {
        let command = group(caps, "command");
        let replacement = names.get(command).map_or(command, String::as_str);
        format!("{}{}{}", group(caps, "head"), replacement, group(caps, "tail"))
    })?;
    Ok(Some(rule.with_rationale(rationale, reference_url)))
}
