use std::collections::BTreeMap;

use super::{Rule, RuleError, Scope, alternation, group, reference};

pub const NAME: &str = "full-deprecation";

/// Comment out invocations of discontinued main commands.
///
/// The whole line becomes a comment annotated with the command's rationale,
/// since there is nothing to rewrite it to. Indentation is kept.
pub fn rule(
    keyword: &str,
    discontinued: &BTreeMap<String, String>,
    base_url: &str,
) -> Result<Option<Rule>, RuleError> {
    if discontinued.is_empty() {
        return Ok(None);
    }
    let pattern = format!(
        r"^(?P<indent>\s*)(?P<code>(?i:{kw})\s+(?P<command>{names})(?:\s.*)?)$",
        kw = regex::escape(keyword),
        names = alternation(discontinued.keys().map(String::as_str)),
    );
    let url = reference(base_url, NAME);
    let rationales = discontinued.clone();
    let link = url.clone();

    let rule = Rule::new(NAME, &pattern, Scope::Invocation(keyword.to_string()), move |caps| {
        let command = group(caps, "command");
        let why = rationales
            .get(command)
            .map_or("command discontinued", String::as_str);
        let mut out = format!(
            "{}# {} # discontinued: {why}",
            group(caps, "indent"),
            group(caps, "code").trim_end()
        );
        if !link.is_empty() {
            out.push_str(&format!(" ({link})"));
        }
        out
    })?;

    Ok(Some(rule.with_rationale(
        "command discontinued with no replacement",
        url,
    )))
}
