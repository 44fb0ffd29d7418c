use super::step_rules::body_smells;
use super::{RuleId, Violation};
use crate::core::{Hook, HookKind};
use crate::patterns::{self, BEGIN_BLOCK, RESCUE_CLAUSE, TAG_EXPRESSION_TOKEN};
use std::collections::BTreeSet;

/// `(negated, tag)` for every tag mentioned by the hook's filters.
fn tag_tokens(hook: &Hook) -> Vec<(bool, String)> {
    hook.tag_filters
        .iter()
        .flat_map(|filter| TAG_EXPRESSION_TOKEN.captures_iter(filter))
        .map(|captures| {
            (
                captures.name("negation").is_some(),
                captures["tag"].to_string(),
            )
        })
        .collect()
}

pub fn check_hook(hook: &Hook) -> Vec<Violation> {
    let mut violations = Vec::new();

    let non_blank = hook.body_lines.iter().filter(|line| !line.trim().is_empty());
    if non_blank.clone().next().is_none() {
        violations.push(Violation::new(RuleId::EmptyHook));
    } else if non_blank.clone().all(|line| patterns::is_comment(line)) {
        violations.push(Violation::new(RuleId::HookAllComments));
    }

    let has_code = hook.code_lines().next().is_some();
    let has_begin = hook.code_lines().any(|line| BEGIN_BLOCK.is_match(line));
    let has_rescue = hook.code_lines().any(|line| RESCUE_CLAUSE.is_match(line));
    if has_code && !(has_begin && has_rescue) {
        violations.push(Violation::new(RuleId::HookNoDebugging));
    }

    let tokens = tag_tokens(hook);
    let expected: BTreeSet<&str> = tokens
        .iter()
        .filter(|(negated, _)| !negated)
        .map(|(_, tag)| tag.as_str())
        .collect();
    if tokens
        .iter()
        .any(|(negated, tag)| *negated && expected.contains(tag.as_str()))
    {
        violations.push(Violation::new(RuleId::HookConflictingTags));
    }
    let distinct: BTreeSet<&(bool, String)> = tokens.iter().collect();
    if distinct.len() < tokens.len() {
        violations.push(Violation::new(RuleId::HookDuplicateTags));
    }

    if hook.kind == HookKind::Around {
        if hook.parameters.len() != 2 {
            violations.push(Violation::new(RuleId::AroundHookWithout2Parameters));
        }
        if let Some(block) = hook.parameters.get(1) {
            let call = format!("{block}.call");
            if !hook.code_lines().any(|line| line.contains(&call)) {
                violations.push(Violation::new(RuleId::AroundHookNoBlockCall));
            }
        }
    }

    violations.extend(body_smells(&hook.body_lines));
    violations
}
