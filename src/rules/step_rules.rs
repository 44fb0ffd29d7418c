//! Checks for step definitions, plus the body checks shared with hooks.

use super::{RuleId, RulesEvaluator, Violation};
use crate::core::StepDefinition;
use crate::patterns::{self, LAZY_DEBUGGING, PENDING, SLEEP_CALL, TODO_COMMENT, UNIVERSAL_PATTERN};

/// Commented code, debugging output and todo markers in a body.
pub(crate) fn body_smells(body: &[String]) -> Vec<Violation> {
    let mut violations = Vec::new();
    for line in body {
        if TODO_COMMENT.is_match(line) {
            violations.push(Violation::new(RuleId::Todo));
        } else if patterns::is_comment(line) {
            violations.push(Violation::new(RuleId::CommentedCode));
        } else if LAZY_DEBUGGING.is_match(line) {
            violations.push(Violation::new(RuleId::LazyDebugging));
        }
    }
    violations
}

fn sleep_checks(definition: &StepDefinition, rules: &RulesEvaluator) -> Vec<Violation> {
    let small_max = rules.condition(RuleId::SmallSleep, "max");
    let large_min = rules.condition(RuleId::LargeSleep, "min");

    definition
        .code_lines()
        .filter_map(|line| SLEEP_CALL.captures(line))
        .filter_map(|captures| captures["seconds"].parse::<f64>().ok())
        .flat_map(|seconds| {
            let small = small_max
                .is_some_and(|max| seconds <= max)
                .then(|| Violation::new(RuleId::SmallSleep));
            let large = large_min
                .is_some_and(|min| seconds > min)
                .then(|| Violation::new(RuleId::LargeSleep));
            small.into_iter().chain(large)
        })
        .collect()
}

pub fn check_step_definition(definition: &StepDefinition, rules: &RulesEvaluator) -> Vec<Violation> {
    let mut violations = Vec::new();

    if definition.code_lines().next().is_none() {
        violations.push(Violation::new(RuleId::NoCode));
    }

    if rules
        .condition(RuleId::TooManyParameters, "max")
        .is_some_and(|max| definition.parameters.len() as f64 >= max)
    {
        violations.push(Violation::new(RuleId::TooManyParameters));
    }

    for text in definition.nested_steps.values() {
        violations.push(Violation::new(RuleId::NestedStep));
        if definition.matches(text) {
            violations.push(Violation::new(RuleId::RecursiveNestedStep));
        }
    }

    if UNIVERSAL_PATTERN.is_match(&definition.pattern_source) {
        violations.push(Violation::new(RuleId::UniversalMatch));
    }

    violations.extend(body_smells(&definition.body_lines));

    if definition.code_lines().any(|line| PENDING.is_match(line)) {
        violations.push(Violation::new(RuleId::Pending));
    }

    violations.extend(sleep_checks(definition, rules));
    violations
}
