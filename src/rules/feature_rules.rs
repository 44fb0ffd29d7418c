//! Checks for features, backgrounds and scenarios.

use super::{RuleId, RulesEvaluator, Violation};
use crate::core::{Feature, Scenario};
use crate::patterns::{self, COMMENTED_STEP, DATE};
use std::collections::BTreeSet;

fn at_least(count: usize, limit: Option<f64>) -> bool {
    limit.is_some_and(|limit| count as f64 >= limit)
}

fn has_digit(name: &str) -> bool {
    name.chars().any(|c| c.is_ascii_digit())
}

fn is_commented_tag(tag: &str) -> bool {
    tag.starts_with('#')
}

/// Each tag that occurs more than once, in order of its first repeat.
fn duplicate_tags(tags: &[String]) -> Vec<&str> {
    let mut seen = BTreeSet::new();
    let mut reported = BTreeSet::new();
    tags.iter()
        .map(String::as_str)
        .filter(|tag| !seen.insert(*tag) && reported.insert(*tag))
        .collect()
}

fn description_checks(name: &str, violations: &mut Vec<Violation>) {
    if name.trim().is_empty() {
        violations.push(Violation::new(RuleId::NoDescription));
    }
    if has_digit(name) {
        violations.push(Violation::new(RuleId::NumbersInDescription));
    }
}

fn tag_checks(
    all_tags: &[String],
    own_tags: &[String],
    rules: &RulesEvaluator,
    violations: &mut Vec<Violation>,
) {
    if at_least(all_tags.len(), rules.condition(RuleId::TooManyTags, "max")) {
        violations.push(Violation::new(RuleId::TooManyTags));
    }
    violations.extend(
        duplicate_tags(all_tags)
            .into_iter()
            .map(|tag| Violation::with_detail(RuleId::DuplicateTag, tag)),
    );
    violations.extend(
        own_tags
            .iter()
            .filter(|tag| is_commented_tag(tag))
            .map(|_| Violation::new(RuleId::CommentedTag)),
    );
}

pub fn check_feature(feature: &Feature, rules: &RulesEvaluator) -> Vec<Violation> {
    let mut violations = Vec::new();

    description_checks(&feature.name, &mut violations);

    match (&feature.background, feature.scenarios.len()) {
        (None, 0) => violations.push(Violation::new(RuleId::EmptyFeature)),
        (Some(_), 0) => violations.push(Violation::new(RuleId::BackgroundWithNoScenarios)),
        (Some(_), 1) => violations.push(Violation::new(RuleId::BackgroundWithOneScenario)),
        _ => {}
    }

    if at_least(
        feature.scenarios.len(),
        rules.condition(RuleId::TooManyScenarios, "max"),
    ) {
        violations.push(Violation::new(RuleId::TooManyScenarios));
    }

    violations.extend(
        shared_scenario_tags(feature)
            .into_iter()
            .map(|tag| Violation::with_detail(RuleId::SameTagOnAllScenarios, tag)),
    );

    tag_checks(&feature.tags, &feature.tags, rules, &mut violations);
    violations
}

/// Tags every scenario carries itself (not through the feature), when there
/// are at least two scenarios.
fn shared_scenario_tags(feature: &Feature) -> Vec<String> {
    if feature.scenarios.len() < 2 {
        return Vec::new();
    }

    let inherited = feature.tags.len();
    let own = |scenario: &Scenario| -> Vec<String> {
        let end = scenario.tags.len().saturating_sub(inherited);
        scenario.tags[..end].to_vec()
    };

    let first = own(&feature.scenarios[0]);
    let mut shared: Vec<String> = Vec::new();
    for tag in first {
        if is_commented_tag(&tag) || shared.contains(&tag) {
            continue;
        }
        if feature.scenarios[1..]
            .iter()
            .all(|scenario| own(scenario).contains(&tag))
        {
            shared.push(tag);
        }
    }
    shared
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum StepRank {
    Given,
    When,
    Then,
}

fn rank_of(keyword: &str) -> Option<StepRank> {
    match keyword {
        "Given" => Some(StepRank::Given),
        "When" => Some(StepRank::When),
        "Then" => Some(StepRank::Then),
        _ => None,
    }
}

/// Whether the live steps ever step back in Given/When/Then order.
/// Continuation keywords take the rank of the step before them.
fn out_of_order(keywords: &[&str]) -> bool {
    let mut current: Option<StepRank> = None;
    for keyword in keywords {
        if let Some(rank) = rank_of(keyword) {
            if current.is_some_and(|previous| rank < previous) {
                return true;
            }
            current = Some(rank);
        }
    }
    false
}

/// `inherited_tags` is the number of trailing tags copied from the feature.
pub fn check_scenario(
    scenario: &Scenario,
    inherited_tags: usize,
    rules: &RulesEvaluator,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    description_checks(&scenario.name, &mut violations);

    let own_end = scenario.tags.len().saturating_sub(inherited_tags);
    tag_checks(&scenario.tags, &scenario.tags[..own_end], rules, &mut violations);
    if !scenario.tags.is_empty() {
        violations.push(Violation::new(RuleId::BackgroundWithTag));
    }

    step_checks(scenario, rules, &mut violations);
    if scenario.is_outline() {
        example_checks(scenario, rules, &mut violations);
    }

    violations
}

fn step_checks(scenario: &Scenario, rules: &RulesEvaluator, violations: &mut Vec<Violation>) {
    let live: Vec<&str> = scenario.live_steps().map(|(step, _)| step).collect();

    if live.is_empty() {
        violations.push(Violation::new(RuleId::NoSteps));
    }
    if at_least(live.len(), rules.condition(RuleId::TooManySteps, "max")) {
        violations.push(Violation::new(RuleId::TooManySteps));
    }

    let keywords: Vec<&str> = live
        .iter()
        .filter_map(|step| patterns::split_step(step).map(|(keyword, _)| keyword))
        .collect();
    if out_of_order(&keywords) {
        violations.push(Violation::new(RuleId::OutOfOrderSteps));
    }
    if matches!(keywords.first(), Some(&"And") | Some(&"But")) {
        violations.push(Violation::new(RuleId::InvalidFirstStep));
    }
    violations.extend(
        keywords
            .iter()
            .filter(|keyword| **keyword == "*")
            .map(|_| Violation::new(RuleId::AsteriskStep)),
    );

    for step in &live {
        let words = patterns::split_step(step).map(|(_, text)| text.split_whitespace().count());
        if words == Some(1) {
            violations.push(Violation::new(RuleId::OneWordStep));
        }
        for (word, pattern) in rules.implementation_words() {
            if pattern.is_match(step) {
                violations.push(Violation::with_detail(RuleId::ImplementationWord, word.as_str()));
            }
        }
        if DATE.is_match(step) {
            violations.push(Violation::new(RuleId::DateUsed));
        }
    }

    violations.extend(
        scenario
            .steps
            .iter()
            .filter(|step| COMMENTED_STEP.is_match(step))
            .map(|_| Violation::new(RuleId::CommentedStep)),
    );
}

fn example_checks(scenario: &Scenario, rules: &RulesEvaluator, violations: &mut Vec<Violation>) {
    if scenario.examples_table.is_empty() {
        violations.push(Violation::new(RuleId::NoExamplesTable));
        return;
    }

    let (_, rows) = scenario.example_rows();
    let live_rows = rows.iter().filter(|row| !row.commented).count();
    match live_rows {
        0 => violations.push(Violation::new(RuleId::NoExamples)),
        1 => violations.push(Violation::new(RuleId::OneExample)),
        _ => {}
    }
    if at_least(live_rows, rules.condition(RuleId::TooManyExamples, "max")) {
        violations.push(Violation::new(RuleId::TooManyExamples));
    }

    violations.extend(
        (0..scenario.commented_examples()).map(|_| Violation::new(RuleId::CommentedExample)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_feature;
    use crate::rules::RuleSet;
    use indoc::indoc;

    fn evaluator() -> RulesEvaluator {
        RulesEvaluator::new(RuleSet::default()).unwrap()
    }

    fn fired(violations: &[Violation], rule: RuleId) -> usize {
        violations.iter().filter(|v| v.rule == rule).count()
    }

    #[test]
    fn test_out_of_order() {
        assert!(!out_of_order(&["Given", "And", "When", "Then", "But"]));
        assert!(out_of_order(&["Given", "Then", "When"]));
        assert!(out_of_order(&["When", "And", "Given"]));
        assert!(!out_of_order(&["*", "Then"]));
    }

    #[test]
    fn test_duplicate_tags_reported_once_each() {
        let tags: Vec<String> = ["@a", "@b", "@a", "@a", "@b", "@c"]
            .iter()
            .map(|t| t.to_string())
            .collect();
        assert_eq!(duplicate_tags(&tags), vec!["@a", "@b"]);
    }

    #[test]
    fn test_feature_checks() {
        let text = indoc! {"
            @smoke @smoke
            Feature: Release 2 checks
              Background:
                Given the app

              @wip
              Scenario: One
                Given a thing
        "};
        let feature = parse_feature("f.feature", text);
        let violations = check_feature(&feature, &evaluator());

        assert_eq!(fired(&violations, RuleId::NumbersInDescription), 1);
        assert_eq!(fired(&violations, RuleId::BackgroundWithOneScenario), 1);
        assert_eq!(fired(&violations, RuleId::DuplicateTag), 1);
        assert_eq!(fired(&violations, RuleId::SameTagOnAllScenarios), 0);
        assert_eq!(fired(&violations, RuleId::NoDescription), 0);
    }

    #[test]
    fn test_same_tag_on_all_scenarios() {
        let text = indoc! {"
            @feature
            Feature: Tags
              @slow @ui
              Scenario: A
                Given a
              @slow
              Scenario: B
                Given b
        "};
        let feature = parse_feature("f.feature", text);
        assert_eq!(shared_scenario_tags(&feature), vec!["@slow"]);
    }

    #[test]
    fn test_scenario_step_checks() {
        let text = indoc! {"
            Feature: Steps
              Scenario: Busy
                And I click the submit button on 12/25/2024
                # Given a commented step
                * something
                Then Done
                When later
        "};
        let feature = parse_feature("f.feature", text);
        let violations = check_scenario(&feature.scenarios[0], 0, &evaluator());

        assert_eq!(fired(&violations, RuleId::InvalidFirstStep), 1);
        assert_eq!(fired(&violations, RuleId::CommentedStep), 1);
        assert_eq!(fired(&violations, RuleId::AsteriskStep), 1);
        assert_eq!(fired(&violations, RuleId::OutOfOrderSteps), 1);
        assert_eq!(fired(&violations, RuleId::DateUsed), 1);
        assert_eq!(fired(&violations, RuleId::OneWordStep), 3);
        let words: Vec<&str> = violations
            .iter()
            .filter(|v| v.rule == RuleId::ImplementationWord)
            .filter_map(|v| v.detail.as_deref())
            .collect();
        assert_eq!(words, vec!["click"]);
    }

    #[test]
    fn test_outline_checks() {
        let text = indoc! {"
            Feature: Outlines
              Scenario Outline: Only one
                Given <x>
                Examples:
                  | x |
                  | 1 |
                  # | 2 |

              Scenario Outline: None
                Given <x>
        "};
        let feature = parse_feature("f.feature", text);
        let one = check_scenario(&feature.scenarios[0], 0, &evaluator());
        assert_eq!(fired(&one, RuleId::OneExample), 1);
        assert_eq!(fired(&one, RuleId::CommentedExample), 1);
        assert_eq!(fired(&one, RuleId::NoExamplesTable), 0);

        let none = check_scenario(&feature.scenarios[1], 0, &evaluator());
        assert_eq!(fired(&none, RuleId::NoExamplesTable), 1);
    }

    #[test]
    fn test_one_word_step_ignores_keyword() {
        let text = indoc! {"
            Feature: F
              Scenario: Short
                Given login
                When I act
                Then it works
        "};
        let feature = parse_feature("f.feature", text);
        let violations = check_scenario(&feature.scenarios[0], 0, &evaluator());
        assert_eq!(fired(&violations, RuleId::OneWordStep), 1);
    }

    #[test]
    fn test_multi_word_steps_are_not_one_word() {
        let text = "Feature: F\n  Scenario: S\n    Given I log in\n    Then I see it\n";
        let feature = parse_feature("f.feature", text);
        let violations = check_scenario(&feature.scenarios[0], 0, &evaluator());
        assert_eq!(fired(&violations, RuleId::OneWordStep), 0);
    }
    fn scenario_with(tags: usize, steps: usize) -> Scenario {
        let tag_line: Vec<String> = (1..=tags).map(|i| format!("@tag{i}")).collect();
        let mut text = format!("Feature: F\n  {}\n  Scenario: S\n", tag_line.join(" "));
        for i in 0..steps {
            text.push_str(&format!("    Given step {i} happens\n"));
        }
        parse_feature("f.feature", &text).scenarios.remove(0)
    }

    #[test]
    fn test_too_many_tags_fires_at_limit() {
        let below = check_scenario(&scenario_with(7, 1), 0, &evaluator());
        assert_eq!(fired(&below, RuleId::TooManyTags), 0);
        let at = check_scenario(&scenario_with(8, 1), 0, &evaluator());
        assert_eq!(fired(&at, RuleId::TooManyTags), 1);
    }

    #[test]
    fn test_too_many_steps_fires_at_limit() {
        let below = check_scenario(&scenario_with(0, 6), 0, &evaluator());
        assert_eq!(fired(&below, RuleId::TooManySteps), 0);
        let at = check_scenario(&scenario_with(0, 7), 0, &evaluator());
        assert_eq!(fired(&at, RuleId::TooManySteps), 1);
    }

    #[test]
    fn test_too_many_scenarios_fires_at_limit() {
        let feature_with = |count: usize| {
            let mut text = String::from("Feature: F\n");
            for _ in 0..count {
                text.push_str("  Scenario: S\n    Given a thing\n");
            }
            parse_feature("f.feature", &text)
        };
        let below = check_feature(&feature_with(9), &evaluator());
        assert_eq!(fired(&below, RuleId::TooManyScenarios), 0);
        let at = check_feature(&feature_with(10), &evaluator());
        assert_eq!(fired(&at, RuleId::TooManyScenarios), 1);
    }

    #[test]
    fn test_too_many_examples_fires_at_limit() {
        let outline_with = |rows: usize| {
            let mut text =
                String::from("Feature: F\n  Scenario Outline: S\n    Given <x> things\n    Examples:\n      | x |\n");
            for i in 0..rows {
                text.push_str(&format!("      | {i} |\n"));
            }
            parse_feature("f.feature", &text).scenarios.remove(0)
        };
        let below = check_scenario(&outline_with(9), 0, &evaluator());
        assert_eq!(fired(&below, RuleId::TooManyExamples), 0);
        let at = check_scenario(&outline_with(10), 0, &evaluator());
        assert_eq!(fired(&at, RuleId::TooManyExamples), 1);
    }
}
