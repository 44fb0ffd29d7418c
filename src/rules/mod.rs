//! Rule table and rule evaluation.
//!
//! A [`Rule`] pairs a phrase with a score and the node kinds it applies to.
//! The checks in [`feature_rules`], [`step_rules`] and [`hook_rules`] inspect
//! a node and report [`Violation`]s; the [`RulesEvaluator`] turns the
//! violations of enabled, targeted rules into score and histogram entries.

mod evaluator;
pub mod feature_rules;
pub mod hook_rules;
pub mod step_rules;

pub use evaluator::RulesEvaluator;

use crate::core::TargetKind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub const FATAL: u32 = 100;
pub const ERROR: u32 = 25;
pub const WARNING: u32 = 10;
pub const INFO: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    NoDescription,
    NumbersInDescription,
    EmptyFeature,
    BackgroundWithNoScenarios,
    BackgroundWithOneScenario,
    TooManyScenarios,
    SameTagOnAllScenarios,
    TooManyTags,
    DuplicateTag,
    CommentedTag,
    BackgroundWithTag,
    NoSteps,
    TooManySteps,
    OutOfOrderSteps,
    InvalidFirstStep,
    AsteriskStep,
    OneWordStep,
    CommentedStep,
    ImplementationWord,
    DateUsed,
    NoExamplesTable,
    NoExamples,
    OneExample,
    TooManyExamples,
    CommentedExample,
    NoCode,
    TooManyParameters,
    NestedStep,
    RecursiveNestedStep,
    UniversalMatch,
    CommentedCode,
    LazyDebugging,
    Pending,
    SmallSleep,
    LargeSleep,
    Todo,
    EmptyHook,
    HookAllComments,
    HookNoDebugging,
    HookConflictingTags,
    HookDuplicateTags,
    #[serde(rename = "around_hook_without_2_parameters")]
    AroundHookWithout2Parameters,
    AroundHookNoBlockCall,
}

impl RuleId {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::NoDescription => "no_description",
            RuleId::NumbersInDescription => "numbers_in_description",
            RuleId::EmptyFeature => "empty_feature",
            RuleId::BackgroundWithNoScenarios => "background_with_no_scenarios",
            RuleId::BackgroundWithOneScenario => "background_with_one_scenario",
            RuleId::TooManyScenarios => "too_many_scenarios",
            RuleId::SameTagOnAllScenarios => "same_tag_on_all_scenarios",
            RuleId::TooManyTags => "too_many_tags",
            RuleId::DuplicateTag => "duplicate_tag",
            RuleId::CommentedTag => "commented_tag",
            RuleId::BackgroundWithTag => "background_with_tag",
            RuleId::NoSteps => "no_steps",
            RuleId::TooManySteps => "too_many_steps",
            RuleId::OutOfOrderSteps => "out_of_order_steps",
            RuleId::InvalidFirstStep => "invalid_first_step",
            RuleId::AsteriskStep => "asterisk_step",
            RuleId::OneWordStep => "one_word_step",
            RuleId::CommentedStep => "commented_step",
            RuleId::ImplementationWord => "implementation_word",
            RuleId::DateUsed => "date_used",
            RuleId::NoExamplesTable => "no_examples_table",
            RuleId::NoExamples => "no_examples",
            RuleId::OneExample => "one_example",
            RuleId::TooManyExamples => "too_many_examples",
            RuleId::CommentedExample => "commented_example",
            RuleId::NoCode => "no_code",
            RuleId::TooManyParameters => "too_many_parameters",
            RuleId::NestedStep => "nested_step",
            RuleId::RecursiveNestedStep => "recursive_nested_step",
            RuleId::UniversalMatch => "universal_match",
            RuleId::CommentedCode => "commented_code",
            RuleId::LazyDebugging => "lazy_debugging",
            RuleId::Pending => "pending",
            RuleId::SmallSleep => "small_sleep",
            RuleId::LargeSleep => "large_sleep",
            RuleId::Todo => "todo",
            RuleId::EmptyHook => "empty_hook",
            RuleId::HookAllComments => "hook_all_comments",
            RuleId::HookNoDebugging => "hook_no_debugging",
            RuleId::HookConflictingTags => "hook_conflicting_tags",
            RuleId::HookDuplicateTags => "hook_duplicate_tags",
            RuleId::AroundHookWithout2Parameters => "around_hook_without_2_parameters",
            RuleId::AroundHookNoBlockCall => "around_hook_no_block_call",
        }
    }

    /// Conditions a rule cannot be checked without.
    pub fn required_conditions(&self) -> &'static [&'static str] {
        match self {
            RuleId::TooManyScenarios
            | RuleId::TooManyTags
            | RuleId::TooManySteps
            | RuleId::TooManyExamples
            | RuleId::TooManyParameters
            | RuleId::SmallSleep => &["max"],
            RuleId::LargeSleep => &["min"],
            _ => &[],
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub enabled: bool,
    /// May contain `{class}`, and `{tag}` or `{word}` for detail rules.
    pub phrase: String,
    pub score: u32,
    pub targets: BTreeSet<TargetKind>,
    #[serde(default)]
    pub conditions: BTreeMap<String, f64>,
    #[serde(default)]
    pub words: Vec<String>,
}

impl Rule {
    fn new(phrase: &str, score: u32, targets: &[TargetKind]) -> Self {
        Self {
            enabled: true,
            phrase: phrase.to_string(),
            score,
            targets: targets.iter().copied().collect(),
            conditions: BTreeMap::new(),
            words: Vec::new(),
        }
    }

    fn with_condition(mut self, key: &str, value: f64) -> Self {
        self.conditions.insert(key.to_string(), value);
        self
    }

    fn with_words(mut self, words: &[&str]) -> Self {
        self.words = words.iter().map(|w| w.to_string()).collect();
        self
    }

    pub fn applies_to(&self, kind: TargetKind) -> bool {
        self.enabled && self.targets.contains(&kind)
    }

    /// The phrase with `{class}` and the detail placeholders filled in.
    pub fn render(&self, kind: TargetKind, detail: Option<&str>) -> String {
        let phrase = self.phrase.replace("{class}", kind.as_str());
        match detail {
            Some(detail) => phrase.replace("{tag}", detail).replace("{word}", detail),
            None => phrase,
        }
    }
}

/// Partial rule settings, layered over the default table by configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleOverride {
    pub enabled: Option<bool>,
    pub phrase: Option<String>,
    pub score: Option<u32>,
    pub targets: Option<BTreeSet<TargetKind>>,
    pub conditions: Option<BTreeMap<String, f64>>,
    pub words: Option<Vec<String>>,
}

/// One evaluated rule firing, before it is scored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub rule: RuleId,
    /// Value substituted for `{tag}` / `{word}`.
    pub detail: Option<String>,
}

impl Violation {
    pub fn new(rule: RuleId) -> Self {
        Self { rule, detail: None }
    }

    pub fn with_detail(rule: RuleId, detail: impl Into<String>) -> Self {
        Self {
            rule,
            detail: Some(detail.into()),
        }
    }
}

/// The full rule table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleSet {
    rules: BTreeMap<RuleId, Rule>,
}

impl RuleSet {
    pub fn get(&self, id: RuleId) -> Option<&Rule> {
        self.rules.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RuleId, &Rule)> {
        self.rules.iter().map(|(id, rule)| (*id, rule))
    }

    pub fn enabled(&self) -> impl Iterator<Item = (RuleId, &Rule)> {
        self.iter().filter(|(_, rule)| rule.enabled)
    }

    pub fn condition(&self, id: RuleId, key: &str) -> Option<f64> {
        self.get(id).and_then(|rule| rule.conditions.get(key).copied())
    }

    pub fn with_overrides(mut self, overrides: &BTreeMap<RuleId, RuleOverride>) -> Self {
        for (id, changes) in overrides {
            let Some(rule) = self.rules.get_mut(id) else {
                continue;
            };
            if let Some(enabled) = changes.enabled {
                rule.enabled = enabled;
            }
            if let Some(phrase) = &changes.phrase {
                rule.phrase = phrase.clone();
            }
            if let Some(score) = changes.score {
                rule.score = score;
            }
            if let Some(targets) = &changes.targets {
                rule.targets = targets.clone();
            }
            if let Some(conditions) = &changes.conditions {
                rule.conditions.extend(conditions.clone());
            }
            if let Some(words) = &changes.words {
                rule.words = words.clone();
            }
        }
        self
    }

    pub fn disable(&mut self, id: RuleId) {
        if let Some(rule) = self.rules.get_mut(&id) {
            rule.enabled = false;
        }
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        use TargetKind::{Background, Feature, Hook, Scenario, StepDefinition};

        let table = [
            (
                RuleId::NoDescription,
                Rule::new("{class} has no description.", WARNING, &[Feature, Scenario]),
            ),
            (
                RuleId::NumbersInDescription,
                Rule::new(
                    "{class} has numbers in the description.",
                    WARNING,
                    &[Feature, Scenario, Background],
                ),
            ),
            (
                RuleId::EmptyFeature,
                Rule::new("Feature with no content.", WARNING, &[Feature]),
            ),
            (
                RuleId::BackgroundWithNoScenarios,
                Rule::new("Feature has a background with no scenarios.", WARNING, &[Feature]),
            ),
            (
                RuleId::BackgroundWithOneScenario,
                Rule::new("Feature has a background with one scenario.", WARNING, &[Feature]),
            ),
            (
                RuleId::TooManyScenarios,
                Rule::new("Feature with too many scenarios.", INFO, &[Feature])
                    .with_condition("max", 10.0),
            ),
            (
                RuleId::SameTagOnAllScenarios,
                Rule::new("Same tag appears on all scenarios: {tag}.", WARNING, &[Feature]),
            ),
            (
                RuleId::TooManyTags,
                Rule::new("{class} has too many tags.", INFO, &[Feature, Scenario])
                    .with_condition("max", 8.0),
            ),
            (
                RuleId::DuplicateTag,
                Rule::new("{class} has a duplicate tag: {tag}.", WARNING, &[Feature, Scenario]),
            ),
            (
                RuleId::CommentedTag,
                Rule::new(
                    "{class} has a commented out tag.",
                    INFO,
                    &[Feature, Scenario, Background],
                ),
            ),
            (
                RuleId::BackgroundWithTag,
                Rule::new(
                    "There is a background with a tag. This feature file cannot run!",
                    FATAL,
                    &[Background],
                ),
            ),
            (
                RuleId::NoSteps,
                Rule::new("No steps in {class}.", ERROR, &[Scenario, Background]),
            ),
            (
                RuleId::TooManySteps,
                Rule::new("{class} with too many steps.", WARNING, &[Scenario, Background])
                    .with_condition("max", 7.0),
            ),
            (
                RuleId::OutOfOrderSteps,
                Rule::new("Scenario steps out of Given/When/Then order.", WARNING, &[Scenario]),
            ),
            (
                RuleId::InvalidFirstStep,
                Rule::new(
                    "Invalid first step. Began with And/But.",
                    WARNING,
                    &[Scenario, Background],
                ),
            ),
            (
                RuleId::AsteriskStep,
                Rule::new(
                    "Step includes a * instead of Given/When/Then/And/But.",
                    WARNING,
                    &[Scenario, Background],
                ),
            ),
            (
                RuleId::OneWordStep,
                Rule::new("Step that is only one word long.", ERROR, &[Scenario, Background]),
            ),
            (
                RuleId::CommentedStep,
                Rule::new("Commented step.", ERROR, &[Scenario, Background]),
            ),
            (
                RuleId::ImplementationWord,
                Rule::new("Implementation word used: {word}.", INFO, &[Scenario, Background])
                    .with_words(&[
                        "page",
                        "site",
                        "url",
                        "drop down",
                        "dropdown",
                        "select list",
                        "click",
                        "text box",
                        "radio button",
                        "check box",
                        "xml",
                        "window",
                        "pop up",
                        "pop-up",
                        "screen",
                        "tab",
                        "database",
                        "DB",
                    ]),
            ),
            (
                RuleId::DateUsed,
                Rule::new("Date used.", INFO, &[Scenario, Background]),
            ),
            (
                RuleId::NoExamplesTable,
                Rule::new("Scenario Outline with no examples table.", ERROR, &[Scenario]),
            ),
            (
                RuleId::NoExamples,
                Rule::new("Scenario Outline with no examples.", WARNING, &[Scenario]),
            ),
            (
                RuleId::OneExample,
                Rule::new("Scenario Outline with only one example.", WARNING, &[Scenario]),
            ),
            (
                RuleId::TooManyExamples,
                Rule::new("Scenario Outline with too many examples.", WARNING, &[Scenario])
                    .with_condition("max", 10.0),
            ),
            (
                RuleId::CommentedExample,
                Rule::new("Comment line in Examples table.", INFO, &[Scenario]),
            ),
            (
                RuleId::NoCode,
                Rule::new("No code in Step Definition.", ERROR, &[StepDefinition]),
            ),
            (
                RuleId::TooManyParameters,
                Rule::new("Too many parameters in Step Definition.", WARNING, &[StepDefinition])
                    .with_condition("max", 4.0),
            ),
            (
                RuleId::NestedStep,
                Rule::new("Nested step call.", INFO, &[StepDefinition]),
            ),
            (
                RuleId::RecursiveNestedStep,
                Rule::new("Recursive nested step call.", FATAL, &[StepDefinition]),
            ),
            (
                RuleId::UniversalMatch,
                Rule::new("Step definition matches every step.", ERROR, &[StepDefinition]),
            ),
            (
                RuleId::CommentedCode,
                Rule::new("Commented code in {class}.", INFO, &[StepDefinition, Hook]),
            ),
            (
                RuleId::LazyDebugging,
                Rule::new(
                    "Lazy debugging through puts, p, or print.",
                    WARNING,
                    &[StepDefinition, Hook],
                ),
            ),
            (
                RuleId::Pending,
                Rule::new(
                    "Pending step definition. Implement or remove.",
                    WARNING,
                    &[StepDefinition],
                ),
            ),
            (
                RuleId::SmallSleep,
                Rule::new(
                    "Small sleeps used. Use a wait_until like method.",
                    INFO,
                    &[StepDefinition],
                )
                .with_condition("max", 2.0),
            ),
            (
                RuleId::LargeSleep,
                Rule::new(
                    "Large sleeps used. Use a wait_until like method.",
                    INFO,
                    &[StepDefinition],
                )
                .with_condition("min", 2.0),
            ),
            (
                RuleId::Todo,
                Rule::new("Todo found. Resolve it.", INFO, &[StepDefinition, Hook]),
            ),
            (
                RuleId::EmptyHook,
                Rule::new("Hook with no content.", FATAL, &[Hook]),
            ),
            (
                RuleId::HookAllComments,
                Rule::new("Hook is only comments.", ERROR, &[Hook]),
            ),
            (
                RuleId::HookNoDebugging,
                Rule::new(
                    "Hook without a begin/rescue. Reduced visibility when debugging.",
                    INFO,
                    &[Hook],
                ),
            ),
            (
                RuleId::HookConflictingTags,
                Rule::new(
                    "Hook that both expects and ignores the same tag. This hook will not function as expected.",
                    ERROR,
                    &[Hook],
                ),
            ),
            (
                RuleId::HookDuplicateTags,
                Rule::new("Hook has duplicate tags.", WARNING, &[Hook]),
            ),
            (
                RuleId::AroundHookWithout2Parameters,
                Rule::new(
                    "Around hook without 2 parameters for Scenario and Block.",
                    FATAL,
                    &[Hook],
                ),
            ),
            (
                RuleId::AroundHookNoBlockCall,
                Rule::new("Around hook does not call its block.", FATAL, &[Hook]),
            ),
        ];

        Self {
            rules: table.into_iter().collect(),
        }
    }
}
