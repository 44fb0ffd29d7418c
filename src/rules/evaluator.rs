use super::{feature_rules, hook_rules, step_rules, RuleId, RuleSet, Violation};
use crate::core::{Feature, Hook, RuleTarget, Scenario, StepDefinition};
use crate::errors::{Error, Result};
use rayon::prelude::*;
use regex::Regex;

/// Scores nodes against a validated rule table.
#[derive(Debug, Clone)]
pub struct RulesEvaluator {
    rules: RuleSet,
    implementation_words: Vec<(String, Regex)>,
}

impl RulesEvaluator {
    pub fn new(rules: RuleSet) -> Result<Self> {
        validate(&rules)?;

        let implementation_words = match rules.get(RuleId::ImplementationWord) {
            Some(rule) if rule.enabled => rule
                .words
                .iter()
                .map(|word| {
                    let pattern = format!(r"(?i)\b{}\b", regex::escape(word));
                    Regex::new(&pattern)
                        .map(|regex| (word.clone(), regex))
                        .map_err(|source| Error::Pattern { pattern, source })
                })
                .collect::<Result<Vec<_>>>()?,
            _ => Vec::new(),
        };

        Ok(Self {
            rules,
            implementation_words,
        })
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub(crate) fn condition(&self, id: RuleId, key: &str) -> Option<f64> {
        self.rules.condition(id, key)
    }

    pub(crate) fn implementation_words(&self) -> &[(String, Regex)] {
        &self.implementation_words
    }

    /// Scores the feature, its background and every scenario.
    pub fn evaluate_feature(&self, feature: &mut Feature) {
        let violations = feature_rules::check_feature(feature, self);
        self.apply(feature, violations);

        let inherited = feature.tags.len();
        if let Some(background) = feature.background.as_mut() {
            self.evaluate_scenario(background, 0);
        }
        for scenario in &mut feature.scenarios {
            self.evaluate_scenario(scenario, inherited);
        }
    }

    fn evaluate_scenario(&self, scenario: &mut Scenario, inherited_tags: usize) {
        let violations = feature_rules::check_scenario(scenario, inherited_tags, self);
        self.apply(scenario, violations);
    }

    pub fn evaluate_step_definition(&self, definition: &mut StepDefinition) {
        let violations = step_rules::check_step_definition(definition, self);
        self.apply(definition, violations);
    }

    pub fn evaluate_hook(&self, hook: &mut Hook) {
        let violations = hook_rules::check_hook(hook);
        self.apply(hook, violations);
    }

    /// Scores every node of a suite. Nodes are independent, so each kind is
    /// evaluated in parallel.
    pub fn evaluate_suite(
        &self,
        features: &mut [Feature],
        definitions: &mut [StepDefinition],
        hooks: &mut [Hook],
    ) {
        let _span = tracing::info_span!(
            "evaluate",
            features = features.len(),
            step_definitions = definitions.len(),
            hooks = hooks.len()
        )
        .entered();

        features
            .par_iter_mut()
            .for_each(|feature| self.evaluate_feature(feature));
        definitions
            .par_iter_mut()
            .for_each(|definition| self.evaluate_step_definition(definition));
        hooks.par_iter_mut().for_each(|hook| self.evaluate_hook(hook));
    }

    fn apply<T: RuleTarget>(&self, target: &mut T, violations: Vec<Violation>) {
        let kind = target.kind();
        for violation in violations {
            let Some(rule) = self.rules.get(violation.rule) else {
                continue;
            };
            if !rule.applies_to(kind) {
                continue;
            }
            let phrase = rule.render(kind, violation.detail.as_deref());
            target.store_rule(&phrase, rule.score);
        }
    }
}

fn validate(rules: &RuleSet) -> Result<()> {
    if rules.enabled().next().is_none() {
        return Err(Error::configuration("no rules are enabled"));
    }

    for (id, rule) in rules.enabled() {
        if rule.targets.is_empty() {
            return Err(Error::configuration(format!(
                "rule `{id}` is enabled but has no targets"
            )));
        }
        if let Some(missing) = id
            .required_conditions()
            .iter()
            .find(|key| !rule.conditions.contains_key(**key))
        {
            return Err(Error::configuration(format!(
                "rule `{id}` requires the `{missing}` condition"
            )));
        }
    }

    Ok(())
}
