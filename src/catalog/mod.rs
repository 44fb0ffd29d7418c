//! Step call cataloging.
//!
//! Every concrete step invocation in the suite (feature steps, expanded
//! outline rows and nested calls) is gathered into a [`StepUniverse`]. Each
//! step definition then records which of those invocations it matches; a
//! definition that matches none is dead.

mod dead_steps;
pub mod matcher;

pub use dead_steps::DeadSteps;

use crate::core::{Feature, Scenario, StepDefinition, StepLocation};
use crate::patterns::OUTLINE_PLACEHOLDER;
use rayon::prelude::*;
use regex::{Captures, Regex};
use std::collections::BTreeMap;

/// All step invocations of a suite, keyed by where they happen.
#[derive(Debug, Clone, Default)]
pub struct StepUniverse {
    steps: BTreeMap<StepLocation, String>,
    /// Interpolated steps with their fuzzy pattern, for the second pass.
    interpolated: Vec<(StepLocation, Regex)>,
}

impl StepUniverse {
    pub fn build(features: &[Feature], definitions: &[StepDefinition]) -> Self {
        let mut steps = BTreeMap::new();

        for feature in features {
            for scenario in feature.all_scenarios() {
                if scenario.is_outline() {
                    steps.extend(concrete_steps(scenario));
                } else {
                    let location = &scenario.card.location;
                    steps.extend(scenario.live_steps().map(|(step, line)| {
                        (StepLocation::new(location.at_line(line)), step.to_string())
                    }));
                }
            }
        }

        for definition in definitions {
            steps.extend(
                definition
                    .nested_steps
                    .iter()
                    .map(|(location, text)| (StepLocation::new(location.clone()), text.clone())),
            );
        }

        let interpolated = steps
            .iter()
            .filter_map(|(location, text)| {
                matcher::fuzzy_pattern(text).map(|pattern| (location.clone(), pattern))
            })
            .collect();

        Self {
            steps,
            interpolated,
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, location: &StepLocation) -> Option<&str> {
        self.steps.get(location).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StepLocation, &str)> {
        self.steps.iter().map(|(location, text)| (location, text.as_str()))
    }

    /// Records every invocation the definition's pattern matches.
    fn catalog_exact(&self, definition: &mut StepDefinition) {
        let matched: Vec<(StepLocation, String)> = self
            .steps
            .iter()
            .filter(|(_, text)| definition.matches(text))
            .map(|(location, text)| (location.clone(), text.clone()))
            .collect();
        for (location, text) in matched {
            definition.add_call(location, text);
        }
    }

    /// Records interpolated invocations that could reach the definition.
    fn catalog_fuzzy(&self, definition: &mut StepDefinition) {
        let source = matcher::strip_anchors(&definition.pattern_source).to_string();
        for (location, pattern) in &self.interpolated {
            if pattern.is_match(&source) {
                if let Some(text) = self.steps.get(location) {
                    definition.add_call(location.clone(), text.clone());
                }
            }
        }
    }
}

/// The steps of an outline expanded once per live example row, placeholders
/// substituted. Locations carry the 1-based row number.
pub fn concrete_steps(scenario: &Scenario) -> Vec<(StepLocation, String)> {
    let (header, rows) = scenario.example_rows();
    let location = &scenario.card.location;

    rows.iter()
        .filter(|row| !row.commented)
        .flat_map(|row| {
            let header = &header;
            scenario.live_steps().map(move |(step, line)| {
                let text = OUTLINE_PLACEHOLDER.replace_all(step, |captures: &Captures| {
                    header
                        .iter()
                        .position(|name| name == &captures[1])
                        .and_then(|column| row.cells.get(column))
                        .cloned()
                        .unwrap_or_else(|| captures[0].to_string())
                });
                (
                    StepLocation::example(location.at_line(line), row.number),
                    text.into_owned(),
                )
            })
        })
        .collect()
}

/// Fills in `calls` for every definition. Definitions with no exact match
/// get a second, fuzzy pass against interpolated invocations.
pub fn catalog_step_definitions(definitions: &mut [StepDefinition], universe: &StepUniverse) {
    let _span = tracing::debug_span!("catalog", definitions = definitions.len(), steps = universe.len())
        .entered();

    definitions.par_iter_mut().for_each(|definition| {
        universe.catalog_exact(definition);
        if definition.is_dead() {
            universe.catalog_fuzzy(definition);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_feature, parse_step_definitions};
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    const OUTLINE: &str = indoc! {r#"
        Feature: Outlines
          Scenario Outline: Adding
            Given the first number is "<a>"
            # Given a comment
            And the second number is "<b>"

            Examples:
              | a | b |
              | 1 | 2 |
              # | 3 | 4 |
              | 5 | 6 |
    "#};

    #[test]
    fn test_concrete_steps_expand_live_rows() {
        let feature = parse_feature("f.feature", OUTLINE);
        let steps = concrete_steps(&feature.scenarios[0]);

        assert_eq!(steps.len(), (3 - 1) * 2);
        let rendered: Vec<String> = steps
            .iter()
            .map(|(location, text)| format!("{location} {text}"))
            .collect();
        assert_eq!(
            rendered,
            vec![
                r#"f.feature:3(Example 1) Given the first number is "1""#,
                r#"f.feature:5(Example 1) And the second number is "2""#,
                r#"f.feature:3(Example 3) Given the first number is "5""#,
                r#"f.feature:5(Example 3) And the second number is "6""#,
            ]
        );
    }

    #[test]
    fn test_catalog_finds_exact_and_nested_calls() {
        let feature = parse_feature(
            "f.feature",
            "Feature: F\n  Scenario: S\n    Given I am logged in\n",
        );
        let mut definitions = parse_step_definitions(
            "steps.rb",
            indoc! {r#"
                Given /^I am logged in$/ do
                  step "I visit the login page"
                end

                Given /^I visit the login page$/ do
                  visit "/login"
                end

                Given /^nobody calls me$/ do
                  1
                end
            "#},
        );

        let universe = StepUniverse::build(&[feature], &definitions);
        assert_eq!(universe.len(), 2);
        catalog_step_definitions(&mut definitions, &universe);

        assert_eq!(definitions[0].calls.len(), 1);
        assert_eq!(definitions[1].calls.len(), 1);
        let nested_call = definitions[1].calls.keys().next().unwrap();
        assert_eq!(nested_call.to_string(), "steps.rb:2");
        assert!(definitions[2].is_dead());
    }

    #[test]
    fn test_fuzzy_call_keeps_definition_alive() {
        let mut definitions = parse_step_definitions(
            "steps.rb",
            indoc! {r#"
                Given /^I have some items$/ do
                  step "I add #{count} items"
                end

                When /^I add (\d+) items$/ do |count|
                  @items += count.to_i
                end
            "#},
        );

        let universe = StepUniverse::build(&[], &definitions);
        catalog_step_definitions(&mut definitions, &universe);

        assert!(definitions[0].is_dead());
        assert!(!definitions[1].is_dead());
    }
}
