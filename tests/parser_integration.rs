//! Parsing whole files: step definition blocks, parameters, and outline
//! expansion.

use bddsniff::catalog::concrete_steps;
use bddsniff::parser::{parse_feature, parse_hooks, parse_parameters, parse_step_definitions};
use bddsniff::HookKind;
use indoc::indoc;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn test_irregular_parameter_spacing() {
    let source = "Given /^(\\d+) (\\d+) (\\d+)$/ do | param_1 ,  param_2,param_3    |\n  x\nend\n";
    let definitions = parse_step_definitions("steps.rb", source);
    assert_eq!(
        definitions[0].parameters,
        vec!["param_1", "param_2", "param_3"]
    );
}

#[test]
fn test_file_without_declarations_yields_nothing() {
    let source = indoc! {"
        module Helpers
          def login
            visit '/login'
          end
        end
    "};
    assert!(parse_step_definitions("support/helpers.rb", source).is_empty());
    assert!(parse_hooks("support/helpers.rb", source).is_empty());
}

#[test]
fn test_nested_blocks_stay_inside_their_definition() {
    let source = indoc! {r#"
        When /^I save$/ do
          begin
            if ready?
              save!
            end
          rescue StandardError
            retry
          end
        end

        Then /^it is saved$/ do
          expect(saved?).to be true
        end
    "#};
    let definitions = parse_step_definitions("steps.rb", source);

    assert_eq!(definitions.len(), 2);
    assert_eq!(definitions[0].body_lines.len(), 7);
    assert_eq!(definitions[0].body_lines.last().unwrap(), "end");
    assert_eq!(definitions[1].declaration_line(), 11);
    assert_eq!(
        definitions[1].body_lines,
        vec!["expect(saved?).to be true"]
    );
}

#[test]
fn test_hooks_and_step_definitions_share_a_file() {
    let source = indoc! {r#"
        Before('@db', '~@fast') do
          DatabaseCleaner.start
        end

        Given /^a user$/ do
          create(:user)
        end

        Around do |scenario, block|
          block.call
        end
    "#};
    let hooks = parse_hooks("env.rb", source);
    assert_eq!(hooks.len(), 2);
    assert_eq!(hooks[0].kind, HookKind::Before);
    assert_eq!(hooks[0].tag_filters, vec!["@db", "~@fast"]);
    assert_eq!(hooks[1].kind, HookKind::Around);
    assert_eq!(hooks[1].parameters, vec!["scenario", "block"]);
    assert_eq!(parse_step_definitions("env.rb", source).len(), 1);
}

#[test]
fn test_declaration_with_trailing_comment() {
    let source = indoc! {"
        Given /^x$/ do # shared with the admin suite
          foo
        end

        Before('@db') do # reset between scenarios
          DatabaseCleaner.clean
        end
    "};
    let definitions = parse_step_definitions("steps.rb", source);
    assert_eq!(definitions.len(), 1);
    assert_eq!(definitions[0].pattern_source, "^x$");
    assert_eq!(definitions[0].body_lines, vec!["foo"]);

    let hooks = parse_hooks("steps.rb", source);
    assert_eq!(hooks.len(), 1);
    assert_eq!(hooks[0].tag_filters, vec!["@db"]);
    assert_eq!(hooks[0].body_lines, vec!["DatabaseCleaner.clean"]);
}

#[test]
fn test_one_line_brace_definitions() {
    let source = indoc! {r#"
        Given(/^x$/) { foo }
        Then(/^I am home$/) { step "I visit the home page" }
        When /^y$/ do
          bar
        end
    "#};
    let definitions = parse_step_definitions("steps.rb", source);
    let patterns: Vec<&str> = definitions
        .iter()
        .map(|d| d.pattern_source.as_str())
        .collect();
    assert_eq!(patterns, vec!["^x$", "^I am home$", "^y$"]);
    assert_eq!(definitions[0].body_lines, vec!["foo"]);
    assert_eq!(definitions[2].body_lines, vec!["bar"]);

    let nested: Vec<(usize, &str)> = definitions[1]
        .nested_steps
        .iter()
        .map(|(location, text)| (location.line, text.as_str()))
        .collect();
    assert_eq!(nested, vec![(2, "I visit the home page")]);
}

#[test]
fn test_outline_expansion_substitutes_placeholders() {
    let source = indoc! {"
        Feature: Sums
          Scenario Outline: Adding
            Given I enter <x> and <y>
            Then I see <sum>

            Examples:
              | x | y | sum |
              | 1 | 2 | 3   |
              # | 4 | 5 | 9 |
              | 2 | 2 | 4   |
    "};
    let feature = parse_feature("sums.feature", source);
    let steps: Vec<(usize, Option<usize>, String)> = concrete_steps(&feature.scenarios[0])
        .into_iter()
        .map(|(location, text)| (location.location.line, location.example, text))
        .collect();

    assert_eq!(
        steps,
        vec![
            (3, Some(1), "Given I enter 1 and 2".to_string()),
            (4, Some(1), "Then I see 3".to_string()),
            (3, Some(3), "Given I enter 2 and 2".to_string()),
            (4, Some(3), "Then I see 4".to_string()),
        ]
    );
}

#[test]
fn test_outline_without_examples_does_not_expand() {
    let feature = parse_feature(
        "f.feature",
        "Feature: F\n  Scenario Outline: O\n    Given <x>\n",
    );
    assert!(concrete_steps(&feature.scenarios[0]).is_empty());
}

fn outline(steps: usize, rows: &[bool]) -> String {
    let mut text = String::from("Feature: Generated\n  Scenario Outline: Many\n");
    for index in 0..steps {
        text.push_str(&format!("    Given step {index} uses <n>\n"));
    }
    text.push_str("\n    Examples:\n      | n |\n");
    for (index, commented) in rows.iter().enumerate() {
        let marker = if *commented { "# " } else { "" };
        text.push_str(&format!("      {marker}| {} |\n", index + 100));
    }
    text
}

proptest! {
    #[test]
    fn prop_outline_expansion_count(
        steps in 0usize..6,
        rows in prop::collection::vec(any::<bool>(), 0..12),
    ) {
        let feature = parse_feature("generated.feature", &outline(steps, &rows));
        let live_rows = rows.iter().filter(|commented| !**commented).count();

        prop_assert_eq!(feature.scenarios.len(), 1);
        prop_assert_eq!(concrete_steps(&feature.scenarios[0]).len(), live_rows * steps);
    }

    #[test]
    fn prop_parameters_are_trimmed(
        names in prop::collection::vec("[a-z_][a-z0-9_]{0,8}", 1..6),
        padding in prop::collection::vec(0usize..4, 12),
    ) {
        let text = names
            .iter()
            .enumerate()
            .map(|(index, name)| {
                format!(
                    "{}{}{}",
                    " ".repeat(padding[index * 2 % padding.len()]),
                    name,
                    " ".repeat(padding[(index * 2 + 1) % padding.len()])
                )
            })
            .collect::<Vec<_>>()
            .join(",");
        prop_assert_eq!(parse_parameters(&text), names);
    }
}
