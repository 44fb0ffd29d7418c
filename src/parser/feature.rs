//! Gherkin feature file parsing.
//!
//! The parser is line oriented and never fails: anything it cannot place is
//! dropped, and missing pieces show up as empty fields the rules flag later.

use crate::core::{Feature, Location, Scenario, ScenarioType};
use crate::patterns::{
    self, DOC_STRING_FENCE, EXAMPLES_MARKER, FEATURE_TITLE, SCENARIO_TITLE, TABLE_ROW, TAG_LINE,
    TAG_TOKEN,
};
use std::path::{Path, PathBuf};

type Line<'a> = (usize, &'a str);

pub fn parse_feature(path: impl Into<PathBuf>, text: &str) -> Feature {
    let path = path.into();
    let lines: Vec<Line> = text
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line))
        .collect();

    let title_index = lines
        .iter()
        .position(|(_, line)| FEATURE_TITLE.is_match(line));

    let (mut feature, body_start) = match title_index {
        Some(index) => {
            let (number, title) = lines[index];
            let mut feature = Feature::new(Location::new(path.clone(), number));
            feature.tags = collect_tags(&lines[..index]);
            let title_name = FEATURE_TITLE
                .captures(title)
                .and_then(|captures| captures.name("name"))
                .map_or("", |m| m.as_str());
            let (name, next) = read_name(title_name, &lines, index + 1);
            feature.name = name;
            (feature, next)
        }
        None => (Feature::new(Location::new(path.clone(), 1)), 0),
    };

    for segment in split_segments(&lines[body_start..]) {
        let Some(mut scenario) = parse_segment(&path, &segment) else {
            continue;
        };
        if scenario.scenario_type == ScenarioType::Background {
            if feature.background.is_none() && feature.scenarios.is_empty() {
                feature.background = Some(scenario);
            } else {
                log::debug!(
                    "Ignoring background at {} that is not the first block of the feature",
                    scenario.card.location
                );
            }
            continue;
        }
        scenario.tags.extend(feature.tags.iter().cloned());
        feature.scenarios.push(scenario);
    }

    feature
}

/// Tokens of the tag lines in `lines`. A commented tag line is kept verbatim
/// as a single token.
fn collect_tags(lines: &[Line]) -> Vec<String> {
    let mut tags = Vec::new();
    for (_, line) in lines {
        let trimmed = line.trim();
        if patterns::is_comment(trimmed) {
            if patterns::is_commented_tag_line(trimmed) {
                tags.push(trimmed.to_string());
            }
        } else if TAG_LINE.is_match(trimmed) {
            let before_comment = trimmed.split(" #").next().unwrap_or(trimmed);
            tags.extend(
                TAG_TOKEN
                    .find_iter(before_comment)
                    .map(|m| m.as_str().to_string()),
            );
        }
    }
    tags
}

fn is_structural(line: &str) -> bool {
    SCENARIO_TITLE.is_match(line)
        || EXAMPLES_MARKER.is_match(line)
        || patterns::is_tag_line(line)
        || patterns::is_comment(line)
        || patterns::split_step(line).is_some()
        || TABLE_ROW.is_match(line)
        || DOC_STRING_FENCE.is_match(line)
}

/// The title remainder plus following description lines, joined by spaces.
/// Returns the name and the index of the first line after it.
fn read_name(title: &str, lines: &[Line], start: usize) -> (String, usize) {
    let mut parts: Vec<&str> = Vec::new();
    if !title.is_empty() {
        parts.push(title);
    }

    let mut index = start;
    while let Some((_, line)) = lines.get(index) {
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            if is_structural(trimmed) {
                break;
            }
            parts.push(trimmed);
        }
        index += 1;
    }

    (parts.join(" "), index)
}

/// Cuts the feature body into scenario segments. A segment starts at the
/// tag lines (and comments between them) just above its title.
fn split_segments<'a>(lines: &[Line<'a>]) -> Vec<Vec<Line<'a>>> {
    let mut segments = Vec::new();
    let mut current: Option<Vec<Line<'a>>> = None;
    let mut pending: Vec<Line<'a>> = Vec::new();

    for &(number, line) in lines {
        if SCENARIO_TITLE.is_match(line) {
            if let Some(segment) = current.take() {
                segments.push(segment);
            }
            let mut segment = std::mem::take(&mut pending);
            segment.push((number, line));
            current = Some(segment);
        } else if patterns::is_tag_line(line)
            || (!pending.is_empty() && (line.trim().is_empty() || patterns::is_comment(line)))
        {
            pending.push((number, line));
        } else if let Some(segment) = current.as_mut() {
            segment.append(&mut pending);
            segment.push((number, line));
        } else {
            pending.clear();
        }
    }

    if let Some(mut segment) = current {
        segment.append(&mut pending);
        segments.push(segment);
    }
    segments
}

fn parse_segment(path: &Path, segment: &[Line]) -> Option<Scenario> {
    let title_index = segment
        .iter()
        .position(|(_, line)| SCENARIO_TITLE.is_match(line))?;
    let (number, title) = segment[title_index];
    let captures = SCENARIO_TITLE.captures(title)?;
    let scenario_type = captures
        .name("type")
        .and_then(|m| ScenarioType::from_title(m.as_str()))?;
    let title_name = captures.name("name").map_or("", |m| m.as_str());

    let mut scenario = Scenario::new(Location::new(path, number), scenario_type);
    scenario.tags = collect_tags(&segment[..title_index]);
    let (name, body_start) = read_name(title_name, segment, title_index + 1);
    scenario.name = name;

    let body = &segment[body_start..];
    let (step_range, examples_range) = match body
        .iter()
        .position(|(_, line)| EXAMPLES_MARKER.is_match(line))
    {
        Some(marker) => body.split_at(marker),
        None => (body, &body[body.len()..]),
    };

    read_steps(&mut scenario, step_range);
    if scenario.is_outline() {
        scenario.examples_table = examples_range
            .iter()
            .map(|(_, line)| line.trim())
            .filter(|line| patterns::is_comment(line) || TABLE_ROW.is_match(line))
            .map(String::from)
            .collect();
    }

    Some(scenario)
}

fn read_steps(scenario: &mut Scenario, lines: &[Line]) {
    let mut in_doc_string = false;

    for &(number, raw) in lines {
        let line = raw.trim();
        if DOC_STRING_FENCE.is_match(line) {
            in_doc_string = !in_doc_string;
            continue;
        }
        if in_doc_string || line.is_empty() || TAG_LINE.is_match(line) {
            continue;
        }
        if TABLE_ROW.is_match(line) {
            if let Some(step) = scenario.steps.last() {
                scenario
                    .inline_tables
                    .entry(step.clone())
                    .or_default()
                    .push(line.to_string());
            }
            continue;
        }
        scenario.steps.push(line.to_string());
        scenario.step_lines.push(number);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    const CALCULATOR: &str = indoc! {r#"
        @calc @math
        Feature: Calculator
          In order to avoid silly mistakes
          As a math idiot

          Background:
            Given the calculator is on

          @fast
          Scenario: Add two numbers
            Given the first number is "1"
            # And a commented step
            And the second number is "2"
              | a | b |
              | 1 | 2 |
            When I press add
            Then the result is "3"

          @slow
          # @wip
          Scenario Outline: Add <x> and <y>
            Given the first number is "<x>"
            Then the result is "<sum>"

            Examples:
              | x | y | sum |
              | 1 | 2 | 3   |
              # | 4 | 5 | 9 |
              | 2 | 2 | 4   |
    "#};

    #[test]
    fn test_feature_header() {
        let feature = parse_feature("features/calc.feature", CALCULATOR);
        assert_eq!(feature.card.location.line, 2);
        assert_eq!(feature.tags, vec!["@calc", "@math"]);
        assert_eq!(
            feature.name,
            "Calculator In order to avoid silly mistakes As a math idiot"
        );
    }

    #[test]
    fn test_background_and_scenarios() {
        let feature = parse_feature("features/calc.feature", CALCULATOR);
        let background = feature.background.as_ref().unwrap();
        assert_eq!(background.steps, vec!["Given the calculator is on"]);
        assert!(background.tags.is_empty());

        assert_eq!(feature.scenarios.len(), 2);
        let add = &feature.scenarios[0];
        assert_eq!(add.name, "Add two numbers");
        assert_eq!(add.tags, vec!["@fast", "@calc", "@math"]);
        assert_eq!(add.steps.len(), 5);
        assert_eq!(add.steps[1], "# And a commented step");
        assert_eq!(add.step_lines[0], 11);
        assert_eq!(
            add.inline_tables[r#"And the second number is "2""#],
            vec!["| a | b |", "| 1 | 2 |"]
        );
    }

    #[test]
    fn test_outline_examples() {
        let feature = parse_feature("features/calc.feature", CALCULATOR);
        let outline = &feature.scenarios[1];
        assert_eq!(outline.scenario_type, ScenarioType::ScenarioOutline);
        assert_eq!(outline.tags, vec!["@slow", "# @wip", "@calc", "@math"]);
        assert_eq!(outline.steps.len(), 2);
        assert_eq!(
            outline.examples_table,
            vec![
                "| x | y | sum |",
                "| 1 | 2 | 3   |",
                "# | 4 | 5 | 9 |",
                "| 2 | 2 | 4   |",
            ]
        );
    }

    #[test]
    fn test_empty_titles() {
        let feature = parse_feature("f.feature", "Feature:\nScenario:\n");
        assert_eq!(feature.name, "");
        assert_eq!(feature.scenarios.len(), 1);
        assert_eq!(feature.scenarios[0].name, "");
        assert!(feature.scenarios[0].steps.is_empty());
    }

    #[test]
    fn test_empty_text() {
        let feature = parse_feature("f.feature", "");
        assert_eq!(feature.name, "");
        assert!(feature.background.is_none());
        assert!(feature.scenarios.is_empty());
    }

    #[test]
    fn test_doc_strings_are_skipped() {
        let text = indoc! {r#"
            Feature: Docs
              Scenario: Doc string
                Given a document:
                  """
                  Then this is not a step
                  """
                Then it is stored
        "#};
        let feature = parse_feature("f.feature", text);
        assert_eq!(
            feature.scenarios[0].steps,
            vec!["Given a document:", "Then it is stored"]
        );
    }

    #[test]
    fn test_outline_without_examples() {
        let text = "Feature: F\n  Scenario Outline: O\n    Given <x>\n";
        let feature = parse_feature("f.feature", text);
        assert!(feature.scenarios[0].examples_table.is_empty());
        assert_eq!(feature.scenarios[0].steps, vec!["Given <x>"]);
    }

    #[test]
    fn test_background_tag_is_kept() {
        let text = "Feature: F\n  @oops\n  Background:\n    Given x\n";
        let feature = parse_feature("f.feature", text);
        assert_eq!(feature.background.unwrap().tags, vec!["@oops"]);
    }

    #[test]
    fn test_commented_step_with_at_sign_stays_in_its_scenario() {
        let text = indoc! {"
            Feature: Mail
              Scenario: A
                Given a
                # Then mail me@example.com
              Scenario: B
                Given b
        "};
        let feature = parse_feature("f.feature", text);
        assert_eq!(
            feature.scenarios[0].steps,
            vec!["Given a", "# Then mail me@example.com"]
        );
        assert!(feature.scenarios[1].tags.is_empty());
    }

    #[test]
    fn test_commented_tag_before_title_moves_to_next_scenario() {
        let text = "Feature: F\n  Scenario: A\n    Given a\n  # @wip\n  Scenario: B\n    Given b\n";
        let feature = parse_feature("f.feature", text);
        assert_eq!(feature.scenarios[0].steps, vec!["Given a"]);
        assert_eq!(feature.scenarios[1].tags, vec!["# @wip"]);
    }
}
