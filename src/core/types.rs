use super::target::{RuleTarget, ScoreCard};
use super::{Location, StepLocation, TargetKind};
use crate::patterns;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// One parsed `.feature` file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature {
    #[serde(flatten)]
    pub card: ScoreCard,
    pub name: String,
    pub tags: Vec<String>,
    pub background: Option<Scenario>,
    pub scenarios: Vec<Scenario>,
}

impl Feature {
    pub fn new(location: Location) -> Self {
        Self {
            card: ScoreCard::new(location),
            name: String::new(),
            tags: Vec::new(),
            background: None,
            scenarios: Vec::new(),
        }
    }

    /// Own score plus the background's and every scenario's.
    pub fn total_score(&self) -> u32 {
        self.card.score
            + self.background.as_ref().map_or(0, |b| b.card.score)
            + self.scenarios.iter().map(|s| s.card.score).sum::<u32>()
    }

    /// Background first (if any), then scenarios in file order.
    pub fn all_scenarios(&self) -> impl Iterator<Item = &Scenario> {
        self.background.iter().chain(self.scenarios.iter())
    }
}

impl RuleTarget for Feature {
    fn kind(&self) -> TargetKind {
        TargetKind::Feature
    }
    fn card(&self) -> &ScoreCard {
        &self.card
    }
    fn card_mut(&mut self) -> &mut ScoreCard {
        &mut self.card
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ScenarioType {
    Background,
    Scenario,
    #[serde(rename = "Scenario Outline")]
    ScenarioOutline,
    #[serde(rename = "Scenario Template")]
    ScenarioTemplate,
}

impl ScenarioType {
    /// Maps the keyword of a title line (`Scenario Outline`, ...) to its type.
    pub fn from_title(keyword: &str) -> Option<Self> {
        match keyword {
            "Background" => Some(Self::Background),
            "Scenario" => Some(Self::Scenario),
            "Scenario Outline" => Some(Self::ScenarioOutline),
            "Scenario Template" => Some(Self::ScenarioTemplate),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Background => "Background",
            Self::Scenario => "Scenario",
            Self::ScenarioOutline => "Scenario Outline",
            Self::ScenarioTemplate => "Scenario Template",
        }
    }

    pub fn is_outline(&self) -> bool {
        matches!(self, Self::ScenarioOutline | Self::ScenarioTemplate)
    }
}

impl fmt::Display for ScenarioType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A background, scenario, or scenario outline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    #[serde(flatten)]
    pub card: ScoreCard,
    pub name: String,
    pub tags: Vec<String>,
    #[serde(rename = "type")]
    pub scenario_type: ScenarioType,
    /// Raw step lines, comments included.
    pub steps: Vec<String>,
    /// Source line of each entry in `steps`.
    pub step_lines: Vec<usize>,
    pub inline_tables: BTreeMap<String, Vec<String>>,
    pub examples_table: Vec<String>,
}

/// A data row of an outline's examples table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleRow {
    /// 1-based position among the rows following the header.
    pub number: usize,
    pub cells: Vec<String>,
    pub commented: bool,
}

impl Scenario {
    pub fn new(location: Location, scenario_type: ScenarioType) -> Self {
        Self {
            card: ScoreCard::new(location),
            name: String::new(),
            tags: Vec::new(),
            scenario_type,
            steps: Vec::new(),
            step_lines: Vec::new(),
            inline_tables: BTreeMap::new(),
            examples_table: Vec::new(),
        }
    }

    pub fn is_outline(&self) -> bool {
        self.scenario_type.is_outline()
    }

    pub fn start_line(&self) -> usize {
        self.card.location.line
    }

    /// Step lines that are not comments, paired with their source line.
    pub fn live_steps(&self) -> impl Iterator<Item = (&str, usize)> {
        self.steps
            .iter()
            .zip(self.step_lines.iter())
            .filter(|(step, _)| !patterns::is_comment(step))
            .map(|(step, line)| (step.as_str(), *line))
    }

    /// Splits the examples table into its header cells and the rows below it.
    /// Rows repeating the header (a second `Examples:` block) are skipped.
    pub fn example_rows(&self) -> (Vec<String>, Vec<ExampleRow>) {
        let mut header: Option<Vec<String>> = None;
        let mut rows = Vec::new();

        for line in &self.examples_table {
            if patterns::is_comment(line) {
                if header.is_some() {
                    rows.push(ExampleRow {
                        number: rows.len() + 1,
                        cells: Vec::new(),
                        commented: true,
                    });
                }
                continue;
            }
            let cells = table_cells(line);
            match &header {
                None => header = Some(cells),
                Some(existing) if *existing == cells => {}
                Some(_) => rows.push(ExampleRow {
                    number: rows.len() + 1,
                    cells,
                    commented: false,
                }),
            }
        }

        (header.unwrap_or_default(), rows)
    }

    /// Comment lines in the examples table, wherever they appear.
    pub fn commented_examples(&self) -> usize {
        self.examples_table
            .iter()
            .filter(|line| patterns::is_comment(line))
            .count()
    }
}

impl RuleTarget for Scenario {
    fn kind(&self) -> TargetKind {
        match self.scenario_type {
            ScenarioType::Background => TargetKind::Background,
            _ => TargetKind::Scenario,
        }
    }
    fn card(&self) -> &ScoreCard {
        &self.card
    }
    fn card_mut(&mut self) -> &mut ScoreCard {
        &mut self.card
    }
}

/// Cells of a `| a | b |` row, trimmed. Empty cells are kept so columns line up.
pub fn table_cells(row: &str) -> Vec<String> {
    let trimmed = row.trim();
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(|cell| cell.trim().to_string()).collect()
}

/// An implementation-side declaration pairing a pattern with a body.
#[derive(Debug, Clone, Serialize)]
pub struct StepDefinition {
    #[serde(flatten)]
    pub card: ScoreCard,
    #[serde(skip)]
    pub pattern: Regex,
    /// The pattern as written between the delimiters.
    #[serde(rename = "pattern")]
    pub pattern_source: String,
    pub parameters: Vec<String>,
    pub body_lines: Vec<String>,
    pub nested_steps: BTreeMap<Location, String>,
    pub calls: BTreeMap<StepLocation, String>,
}

impl StepDefinition {
    pub fn new(
        location: Location,
        pattern: Regex,
        pattern_source: impl Into<String>,
        parameters: Vec<String>,
        body_lines: Vec<String>,
    ) -> Self {
        Self {
            card: ScoreCard::new(location),
            pattern,
            pattern_source: pattern_source.into(),
            parameters,
            body_lines,
            nested_steps: BTreeMap::new(),
            calls: BTreeMap::new(),
        }
    }

    pub fn declaration_line(&self) -> usize {
        self.card.location.line
    }

    /// Whether a step line (keyword optional) is matched by this definition.
    pub fn matches(&self, step: &str) -> bool {
        self.pattern.is_match(patterns::strip_step_style(step))
    }

    pub fn add_call(&mut self, location: StepLocation, step: impl Into<String>) {
        self.calls.insert(location, step.into());
    }

    pub fn is_dead(&self) -> bool {
        self.calls.is_empty()
    }

    /// Body lines that are neither blank nor comments.
    pub fn code_lines(&self) -> impl Iterator<Item = &str> {
        code_lines(&self.body_lines)
    }
}

impl RuleTarget for StepDefinition {
    fn kind(&self) -> TargetKind {
        TargetKind::StepDefinition
    }
    fn card(&self) -> &ScoreCard {
        &self.card
    }
    fn card_mut(&mut self) -> &mut ScoreCard {
        &mut self.card
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HookKind {
    AfterConfiguration,
    Before,
    After,
    AfterStep,
    Around,
    #[serde(rename = "at_exit")]
    AtExit,
}

impl HookKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "AfterConfiguration" => Some(Self::AfterConfiguration),
            "Before" => Some(Self::Before),
            "After" => Some(Self::After),
            "AfterStep" => Some(Self::AfterStep),
            "Around" => Some(Self::Around),
            "at_exit" => Some(Self::AtExit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AfterConfiguration => "AfterConfiguration",
            Self::Before => "Before",
            Self::After => "After",
            Self::AfterStep => "AfterStep",
            Self::Around => "Around",
            Self::AtExit => "at_exit",
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hook {
    #[serde(flatten)]
    pub card: ScoreCard,
    #[serde(rename = "type")]
    pub kind: HookKind,
    pub tag_filters: Vec<String>,
    pub parameters: Vec<String>,
    pub body_lines: Vec<String>,
}

impl Hook {
    pub fn new(
        location: Location,
        kind: HookKind,
        tag_filters: Vec<String>,
        parameters: Vec<String>,
        body_lines: Vec<String>,
    ) -> Self {
        Self {
            card: ScoreCard::new(location),
            kind,
            tag_filters,
            parameters,
            body_lines,
        }
    }

    pub fn code_lines(&self) -> impl Iterator<Item = &str> {
        code_lines(&self.body_lines)
    }
}

impl RuleTarget for Hook {
    fn kind(&self) -> TargetKind {
        TargetKind::Hook
    }
    fn card(&self) -> &ScoreCard {
        &self.card
    }
    fn card_mut(&mut self) -> &mut ScoreCard {
        &mut self.card
    }
}

fn code_lines(body: &[String]) -> impl Iterator<Item = &str> {
    body.iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty() && !patterns::is_comment(line))
}
