//! Score aggregation per category and for the whole suite.

use crate::config::Thresholds;
use crate::core::{
    Feature, Histogram, Hook, Location, RuleTarget, Scenario, StepDefinition, TargetKind,
};
use serde::Serialize;

/// Aggregate of one category of nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub total: usize,
    pub total_score: u32,
    pub min: u32,
    pub min_location: Option<Location>,
    pub max: u32,
    pub max_location: Option<Location>,
    /// Mean score, rounded to two decimals.
    pub average: f64,
    pub threshold: u32,
    pub good: usize,
    pub bad: usize,
    pub improvement_list: Histogram,
}

impl CategorySummary {
    pub fn assess<'a, T, I>(items: I, threshold: u32) -> Self
    where
        T: RuleTarget + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let mut summary = Self {
            total: 0,
            total_score: 0,
            min: 0,
            min_location: None,
            max: 0,
            max_location: None,
            average: 0.0,
            threshold,
            good: 0,
            bad: 0,
            improvement_list: Histogram::new(),
        };

        for item in items {
            let score = item.score();
            if summary.min_location.is_none() || score < summary.min {
                summary.min = score;
                summary.min_location = Some(item.location().clone());
            }
            if summary.max_location.is_none() || score > summary.max {
                summary.max = score;
                summary.max_location = Some(item.location().clone());
            }
            summary.total += 1;
            summary.total_score += score;
            if item.good(threshold) {
                summary.good += 1;
            } else {
                summary.bad += 1;
            }
            summary.improvement_list.merge(item.violations());
        }

        if summary.total > 0 {
            let average = f64::from(summary.total_score) / summary.total as f64;
            summary.average = (average * 100.0).round() / 100.0;
        }
        summary
    }
}

/// The whole suite: four categories plus the merged improvement list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuiteSummary {
    pub features: CategorySummary,
    /// Scenarios and backgrounds.
    pub scenarios: CategorySummary,
    pub step_definitions: CategorySummary,
    pub hooks: CategorySummary,
    pub total_score: u32,
    pub thresholds: Thresholds,
    /// Phrases by descending count; equal counts keep discovery order.
    pub improvement_list: Histogram,
}

impl SuiteSummary {
    pub fn assess(
        features: &[Feature],
        definitions: &[StepDefinition],
        hooks: &[Hook],
        thresholds: &Thresholds,
    ) -> Self {
        let scenarios: Vec<&Scenario> = features.iter().flat_map(|f| f.all_scenarios()).collect();

        let features = CategorySummary::assess(features, thresholds.for_kind(TargetKind::Feature));
        let scenarios =
            CategorySummary::assess(scenarios, thresholds.for_kind(TargetKind::Scenario));
        let step_definitions =
            CategorySummary::assess(definitions, thresholds.for_kind(TargetKind::StepDefinition));
        let hooks = CategorySummary::assess(hooks, thresholds.for_kind(TargetKind::Hook));

        let mut merged = Histogram::new();
        for category in [&features, &scenarios, &step_definitions, &hooks] {
            merged.merge(&category.improvement_list);
        }

        Self {
            total_score: features.total_score
                + scenarios.total_score
                + step_definitions.total_score
                + hooks.total_score,
            thresholds: thresholds.clone(),
            improvement_list: merged.sorted_by_count().into_iter().collect(),
            features,
            scenarios,
            step_definitions,
            hooks,
        }
    }

    /// Whether the suite as a whole is within the project threshold.
    pub fn good(&self) -> bool {
        self.total_score <= self.thresholds.project
    }
}
