//! The end-to-end analysis pipeline: parse, catalog, evaluate, summarize.

use crate::catalog::{catalog_step_definitions, DeadSteps, StepUniverse};
use crate::config::BddsniffConfig;
use crate::core::{Feature, Hook, StepDefinition};
use crate::errors::Result;
use crate::parser::{parse_feature, parse_hooks, parse_step_definitions};
use crate::summary::SuiteSummary;
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, info_span};

/// A file's path and contents. Reading files is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub features: Vec<Feature>,
    pub step_definitions: Vec<StepDefinition>,
    pub hooks: Vec<Hook>,
    pub dead_steps: DeadSteps,
    pub summary: SuiteSummary,
}

/// Analyzes a suite. Step sources are scanned for both step definitions and
/// hooks. Fails only when the configured rule table is invalid.
pub fn analyze(
    feature_files: &[SourceFile],
    step_files: &[SourceFile],
    config: &BddsniffConfig,
) -> Result<SuiteReport> {
    let evaluator = config.evaluator()?;

    let span = info_span!(
        "analyze",
        feature_files = feature_files.len(),
        step_files = step_files.len()
    );
    let _guard = span.enter();

    let (mut features, mut step_definitions, mut hooks) = {
        let _span = info_span!("parse").entered();
        let features: Vec<Feature> = feature_files
            .par_iter()
            .map(|file| parse_feature(&file.path, &file.text))
            .collect();
        let (step_definitions, hooks): (Vec<Vec<StepDefinition>>, Vec<Vec<Hook>>) = step_files
            .par_iter()
            .map(|file| {
                (
                    parse_step_definitions(&file.path, &file.text),
                    parse_hooks(&file.path, &file.text),
                )
            })
            .unzip();
        (
            features,
            step_definitions.into_iter().flatten().collect::<Vec<_>>(),
            hooks.into_iter().flatten().collect::<Vec<_>>(),
        )
    };
    info!(
        features = features.len(),
        step_definitions = step_definitions.len(),
        hooks = hooks.len(),
        "Parsed suite"
    );

    let universe = StepUniverse::build(&features, &step_definitions);
    debug!(steps = universe.len(), "Built step universe");
    catalog_step_definitions(&mut step_definitions, &universe);
    let dead_steps = DeadSteps::collect(&step_definitions);

    evaluator.evaluate_suite(&mut features, &mut step_definitions, &mut hooks);

    let summary = SuiteSummary::assess(&features, &step_definitions, &hooks, &config.thresholds);
    info!(
        total_score = summary.total_score,
        dead_steps = dead_steps.total,
        "Analysis complete"
    );

    Ok(SuiteReport {
        features,
        step_definitions,
        hooks,
        dead_steps,
        summary,
    })
}
