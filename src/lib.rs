//! Static analysis for Cucumber-style BDD suites.
//!
//! Feature files and Ruby step definitions are parsed into node graphs,
//! step invocations are cataloged against definitions, and a configurable
//! rule table scores every feature, scenario, step definition and hook.

// Export modules for library usage
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod errors;
pub mod io;
pub mod parser;
pub mod patterns;
pub mod rules;
pub mod suite;
pub mod summary;

// Re-export commonly used types
pub use crate::core::{
    Feature, Histogram, Hook, HookKind, Location, RuleTarget, Scenario, ScenarioType,
    StepDefinition, StepLocation, TargetKind,
};

pub use crate::catalog::{catalog_step_definitions, DeadSteps, StepUniverse};
pub use crate::config::{load_config, parse_config, BddsniffConfig, Thresholds};
pub use crate::errors::{Error, Result};
pub use crate::io::output::{JsonWriter, OutputWriter, TerminalWriter};
pub use crate::parser::{parse_feature, parse_hooks, parse_step_definitions};
pub use crate::rules::{RuleId, RuleSet, RulesEvaluator, Violation};
pub use crate::suite::{analyze, SourceFile, SuiteReport};
pub use crate::summary::{CategorySummary, SuiteSummary};
