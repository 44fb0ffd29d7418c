//! Configuration loaded from `.bddsniff.toml`.
//!
//! ```toml
//! [thresholds]
//! scenario = 200
//!
//! [rules.too_many_steps]
//! conditions = { max = 10 }
//!
//! [rules.implementation_word]
//! enabled = false
//! ```

mod loader;
mod thresholds;

pub use loader::{
    directory_ancestors, load_config, load_config_file, load_config_from, parse_config,
    CONFIG_FILE_NAME,
};
pub use thresholds::Thresholds;

use crate::errors::Result;
use crate::rules::{RuleId, RuleOverride, RuleSet, RulesEvaluator};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BddsniffConfig {
    pub thresholds: Thresholds,
    pub rules: BTreeMap<RuleId, RuleOverride>,
}

impl BddsniffConfig {
    /// The default rule table with this config's overrides applied.
    pub fn rule_set(&self) -> RuleSet {
        RuleSet::default().with_overrides(&self.rules)
    }

    pub fn evaluator(&self) -> Result<RulesEvaluator> {
        RulesEvaluator::new(self.rule_set())
    }
}
