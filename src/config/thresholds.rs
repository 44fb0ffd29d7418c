use crate::core::TargetKind;
use serde::{Deserialize, Serialize};

/// Good/bad score thresholds per category. Backgrounds use the scenario
/// threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Thresholds {
    #[serde(default = "default_category_threshold")]
    pub feature: u32,

    #[serde(default = "default_category_threshold")]
    pub scenario: u32,

    #[serde(default = "default_category_threshold")]
    pub step_definition: u32,

    #[serde(default = "default_category_threshold")]
    pub hook: u32,

    #[serde(default = "default_project_threshold")]
    pub project: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            feature: default_category_threshold(),
            scenario: default_category_threshold(),
            step_definition: default_category_threshold(),
            hook: default_category_threshold(),
            project: default_project_threshold(),
        }
    }
}

impl Thresholds {
    pub fn for_kind(&self, kind: TargetKind) -> u32 {
        match kind {
            TargetKind::Feature => self.feature,
            TargetKind::Background | TargetKind::Scenario => self.scenario,
            TargetKind::StepDefinition => self.step_definition,
            TargetKind::Hook => self.hook,
        }
    }
}

fn default_category_threshold() -> u32 {
    300
}
fn default_project_threshold() -> u32 {
    1000
}
