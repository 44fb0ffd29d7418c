use crate::core::StepDefinition;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Step definitions no invocation reaches, grouped by file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeadSteps {
    /// `"line: /pattern/"` entries ordered by declaration line.
    pub by_file: BTreeMap<PathBuf, Vec<String>>,
    pub total: usize,
}

impl DeadSteps {
    pub fn collect(definitions: &[StepDefinition]) -> Self {
        let mut dead: Vec<&StepDefinition> = definitions.iter().filter(|d| d.is_dead()).collect();
        dead.sort_by(|a, b| a.card.location.cmp(&b.card.location));

        let mut by_file: BTreeMap<PathBuf, Vec<String>> = BTreeMap::new();
        for definition in &dead {
            by_file
                .entry(definition.card.location.file.clone())
                .or_default()
                .push(format!(
                    "{}: /{}/",
                    definition.declaration_line(),
                    definition.pattern_source
                ));
        }

        Self {
            by_file,
            total: dead.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
