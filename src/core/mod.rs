pub mod target;
pub mod types;

pub use target::{Histogram, RuleTarget, ScoreCard};
pub use types::{Feature, Hook, HookKind, Scenario, ScenarioType, StepDefinition};

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};

/// A position in a source file. Lines are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    pub file: PathBuf,
    pub line: usize,
}

impl Location {
    pub fn new(file: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Same file, different line.
    pub fn at_line(&self, line: usize) -> Self {
        Self {
            file: self.file.clone(),
            line,
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}

// Serialized as "path:line" so location-keyed maps stay valid JSON objects.
impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Where a step invocation comes from: a feature line, an expanded row of a
/// scenario outline, or a nested call inside a step definition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StepLocation {
    pub location: Location,
    pub example: Option<usize>,
}

impl StepLocation {
    pub fn new(location: Location) -> Self {
        Self {
            location,
            example: None,
        }
    }

    pub fn example(location: Location, row: usize) -> Self {
        Self {
            location,
            example: Some(row),
        }
    }
}

impl From<Location> for StepLocation {
    fn from(location: Location) -> Self {
        Self::new(location)
    }
}

impl fmt::Display for StepLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.example {
            Some(row) => write!(f, "{}(Example {})", self.location, row),
            None => write!(f, "{}", self.location),
        }
    }
}

impl Serialize for StepLocation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The node types rules can target. The serialized names double as the
/// `{class}` substitution in rule phrases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    Feature,
    Background,
    Scenario,
    StepDefinition,
    Hook,
}

impl TargetKind {
    pub const ALL: [TargetKind; 5] = [
        TargetKind::Feature,
        TargetKind::Background,
        TargetKind::Scenario,
        TargetKind::StepDefinition,
        TargetKind::Hook,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Feature => "Feature",
            TargetKind::Background => "Background",
            TargetKind::Scenario => "Scenario",
            TargetKind::StepDefinition => "StepDefinition",
            TargetKind::Hook => "Hook",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display_and_order() {
        let a = Location::new("features/a.feature", 3);
        let b = a.at_line(10);
        assert_eq!(a.to_string(), "features/a.feature:3");
        assert!(a < b);
    }

    #[test]
    fn test_step_location_display() {
        let location = Location::new("f.feature", 7);
        assert_eq!(StepLocation::new(location.clone()).to_string(), "f.feature:7");
        assert_eq!(
            StepLocation::example(location, 2).to_string(),
            "f.feature:7(Example 2)"
        );
    }

    #[test]
    fn test_location_serializes_as_string_key() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(Location::new("steps.rb", 4), "a step".to_string());
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"steps.rb:4":"a step"}"#);
    }
}
