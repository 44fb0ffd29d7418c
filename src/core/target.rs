//! Score accumulation shared by every node the rule engine can judge.
//!
//! A node owns a [`ScoreCard`]; the [`RuleTarget`] trait exposes it and
//! provides the scoring operations. Score and histogram are only ever changed
//! together through [`RuleTarget::store_rule`], which keeps
//! `score == sum(weight * count)` true for every node.

use super::{Location, TargetKind};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Phrase to occurrence count, remembering the order phrases were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Histogram {
    entries: Vec<(String, usize)>,
}

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, phrase: &str) {
        self.add(phrase, 1);
    }

    pub fn add(&mut self, phrase: &str, count: usize) {
        match self.entries.iter_mut().find(|(p, _)| p == phrase) {
            Some((_, existing)) => *existing += count,
            None => self.entries.push((phrase.to_string(), count)),
        }
    }

    pub fn get(&self, phrase: &str) -> usize {
        self.entries
            .iter()
            .find(|(p, _)| p == phrase)
            .map_or(0, |(_, count)| *count)
    }

    pub fn contains(&self, phrase: &str) -> bool {
        self.get(phrase) > 0
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of occurrences across all phrases.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(p, c)| (p.as_str(), *c))
    }

    pub fn merge(&mut self, other: &Histogram) {
        for (phrase, count) in other.iter() {
            self.add(phrase, count);
        }
    }

    /// Entries ordered by descending count. The sort is stable, so equal
    /// counts keep the order in which the phrases were first seen.
    pub fn sorted_by_count(&self) -> Vec<(String, usize)> {
        let mut sorted = self.entries.clone();
        sorted.sort_by_key(|(_, count)| std::cmp::Reverse(*count));
        sorted
    }
}

impl FromIterator<(String, usize)> for Histogram {
    fn from_iter<I: IntoIterator<Item = (String, usize)>>(iter: I) -> Self {
        let mut histogram = Histogram::new();
        for (phrase, count) in iter {
            histogram.add(&phrase, count);
        }
        histogram
    }
}

impl Serialize for Histogram {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (phrase, count) in &self.entries {
            map.serialize_entry(phrase, count)?;
        }
        map.end()
    }
}

/// Location, score and rule-violation histogram of a judged node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreCard {
    pub location: Location,
    pub score: u32,
    pub violations: Histogram,
}

impl ScoreCard {
    pub fn new(location: Location) -> Self {
        Self {
            location,
            score: 0,
            violations: Histogram::new(),
        }
    }
}

/// A node that rules can be evaluated against.
pub trait RuleTarget {
    fn kind(&self) -> TargetKind;
    fn card(&self) -> &ScoreCard;
    fn card_mut(&mut self) -> &mut ScoreCard;

    fn location(&self) -> &Location {
        &self.card().location
    }

    fn score(&self) -> u32 {
        self.card().score
    }

    fn violations(&self) -> &Histogram {
        &self.card().violations
    }

    /// Records one firing of a rule under its rendered phrase.
    fn store_rule(&mut self, phrase: &str, weight: u32) {
        let card = self.card_mut();
        card.score += weight;
        card.violations.increment(phrase);
    }

    fn good(&self, threshold: u32) -> bool {
        self.score() <= threshold
    }

    fn problem_percentage(&self, threshold: u32) -> f64 {
        if threshold == 0 {
            return if self.score() == 0 { 0.0 } else { f64::INFINITY };
        }
        f64::from(self.score()) / f64::from(threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe {
        card: ScoreCard,
    }

    impl RuleTarget for Probe {
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

    #[test]
    fn test_store_rule_keeps_score_in_step_with_histogram() {
        let mut probe = Probe {
            card: ScoreCard::new(Location::new("hooks.rb", 1)),
        };
        probe.store_rule("Hook with no content.", 100);
        probe.store_rule("Todo found. Resolve it.", 1);
        probe.store_rule("Todo found. Resolve it.", 1);

        assert_eq!(probe.score(), 102);
        assert_eq!(probe.violations().get("Todo found. Resolve it."), 2);
        assert_eq!(probe.violations().total(), 3);
        assert!(!probe.good(100));
        assert!((probe.problem_percentage(100) - 1.02).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sorted_by_count_breaks_ties_by_discovery_order() {
        let histogram: Histogram = vec![
            ("Middle".to_string(), 2),
            ("First".to_string(), 1),
            ("Last".to_string(), 3),
            ("Also one".to_string(), 1),
        ]
        .into_iter()
        .collect();

        let keys: Vec<String> = histogram
            .sorted_by_count()
            .into_iter()
            .map(|(phrase, _)| phrase)
            .collect();
        assert_eq!(keys, vec!["Last", "Middle", "First", "Also one"]);
    }

    #[test]
    fn test_merge_sums_counts() {
        let mut a = Histogram::new();
        a.add("x", 2);
        let mut b = Histogram::new();
        b.add("x", 1);
        b.add("y", 4);
        a.merge(&b);
        assert_eq!(a.get("x"), 3);
        assert_eq!(a.get("y"), 4);
        assert_eq!(a.len(), 2);
    }
}
