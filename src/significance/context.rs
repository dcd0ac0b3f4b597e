// Shared types for evaluating one commit pair
//
// A `Context` is the read-only view every step sees; a `MetricComparison`
// is the only mutable state, owned by a single metric's pipeline run.

use crate::commit::Commit;
use crate::metric::MetricName;
use crate::significance::quantile::QuantileTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Data a step needs but the pair or quantile table does not have
///
/// Expected during normal operation; the comparator skips the failing step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignificanceError {
    #[error("metric {metric} missing in commit {sha}")]
    MissingValue { metric: String, sha: String },

    #[error("quantile for metric {metric} missing")]
    MissingQuantile { metric: String },
}

/// Severity tier of a single metric's change
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Small,
    Medium,
    Large,
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Importance::Small => "small",
            Importance::Medium => "medium",
            Importance::Large => "large",
        };
        f.write_str(name)
    }
}

/// Which way a metric should move
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
    #[default]
    Neutral,
}

/// Whether a change moved the metric the preferred way
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Goodness {
    Good,
    #[default]
    Neutral,
    Bad,
}

impl Goodness {
    pub fn from_delta(delta: f64, direction: Direction) -> Self {
        if delta == 0.0 {
            return Goodness::Neutral;
        }
        match direction {
            Direction::Neutral => Goodness::Neutral,
            Direction::HigherIsBetter if delta > 0.0 => Goodness::Good,
            Direction::LowerIsBetter if delta < 0.0 => Goodness::Good,
            _ => Goodness::Bad,
        }
    }
}

/// Classification of one metric's change with the notes explaining it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSignificance {
    pub metric: String,
    pub importance: Importance,
    pub goodness: Goodness,
    pub notes: Vec<String>,
}

impl MetricSignificance {
    /// Classify `value` against inclusive thresholds, largest first
    ///
    /// Returns `None` when `value` is below `small`.
    ///
    /// # Example
    /// ```
    /// use radar_sig::significance::{Importance, MetricSignificance};
    ///
    /// let sig = MetricSignificance::with_limits("a//b", 45.0, 5.0, 15.0, 45.0).unwrap();
    /// assert_eq!(sig.importance, Importance::Large);
    /// assert!(MetricSignificance::with_limits("a//b", 4.9, 5.0, 15.0, 45.0).is_none());
    /// ```
    pub fn with_limits(
        metric: &str,
        value: f64,
        small: f64,
        medium: f64,
        large: f64,
    ) -> Option<Self> {
        let importance = if value >= large {
            Importance::Large
        } else if value >= medium {
            Importance::Medium
        } else if value >= small {
            Importance::Small
        } else {
            return None;
        };

        Some(Self {
            metric: metric.to_string(),
            importance,
            goodness: Goodness::Neutral,
            notes: Vec::new(),
        })
    }

    pub fn add_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    /// Lower the importance to `target`, recording why
    ///
    /// Never raises: returns `false` and leaves the result untouched when the
    /// current importance is already at or below `target`.
    pub fn demote(&mut self, target: Importance, reason: &str) -> bool {
        if self.importance <= target {
            return false;
        }
        self.add_note(format!("{}→{}, {}", self.importance, target, reason));
        self.importance = target;
        true
    }
}

/// One metric's in-progress evaluation
#[derive(Debug, Clone)]
pub struct MetricComparison {
    pub metric: MetricName,
    pub direction: Direction,
    pub result: Option<MetricSignificance>,
}

impl MetricComparison {
    pub fn new(metric: MetricName, direction: Direction) -> Self {
        Self {
            metric,
            direction,
            result: None,
        }
    }
}

/// Read-only view of one commit pair
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    pub repo: &'a str,
    pub first: &'a Commit,
    pub second: &'a Commit,
    pub metrics: &'a BTreeSet<String>,
    pub quantiles: &'a QuantileTable,
}

impl<'a> Context<'a> {
    /// Values of `metric` in the first and second commit
    pub fn values(&self, metric: &str) -> Result<(f64, f64), SignificanceError> {
        let lookup = |commit: &Commit| {
            commit
                .value(metric)
                .ok_or_else(|| SignificanceError::MissingValue {
                    metric: metric.to_string(),
                    sha: commit.sha().to_string(),
                })
        };
        Ok((lookup(self.first)?, lookup(self.second)?))
    }

    pub fn quantile(&self, metric: &str) -> Result<f64, SignificanceError> {
        self.quantiles
            .get(metric)
            .ok_or_else(|| SignificanceError::MissingQuantile {
                metric: metric.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_importance_ordering() {
        assert!(Importance::Small < Importance::Medium);
        assert!(Importance::Medium < Importance::Large);
    }

    #[test]
    fn test_with_limits_boundaries_inclusive() {
        fn at(v: f64) -> Option<Importance> {
            MetricSignificance::with_limits("m//c", v, 10.0, 20.0, 50.0)
                .map(|s| s.importance)
        }
        assert_eq!(at(9.99), None);
        assert_eq!(at(10.0), Some(Importance::Small));
        assert_eq!(at(20.0), Some(Importance::Medium));
        assert_eq!(at(50.0), Some(Importance::Large));
        assert_eq!(at(f64::INFINITY), Some(Importance::Large));
    }

    #[test]
    fn test_with_limits_tie_resolves_to_higher_tier() {
        // Overlapping thresholds: highest tier wins
        let sig = MetricSignificance::with_limits("m//c", 5.0, 5.0, 5.0, 5.0).unwrap();
        assert_eq!(sig.importance, Importance::Large);
    }

    #[test]
    fn test_demote_never_raises() {
        let mut sig = MetricSignificance::with_limits("m//c", 6.0, 5.0, 15.0, 45.0).unwrap();
        assert_eq!(sig.importance, Importance::Small);
        assert!(!sig.demote(Importance::Medium, "ignored"));
        assert_eq!(sig.importance, Importance::Small);
        assert!(sig.notes.is_empty());
    }

    #[test]
    fn test_demote_records_note() {
        let mut sig = MetricSignificance::with_limits("m//c", 50.0, 5.0, 15.0, 45.0).unwrap();
        assert!(sig.demote(Importance::Small, "expected"));
        assert_eq!(sig.importance, Importance::Small);
        assert_eq!(sig.notes, vec!["large→small, expected".to_string()]);
    }

    #[test]
    fn test_goodness_from_delta() {
        assert_eq!(
            Goodness::from_delta(-5.0, Direction::LowerIsBetter),
            Goodness::Good
        );
        assert_eq!(
            Goodness::from_delta(5.0, Direction::LowerIsBetter),
            Goodness::Bad
        );
        assert_eq!(
            Goodness::from_delta(5.0, Direction::HigherIsBetter),
            Goodness::Good
        );
        assert_eq!(Goodness::from_delta(5.0, Direction::Neutral), Goodness::Neutral);
        assert_eq!(
            Goodness::from_delta(0.0, Direction::HigherIsBetter),
            Goodness::Neutral
        );
    }

    #[test]
    fn test_context_lookups_report_missing_data() {
        let first = Commit::new("a", "", [("t//instructions", 1.0)]).unwrap();
        let second = Commit::new("b", "", [("t//lines", 1.0)]).unwrap();
        let metrics = BTreeSet::new();
        let quantiles = QuantileTable::new();
        let ctx = Context {
            repo: "lean4",
            first: &first,
            second: &second,
            metrics: &metrics,
            quantiles: &quantiles,
        };

        assert_eq!(
            ctx.values("t//instructions"),
            Err(SignificanceError::MissingValue {
                metric: "t//instructions".to_string(),
                sha: "b".to_string(),
            })
        );
        assert!(matches!(
            ctx.quantile("t//instructions"),
            Err(SignificanceError::MissingQuantile { .. })
        ));
    }
}
