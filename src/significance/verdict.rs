// Pair verdict: aggregate per-metric severities into one yes/no
//
// Counts are cumulative: a Large change also counts toward the Medium and
// Small thresholds, a Medium change toward the Small threshold.

use crate::significance::config::SignificanceConfig;
use crate::significance::context::{Importance, MetricSignificance};
use serde::Serialize;

/// Number of classified metrics per importance tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub small: usize,
    pub medium: usize,
    pub large: usize,
}

impl SeverityCounts {
    pub fn new(small: usize, medium: usize, large: usize) -> Self {
        Self {
            small,
            medium,
            large,
        }
    }

    pub fn from_results(results: &[MetricSignificance]) -> Self {
        let mut counts = Self::default();
        for result in results {
            match result.importance {
                Importance::Small => counts.small += 1,
                Importance::Medium => counts.medium += 1,
                Importance::Large => counts.large += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.small + self.medium + self.large
    }

    /// Significant iff L ≥ large_count, M + L ≥ medium_count or S + M + L ≥ small_count
    ///
    /// # Example
    /// ```
    /// use radar_sig::significance::{SeverityCounts, SignificanceConfig};
    ///
    /// let config = SignificanceConfig::default();
    /// assert!(SeverityCounts::new(0, 0, 1).is_significant(&config));
    /// assert!(SeverityCounts::new(0, 5, 0).is_significant(&config));
    /// assert!(!SeverityCounts::new(19, 0, 0).is_significant(&config));
    /// ```
    pub fn is_significant(&self, config: &SignificanceConfig) -> bool {
        let at_least_large = self.large;
        let at_least_medium = at_least_large + self.medium;
        let at_least_small = at_least_medium + self.small;

        at_least_large >= config.large_count
            || at_least_medium >= config.medium_count
            || at_least_small >= config.small_count
    }
}

/// Whether the classified metrics of one commit pair are significant overall
pub fn is_significant(results: &[MetricSignificance], config: &SignificanceConfig) -> bool {
    SeverityCounts::from_results(results).is_significant(config)
}

/// Classified metrics of one pair grouped by tier, each sorted by metric name
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeverityBuckets {
    pub large: Vec<MetricSignificance>,
    pub medium: Vec<MetricSignificance>,
    pub small: Vec<MetricSignificance>,
}

impl SeverityBuckets {
    pub fn from_results(results: Vec<MetricSignificance>) -> Self {
        let mut buckets = Self::default();
        for result in results {
            match result.importance {
                Importance::Large => buckets.large.push(result),
                Importance::Medium => buckets.medium.push(result),
                Importance::Small => buckets.small.push(result),
            }
        }
        for bucket in [&mut buckets.large, &mut buckets.medium, &mut buckets.small] {
            bucket.sort_by(|a, b| a.metric.cmp(&b.metric));
        }
        buckets
    }

    pub fn counts(&self) -> SeverityCounts {
        SeverityCounts::new(self.small.len(), self.medium.len(), self.large.len())
    }

    pub fn is_empty(&self) -> bool {
        self.counts().total() == 0
    }

    /// Non-empty tiers, most severe first
    pub fn tiers(&self) -> impl Iterator<Item = (Importance, &[MetricSignificance])> {
        [
            (Importance::Large, self.large.as_slice()),
            (Importance::Medium, self.medium.as_slice()),
            (Importance::Small, self.small.as_slice()),
        ]
        .into_iter()
        .filter(|(_, results)| !results.is_empty())
    }
}
