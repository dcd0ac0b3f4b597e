// Quantile engine: robust per-metric change scale from history
//
// For each metric the absolute commit-to-commit deltas over the whole
// history are collected and their 90th percentile becomes the metric's
// "typical large change". Quantile-factor checks divide a new delta by it.

use crate::commit::{metric_series, metric_union, Commit};
use crate::significance::config::SignificanceConfig;
use serde::Serialize;
use std::collections::BTreeMap;

/// Deltas between adjacent recorded values
///
/// Only pairs `(i, i + 1)` where both values are present contribute; a gap
/// removes the deltas on either side of it instead of bridging across.
pub fn compute_deltas(values: &[Option<f64>]) -> Vec<f64> {
    values
        .windows(2)
        .filter_map(|pair| match (pair[0], pair[1]) {
            (Some(first), Some(second)) => Some(second - first),
            _ => None,
        })
        .collect()
}

/// Percentile of ascending sorted data
///
/// Uses `x = p * (len - 1)` and interpolates linearly between `floor(x)` and
/// `floor(x) + 1`, returning the maximum once `x` reaches the last index.
/// `p` is clamped to `[0, 1]`. Returns `None` for empty input.
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    let top = sorted.len().checked_sub(1)?;
    let p = p.clamp(0.0, 1.0);

    let x = p * top as f64;
    let lower = x.floor() as usize;
    if lower >= top {
        return Some(sorted[top]);
    }

    let weight = x - lower as f64;
    Some(sorted[lower] * (1.0 - weight) + sorted[lower + 1] * weight)
}

/// Percentile of the absolute deltas, or `None` with fewer than `min_deltas`
///
/// Zero or one delta never yields a quantile, whatever `min_deltas` says.
pub fn abs_quantile(deltas: &[f64], p: f64, min_deltas: usize) -> Option<f64> {
    if deltas.len() < min_deltas.max(2) {
        return None;
    }

    let mut values: Vec<f64> = deltas.iter().map(|d| d.abs()).collect();
    values.sort_by(|a, b| a.total_cmp(b));
    percentile(&values, p)
}

/// Quantile for one metric's history, ordered oldest to newest
pub fn quantile_for_series(values: &[Option<f64>], config: &SignificanceConfig) -> Option<f64> {
    let deltas = compute_deltas(values);
    abs_quantile(&deltas, config.quantile, config.min_deltas)
}

/// Metric name → quantile, for every metric with enough history
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct QuantileTable {
    quantiles: BTreeMap<String, f64>,
}

impl QuantileTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute quantiles over the full commit history
    ///
    /// Metrics with insufficient history are left out of the table.
    pub fn from_commits(commits: &[Commit], config: &SignificanceConfig) -> Self {
        let metrics = metric_union(commits);
        let mut table = Self::new();

        for metric in &metrics {
            let series = metric_series(commits, metric);
            match quantile_for_series(&series, config) {
                Some(q) => table.insert(metric.clone(), q),
                None => tracing::trace!("Insufficient history for {}", metric),
            }
        }

        tracing::info!(
            "Computed {} quantiles for {} metrics",
            table.len(),
            metrics.len()
        );
        table
    }

    pub fn insert(&mut self, metric: impl Into<String>, quantile: f64) {
        self.quantiles.insert(metric.into(), quantile);
    }

    pub fn get(&self, metric: &str) -> Option<f64> {
        self.quantiles.get(metric).copied()
    }

    pub fn len(&self) -> usize {
        self.quantiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quantiles.is_empty()
    }

    /// Entries sorted by metric name
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.quantiles.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for QuantileTable {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (metric, q) in iter {
            table.insert(metric, q);
        }
        table
    }
}
