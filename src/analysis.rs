//! Analysis of the most recent commit pairs of a history
//!
//! Quantiles are computed over the whole history; only the pairs inside the
//! analysis window are classified.

use crate::commit::{metric_union, Commit};
use crate::significance::{
    compare_commits, QuantileTable, RuleBook, SeverityBuckets, SeverityCounts, SignificanceConfig,
};
use anyhow::{Context, Result};
use serde::Serialize;
use std::ops::Range;

/// Which trailing slice of the history to analyze
///
/// `amount` pairs are analyzed after skipping the newest `skip` commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisWindow {
    pub amount: usize,
    pub skip: usize,
}

impl Default for AnalysisWindow {
    fn default() -> Self {
        Self {
            amount: 30,
            skip: 0,
        }
    }
}

impl AnalysisWindow {
    pub fn new(amount: usize, skip: usize) -> Self {
        Self { amount, skip }
    }

    /// Commit index range covering the window in a history of `len` commits
    ///
    /// The range holds `amount + 1` commits so that it yields `amount` pairs.
    ///
    /// # Example
    /// ```
    /// use radar_sig::analysis::AnalysisWindow;
    ///
    /// assert_eq!(AnalysisWindow::new(3, 1).range(10).unwrap(), 5..9);
    /// assert!(AnalysisWindow::new(10, 0).range(10).is_err());
    /// ```
    pub fn range(&self, len: usize) -> Result<Range<usize>> {
        if self.amount == 0 {
            anyhow::bail!("Analysis window must cover at least one commit pair");
        }

        let needed = self
            .amount
            .checked_add(self.skip)
            .and_then(|n| n.checked_add(1))
            .with_context(|| {
                format!(
                    "History has {} commits, window of {} pairs with {} skipped is out of range",
                    len, self.amount, self.skip
                )
            })?;
        let start = len.checked_sub(needed).with_context(|| {
            format!(
                "History has {} commits, window needs {} ({} pairs, {} skipped)",
                len, needed, self.amount, self.skip
            )
        })?;
        Ok(start..len - self.skip)
    }
}

/// Classification of one consecutive commit pair
#[derive(Debug, Clone, Serialize)]
pub struct PairAnalysis {
    pub first: String,
    pub second: String,
    pub title: String,
    pub significant: bool,
    pub counts: SeverityCounts,
    pub changes: SeverityBuckets,
}

/// Result of analyzing a window of commit pairs
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub repo: String,
    pub commits: usize,
    pub metrics: usize,
    pub quantiles: usize,
    pub pairs: Vec<PairAnalysis>,
}

impl Analysis {
    pub fn significant_pairs(&self) -> usize {
        self.pairs.iter().filter(|p| p.significant).count()
    }
}

/// Classify every commit pair in `window` of `commits`
///
/// # Errors
/// Fails on an invalid configuration, a window that does not fit the history,
/// or a malformed metric name anywhere in the history.
pub fn analyze(
    repo: &str,
    commits: &[Commit],
    window: AnalysisWindow,
    rules: &RuleBook,
    config: &SignificanceConfig,
) -> Result<Analysis> {
    config.validate().map_err(anyhow::Error::msg)?;
    if !rules.has_repo(repo) {
        tracing::warn!("No rules for repo '{}', nothing will be flagged", repo);
    }

    let range = window.range(commits.len())?;
    let metrics = metric_union(commits);
    let quantiles = QuantileTable::from_commits(commits, config);
    tracing::info!(
        "Analyzing {} pairs of {} ({} metrics, {} quantiles)",
        range.len().saturating_sub(1),
        repo,
        metrics.len(),
        quantiles.len()
    );

    let mut pairs = Vec::with_capacity(range.len().saturating_sub(1));
    for pair in commits[range].windows(2) {
        let (first, second) = (&pair[0], &pair[1]);
        let results = compare_commits(rules, repo, first, second, &metrics, &quantiles)
            .with_context(|| format!("Failed to compare {} → {}", first.sha(), second.sha()))?;

        let changes = SeverityBuckets::from_results(results);
        let counts = changes.counts();
        let significant = counts.is_significant(config);
        tracing::debug!(
            "{}: {} large, {} medium, {} small, significant={}",
            second.sha(),
            counts.large,
            counts.medium,
            counts.small,
            significant
        );

        pairs.push(PairAnalysis {
            first: first.sha().to_string(),
            second: second.sha().to_string(),
            title: second.title().to_string(),
            significant,
            counts,
            changes,
        });
    }

    Ok(Analysis {
        repo: repo.to_string(),
        commits: commits.len(),
        metrics: metrics.len(),
        quantiles: quantiles.len(),
        pairs,
    })
}
