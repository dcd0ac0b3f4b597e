//! Text and JSON rendering of analysis results

use crate::analysis::{Analysis, PairAnalysis};
use crate::significance::{Importance, MetricSignificance, QuantileTable, Rule, Step};
use serde::Serialize;

/// Root JSON output structure
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport<'a> {
    /// Format version identifier
    pub version: &'static str,
    /// Format name
    pub format: &'static str,
    /// Number of pairs judged significant
    pub significant_pairs: usize,
    #[serde(flatten)]
    pub analysis: &'a Analysis,
}

impl<'a> JsonReport<'a> {
    pub fn new(analysis: &'a Analysis) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            format: "radar-sig-json-v1",
            significant_pairs: analysis.significant_pairs(),
            analysis,
        }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Human-readable report, one block per commit pair
pub fn analysis_to_text(analysis: &Analysis) -> String {
    let mut report = String::new();

    for pair in &analysis.pairs {
        report.push('\n');
        push_pair(&mut report, pair);
    }

    report.push_str(&format!(
        "\nSignificant: {}/{}\n",
        analysis.significant_pairs(),
        analysis.pairs.len()
    ));
    report
}

fn push_pair(report: &mut String, pair: &PairAnalysis) {
    report.push_str(&format!("{} {}\n", pair.second, pair.title));
    if pair.significant {
        report.push_str("❌ Significant changes detected.\n");
    } else {
        report.push_str("✅ No significant changes.\n");
    }

    for (importance, results) in pair.changes.tiers() {
        let name = match importance {
            Importance::Large => "Large",
            Importance::Medium => "Medium",
            Importance::Small => "Small",
        };
        push_section(report, name, results);
    }
}

fn push_section(report: &mut String, name: &str, results: &[MetricSignificance]) {
    let width = results.iter().map(|r| r.metric.len()).max().unwrap_or(0);

    report.push_str(&format!("{} ({}):\n", name, results.len()));
    for result in results {
        let notes: String = result.notes.iter().map(|n| format!(" ({})", n)).collect();
        let line = format!("  {:width$}{}", result.metric, notes, width = width);
        report.push_str(line.trim_end());
        report.push('\n');
    }
}

/// Quantile table as `metric<TAB>quantile` lines
pub fn quantiles_to_text(quantiles: &QuantileTable) -> String {
    quantiles
        .iter()
        .map(|(metric, q)| format!("{}\t{}\n", metric, q))
        .collect()
}

pub fn quantiles_to_json(quantiles: &QuantileTable) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(quantiles)?)
}

/// Describe the rule a metric is routed to
pub fn rule_to_text(repo: &str, metric: &str, rule: Option<&Rule>) -> String {
    let Some(rule) = rule else {
        return format!("{}: {} matches no rule (never flagged)\n", repo, metric);
    };

    let mut out = format!(
        "{}: {} matches '{}' ({:?})\n",
        repo,
        metric,
        rule.pattern(),
        rule.direction()
    );
    if !rule.steps().iter().any(Step::is_check) {
        out.push_str("  (no checks, never flagged)\n");
    }
    for step in rule.steps() {
        out.push_str(&format!("  {}\n", step));
    }
    out
}
