// Comparator: run every metric's routed pipeline for one commit pair
//
// Each metric gets a fresh MetricComparison. A step that lacks data is
// skipped on its own; the rest of the pipeline and all other metrics
// carry on unaffected.

use crate::commit::Commit;
use crate::metric::{MalformedMetricName, MetricName};
use crate::significance::context::{Context, Direction, MetricComparison, MetricSignificance};
use crate::significance::quantile::QuantileTable;
use crate::significance::router::RuleBook;
use crate::significance::steps::Step;
use std::collections::BTreeSet;

/// Run `steps` in order against one metric and return its classification
///
/// Steps failing with missing data leave the comparison as it was.
pub fn evaluate_metric(
    ctx: &Context<'_>,
    metric: MetricName,
    direction: Direction,
    steps: &[Step],
) -> Option<MetricSignificance> {
    let mut comp = MetricComparison::new(metric, direction);

    for step in steps {
        if let Err(e) = step.apply(ctx, &mut comp) {
            tracing::debug!("{}: skipping {}: {}", comp.metric, step, e);
        }
    }

    comp.result
}

/// Classify every metric of `metrics` for the pair `first` → `second`
///
/// Returns only the metrics that ended up classified, in `metrics` order.
///
/// # Errors
/// Fails if any metric name is not of the form `topic//category`; callers
/// must validate names before comparing.
///
/// # Example
/// ```
/// use radar_sig::commit::Commit;
/// use radar_sig::significance::{compare_commits, Importance, QuantileTable, RuleBook};
/// use std::collections::BTreeSet;
///
/// let rules = RuleBook::builtin().unwrap();
/// let first = Commit::new("a", "", [("build//instructions", 100.0)]).unwrap();
/// let second = Commit::new("b", "", [("build//instructions", 600.0)]).unwrap();
/// let metrics: BTreeSet<String> = ["build//instructions".to_string()].into();
/// let quantiles: QuantileTable = [("build//instructions", 10.0)].into_iter().collect();
///
/// let results = compare_commits(&rules, "lean4", &first, &second, &metrics, &quantiles).unwrap();
/// assert_eq!(results[0].importance, Importance::Large);
/// ```
pub fn compare_commits(
    rules: &RuleBook,
    repo: &str,
    first: &Commit,
    second: &Commit,
    metrics: &BTreeSet<String>,
    quantiles: &QuantileTable,
) -> Result<Vec<MetricSignificance>, MalformedMetricName> {
    let ctx = Context {
        repo,
        first,
        second,
        metrics,
        quantiles,
    };

    let names = metrics
        .iter()
        .map(|m| MetricName::parse(m))
        .collect::<Result<Vec<_>, _>>()?;

    let mut results = Vec::new();
    for name in names {
        let Some(rule) = rules.rule_for_metric(repo, &name.to_string()) else {
            continue;
        };
        if let Some(sig) = evaluate_metric(&ctx, name, rule.direction(), rule.steps()) {
            results.push(sig);
        }
    }

    tracing::debug!(
        "{} → {}: {} of {} metrics classified",
        first.sha(),
        second.sha(),
        results.len(),
        metrics.len()
    );
    Ok(results)
}
