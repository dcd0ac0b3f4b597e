// Commit significance classification
//
// Decides, for a pair of consecutive commits, which benchmark metrics
// changed significantly and whether the pair as a whole deserves attention.
//
// Pipeline:
// - Quantile engine: per-metric change scale from the full history
// - Router: per-repository decision table picking a step pipeline per metric
// - Steps: checks that classify a change, reducers that only demote it
// - Comparator: runs every metric's pipeline over one commit pair
// - Verdict: cumulative Large / Medium / Small alarm thresholds
//
// All thresholds come from SignificanceConfig or the rule tables; nothing
// here is tuned per metric in code.

mod compare;
mod config;
mod context;
mod quantile;
mod router;
mod steps;
mod verdict;

pub use compare::{compare_commits, evaluate_metric};
pub use config::SignificanceConfig;
pub use context::{
    Context, Direction, Goodness, Importance, MetricComparison, MetricSignificance,
    SignificanceError,
};
pub use quantile::{abs_quantile, compute_deltas, percentile, quantile_for_series, QuantileTable};
pub use router::{Rule, RuleBook};
pub use steps::Step;
pub use verdict::{is_significant, SeverityBuckets, SeverityCounts};
