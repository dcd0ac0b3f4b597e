// Rule steps: composable checks and reducers over one metric comparison
//
// Checks classify a change into an importance tier. Reducers only ever
// lower an existing classification. Every step is plain data so pipelines
// can be loaded from TOML, printed, and tested in isolation.

use crate::significance::context::{
    Context, Goodness, Importance, MetricComparison, MetricSignificance, SignificanceError,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of a metric pipeline
///
/// # Example TOML
/// ```toml
/// steps = [
///   { kind = "check-quantile-factor", small = 5.0, medium = 15.0, large = 45.0 },
///   { kind = "reduce-expected-direction", reference_category = "lines" },
///   { kind = "reduce-absolute-limits", small = 1e9, medium = 5e9 },
/// ]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Step {
    /// Classify `|v2 - v1| / v1` in percent
    CheckDeltaPercent { small: f64, medium: f64, large: f64 },

    /// Classify `|v2 - v1| / quantile`
    CheckQuantileFactor { small: f64, medium: f64, large: f64 },

    /// Demote to Small when the sibling `topic//reference_category` moved the
    /// same way
    ReduceExpectedDirection { reference_category: String },

    /// Demote when the absolute change is below a floor
    ReduceAbsoluteLimits {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        small: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        medium: Option<f64>,
    },
}

impl Step {
    pub fn check_delta_percent(small: f64, medium: f64, large: f64) -> Self {
        Step::CheckDeltaPercent {
            small,
            medium,
            large,
        }
    }

    pub fn check_quantile_factor(small: f64, medium: f64, large: f64) -> Self {
        Step::CheckQuantileFactor {
            small,
            medium,
            large,
        }
    }

    pub fn reduce_expected_direction(reference_category: &str) -> Self {
        Step::ReduceExpectedDirection {
            reference_category: reference_category.to_string(),
        }
    }

    pub fn reduce_absolute_limits(small: Option<f64>, medium: Option<f64>) -> Self {
        Step::ReduceAbsoluteLimits { small, medium }
    }

    /// Whether this step can create a classification
    pub fn is_check(&self) -> bool {
        matches!(
            self,
            Step::CheckDeltaPercent { .. } | Step::CheckQuantileFactor { .. }
        )
    }

    /// Validate thresholds: finite, non-negative and ascending
    pub fn validate(&self) -> Result<(), String> {
        let ascending = |values: &[f64]| {
            if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
                return Err(format!("{}: thresholds must be finite and >= 0", self));
            }
            if values.windows(2).any(|w| w[0] > w[1]) {
                return Err(format!("{}: thresholds must be ascending", self));
            }
            Ok(())
        };

        match self {
            Step::CheckDeltaPercent {
                small,
                medium,
                large,
            }
            | Step::CheckQuantileFactor {
                small,
                medium,
                large,
            } => ascending(&[*small, *medium, *large]),
            Step::ReduceExpectedDirection { reference_category } => {
                if reference_category.is_empty() || reference_category.contains("//") {
                    return Err(format!("{}: invalid reference category", self));
                }
                Ok(())
            }
            Step::ReduceAbsoluteLimits { small, medium } => {
                let limits: Vec<f64> = small.iter().chain(medium.iter()).copied().collect();
                ascending(&limits)
            }
        }
    }

    /// Run this step against one comparison
    ///
    /// A missing value or quantile is returned as an error and leaves `comp`
    /// unchanged; the comparator treats that as "no information".
    pub fn apply(
        &self,
        ctx: &Context<'_>,
        comp: &mut MetricComparison,
    ) -> Result<(), SignificanceError> {
        match self {
            Step::CheckDeltaPercent {
                small,
                medium,
                large,
            } => check_delta_percent(ctx, comp, *small, *medium, *large),
            Step::CheckQuantileFactor {
                small,
                medium,
                large,
            } => check_quantile_factor(ctx, comp, *small, *medium, *large),
            Step::ReduceExpectedDirection { reference_category } => {
                reduce_expected_direction(ctx, comp, reference_category)
            }
            Step::ReduceAbsoluteLimits { small, medium } => {
                reduce_absolute_limits(ctx, comp, *small, *medium)
            }
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::CheckDeltaPercent {
                small,
                medium,
                large,
            } => write!(f, "check-delta-percent({}, {}, {})", small, medium, large),
            Step::CheckQuantileFactor {
                small,
                medium,
                large,
            } => write!(f, "check-quantile-factor({}, {}, {})", small, medium, large),
            Step::ReduceExpectedDirection { reference_category } => {
                write!(f, "reduce-expected-direction({})", reference_category)
            }
            Step::ReduceAbsoluteLimits { small, medium } => {
                let show = |v: &Option<f64>| v.map_or("-".to_string(), |v| v.to_string());
                write!(
                    f,
                    "reduce-absolute-limits({}, {})",
                    show(small),
                    show(medium)
                )
            }
        }
    }
}

fn delta_percent(v1: f64, v2: f64) -> f64 {
    (v2 - v1) / v1 * 100.0
}

/// Install a fresh classification unless an earlier check already set one
fn classify(comp: &mut MetricComparison, sig: MetricSignificance) {
    if comp.result.is_some() {
        tracing::debug!("{} already classified, ignoring later check", comp.metric);
        return;
    }
    comp.result = Some(sig);
}

fn check_delta_percent(
    ctx: &Context<'_>,
    comp: &mut MetricComparison,
    small: f64,
    medium: f64,
    large: f64,
) -> Result<(), SignificanceError> {
    let metric = comp.metric.to_string();
    let (v1, v2) = ctx.values(&metric)?;
    if v1 == 0.0 {
        return Ok(());
    }

    let percent = delta_percent(v1, v2);
    let Some(mut sig) =
        MetricSignificance::with_limits(&metric, percent.abs(), small, medium, large)
    else {
        return Ok(());
    };
    sig.goodness = Goodness::from_delta(v2 - v1, comp.direction);
    sig.add_note(format!("{:+.2}%", percent));

    classify(comp, sig);
    Ok(())
}

fn check_quantile_factor(
    ctx: &Context<'_>,
    comp: &mut MetricComparison,
    small: f64,
    medium: f64,
    large: f64,
) -> Result<(), SignificanceError> {
    let metric = comp.metric.to_string();
    let (v1, v2) = ctx.values(&metric)?;
    let quantile = ctx.quantile(&metric)?;
    if quantile == 0.0 {
        return Ok(());
    }

    let factor = (v2 - v1).abs() / quantile;
    let Some(mut sig) = MetricSignificance::with_limits(&metric, factor, small, medium, large)
    else {
        return Ok(());
    };
    sig.goodness = Goodness::from_delta(v2 - v1, comp.direction);
    if v1 != 0.0 {
        sig.add_note(format!("{:+.2}%", delta_percent(v1, v2)));
    }
    sig.add_note(format!("{:.2} * quantile", factor));

    classify(comp, sig);
    Ok(())
}

fn reduce_expected_direction(
    ctx: &Context<'_>,
    comp: &mut MetricComparison,
    reference_category: &str,
) -> Result<(), SignificanceError> {
    let Some(result) = comp.result.as_mut() else {
        return Ok(());
    };

    let reference = comp.metric.with_category(reference_category);
    let (mv1, mv2) = ctx.values(&comp.metric.to_string())?;
    let (rv1, rv2) = ctx.values(&reference)?;

    let m_delta = mv2 - mv1;
    let r_delta = rv2 - rv1;
    let expected = (m_delta > 0.0 && r_delta > 0.0) || (m_delta < 0.0 && r_delta < 0.0);
    if expected {
        result.demote(Importance::Small, "expected");
    }
    Ok(())
}

fn reduce_absolute_limits(
    ctx: &Context<'_>,
    comp: &mut MetricComparison,
    small: Option<f64>,
    medium: Option<f64>,
) -> Result<(), SignificanceError> {
    let Some(result) = comp.result.as_mut() else {
        return Ok(());
    };

    let (v1, v2) = ctx.values(&comp.metric.to_string())?;
    let delta = (v2 - v1).abs();

    if small.is_some_and(|limit| delta < limit) {
        result.demote(Importance::Small, "small change");
    } else if medium.is_some_and(|limit| delta < limit) {
        result.demote(Importance::Medium, "medium change");
    }
    Ok(())
}
