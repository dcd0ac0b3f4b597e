// Configuration for commit significance classification
//
// Quantile scale estimation and the cumulative alarm thresholds that turn
// per-metric importances into a single verdict for a commit pair.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for quantile estimation and pair verdicts
///
/// The alarm thresholds are cumulative: `medium_count` counts Medium and
/// Large results, `small_count` counts every classified result.
///
/// # Example
/// ```
/// use radar_sig::significance::SignificanceConfig;
///
/// let config = SignificanceConfig::default();
/// assert_eq!(config.quantile, 0.9);
/// assert_eq!(config.large_count, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignificanceConfig {
    /// Percentile of the absolute commit-to-commit deltas used as the
    /// "typical large change" scale of a metric
    ///
    /// Default: 0.9
    pub quantile: f64,

    /// Minimum number of usable deltas before a quantile is computed
    ///
    /// Metrics with a shorter history get no quantile, so quantile-factor
    /// checks skip them.
    ///
    /// Default: 10
    pub min_deltas: usize,

    /// Large results needed for a significant pair
    pub large_count: usize,

    /// Medium-or-larger results needed for a significant pair
    pub medium_count: usize,

    /// Classified results of any tier needed for a significant pair
    pub small_count: usize,
}

impl Default for SignificanceConfig {
    fn default() -> Self {
        Self {
            quantile: 0.9,
            min_deltas: 10,
            large_count: 1,
            medium_count: 5,
            small_count: 20,
        }
    }
}

impl SignificanceConfig {
    /// Create a strict configuration (fewer significant pairs)
    ///
    /// Needs a longer history and more changes before raising an alarm.
    pub fn strict() -> Self {
        Self {
            quantile: 0.95,
            min_deltas: 20,
            large_count: 2,
            medium_count: 8,
            small_count: 30,
        }
    }

    /// Create a permissive configuration (more significant pairs)
    pub fn permissive() -> Self {
        Self {
            quantile: 0.8,
            min_deltas: 5,
            large_count: 1,
            medium_count: 3,
            small_count: 10,
        }
    }

    /// Load a configuration from a TOML file
    ///
    /// Missing keys take their default values. The result is validated.
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
        config.validate().map_err(anyhow::Error::msg)?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(0.0..=1.0).contains(&self.quantile) {
            return Err(format!("quantile must be in [0, 1], got {}", self.quantile));
        }

        if self.min_deltas < 2 {
            return Err(format!("min_deltas must be >= 2, got {}", self.min_deltas));
        }

        if self.large_count == 0 {
            return Err("large_count must be >= 1".to_string());
        }

        if self.medium_count < self.large_count || self.small_count < self.medium_count {
            return Err(format!(
                "alarm thresholds must satisfy large <= medium <= small, got {} / {} / {}",
                self.large_count, self.medium_count, self.small_count
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SignificanceConfig::default();
        assert_eq!(config.quantile, 0.9);
        assert_eq!(config.min_deltas, 10);
        assert_eq!(config.large_count, 1);
        assert_eq!(config.medium_count, 5);
        assert_eq!(config.small_count, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_strict_config() {
        let config = SignificanceConfig::strict();
        assert_eq!(config.quantile, 0.95);
        assert_eq!(config.min_deltas, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_permissive_config() {
        let config = SignificanceConfig::permissive();
        assert_eq!(config.quantile, 0.8);
        assert_eq!(config.medium_count, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_quantile() {
        let mut config = SignificanceConfig::default();
        config.quantile = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_min_deltas() {
        let mut config = SignificanceConfig::default();
        config.min_deltas = 0;
        assert!(config.validate().is_err());

        // A single delta is never a history
        config.min_deltas = 1;
        assert!(config.validate().is_err());

        config.min_deltas = 2;
        assert!(config.validate().is_ok());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_threshold_order() {
        let mut config = SignificanceConfig::default();
        config.medium_count = 30;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_toml_file_validates() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.toml");
        std::fs::write(&good, "quantile = 0.75\nmin_deltas = 4\n").unwrap();
        let config = SignificanceConfig::from_toml(&good).unwrap();
        assert_eq!(config.quantile, 0.75);
        assert_eq!(config.min_deltas, 4);

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "large_count = 0\n").unwrap();
        assert!(SignificanceConfig::from_toml(&bad).is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: SignificanceConfig = toml::from_str("small_count = 40").unwrap();
        assert_eq!(config.small_count, 40);
        assert_eq!(config.medium_count, 5);
    }
}
