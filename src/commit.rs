//! Commit records and their JSON Lines storage format
//!
//! Each line of a data file is one commit, oldest first:
//!
//! ```text
//! {"sha": "3f2a...", "title": "chore: bump toolchain", "metrics": {"build//instructions": 1.2e12}}
//! ```
//!
//! Records are validated when they cross this boundary; the significance
//! core assumes every metric name is well-formed.

use crate::metric::{MalformedMetricName, MetricName};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Reasons a single commit record is rejected
#[derive(Debug, Error)]
pub enum InvalidCommit {
    #[error("commit sha must not be empty")]
    EmptySha,

    #[error(transparent)]
    MalformedMetric(#[from] MalformedMetricName),

    #[error("metric '{metric}' has non-finite value {value}")]
    NonFiniteValue { metric: String, value: f64 },
}

/// Errors loading or saving commit data
#[derive(Debug, Error)]
pub enum CommitError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: invalid JSON: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: {source}")]
    Invalid {
        line: usize,
        #[source]
        source: InvalidCommit,
    },
}

#[derive(Deserialize)]
struct RawCommit {
    sha: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    metrics: BTreeMap<String, f64>,
}

/// One commit with its flat metric map
///
/// Immutable once constructed. A metric missing from the map was not
/// recorded for this commit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Commit {
    sha: String,
    title: String,
    metrics: BTreeMap<String, f64>,
}

impl Commit {
    /// Build a commit, validating sha, metric names and values
    pub fn new<S, I>(sha: &str, title: &str, metrics: I) -> Result<Self, InvalidCommit>
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, f64)>,
    {
        if sha.trim().is_empty() {
            return Err(InvalidCommit::EmptySha);
        }

        let mut map = BTreeMap::new();
        for (name, value) in metrics {
            let name = name.into();
            MetricName::parse(&name)?;
            if !value.is_finite() {
                return Err(InvalidCommit::NonFiniteValue {
                    metric: name,
                    value,
                });
            }
            map.insert(name, value);
        }

        Ok(Self {
            sha: sha.to_string(),
            title: title.to_string(),
            metrics: map,
        })
    }

    /// Parse one JSON line; `line` is only used for error messages
    pub fn parse_line(line: usize, text: &str) -> Result<Self, CommitError> {
        let raw: RawCommit =
            serde_json::from_str(text).map_err(|source| CommitError::Json { line, source })?;
        Self::new(&raw.sha, &raw.title, raw.metrics)
            .map_err(|source| CommitError::Invalid { line, source })
    }

    /// Parse a single standalone JSON record
    pub fn from_json_line(text: &str) -> Result<Self, CommitError> {
        Self::parse_line(1, text)
    }

    /// Load all commits from a JSON Lines file, preserving file order
    ///
    /// Blank lines are skipped.
    pub fn load_all<P: AsRef<Path>>(path: P) -> Result<Vec<Self>, CommitError> {
        let path = path.as_ref();
        let io_err = |source| CommitError::Io {
            path: path.to_path_buf(),
            source,
        };

        let reader = BufReader::new(File::open(path).map_err(io_err)?);
        let mut commits = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line.map_err(io_err)?;
            if line.trim().is_empty() {
                continue;
            }
            commits.push(Self::parse_line(i + 1, line.trim())?);
        }

        tracing::info!("Loaded {} commits from {}", commits.len(), path.display());
        Ok(commits)
    }

    /// Write commits as JSON Lines
    pub fn save_all<P: AsRef<Path>>(commits: &[Self], path: P) -> Result<(), CommitError> {
        let path = path.as_ref();
        let io_err = |source| CommitError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut writer = BufWriter::new(File::create(path).map_err(io_err)?);
        for (i, commit) in commits.iter().enumerate() {
            let line = serde_json::to_string(commit)
                .map_err(|source| CommitError::Json { line: i + 1, source })?;
            writeln!(writer, "{}", line).map_err(io_err)?;
        }
        writer.flush().map_err(io_err)
    }

    pub fn sha(&self) -> &str {
        &self.sha
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn metrics(&self) -> &BTreeMap<String, f64> {
        &self.metrics
    }

    /// Value of a metric, if recorded for this commit
    pub fn value(&self, metric: &str) -> Option<f64> {
        self.metrics.get(metric).copied()
    }
}

/// All metric names recorded by any of the commits
pub fn metric_union(commits: &[Commit]) -> BTreeSet<String> {
    commits
        .iter()
        .flat_map(|c| c.metrics.keys().cloned())
        .collect()
}

/// Values of one metric across the commits, `None` where it is missing
pub fn metric_series(commits: &[Commit], metric: &str) -> Vec<Option<f64>> {
    commits.iter().map(|c| c.value(metric)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_line_valid() {
        let commit = Commit::from_json_line(
            r#"{"sha":"abc123","title":"Fix parser","metrics":{"build//instructions":100.0}}"#,
        )
        .unwrap();

        assert_eq!(commit.sha(), "abc123");
        assert_eq!(commit.title(), "Fix parser");
        assert_eq!(commit.value("build//instructions"), Some(100.0));
        assert_eq!(commit.value("build//lines"), None);
    }

    #[test]
    fn test_parse_line_rejects_malformed_metric() {
        let line = r#"{"sha": "abc", "title": "", "metrics": {"nosep": 1}}"#;
        let err = Commit::parse_line(7, line).unwrap_err();
        assert!(matches!(err, CommitError::Invalid { line: 7, .. }));
        assert!(err.to_string().contains("nosep"));
    }

    #[test]
    fn test_parse_line_rejects_missing_sha() {
        let err = Commit::from_json_line(r#"{"title": "x", "metrics": {}}"#).unwrap_err();
        assert!(matches!(err, CommitError::Json { .. }));
    }

    #[test]
    fn test_parse_line_rejects_empty_sha() {
        let err = Commit::from_json_line(r#"{"sha": " ", "metrics": {}}"#).unwrap_err();
        assert!(matches!(
            err,
            CommitError::Invalid {
                source: InvalidCommit::EmptySha,
                ..
            }
        ));
    }

    #[test]
    fn test_new_rejects_non_finite() {
        let result = Commit::new("abc", "", [("a//b", f64::NAN)]);
        assert!(matches!(result, Err(InvalidCommit::NonFiniteValue { .. })));
    }

    #[test]
    fn test_load_all_skips_blank_lines() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"sha": "a", "title": "one", "metrics": {{"x//y": 1}}}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"sha": "b", "title": "two", "metrics": {{"x//y": 2}}}}"#).unwrap();
        file.flush().unwrap();

        let commits = Commit::load_all(file.path()).unwrap();
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].sha(), "a");
        assert_eq!(commits[1].value("x//y"), Some(2.0));
    }

    #[test]
    fn test_load_all_reports_line_number() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"sha": "a", "metrics": {{}}}}"#).unwrap();
        writeln!(file, "not json").unwrap();
        file.flush().unwrap();

        let err = Commit::load_all(file.path()).unwrap_err();
        assert!(matches!(err, CommitError::Json { line: 2, .. }));
    }

    #[test]
    fn test_save_then_load_preserves_order() {
        let commits = vec![
            Commit::new("a", "first", [("t//instructions", 10.0)]).unwrap(),
            Commit::new(
                "b",
                "second",
                [("t//instructions", 12.0), ("t//lines", 3.0)],
            )
            .unwrap(),
        ];
        let file = NamedTempFile::new().unwrap();
        Commit::save_all(&commits, file.path()).unwrap();

        let loaded = Commit::load_all(file.path()).unwrap();
        assert_eq!(loaded, commits);
    }

    #[test]
    fn test_metric_union_and_series() {
        let commits = vec![
            Commit::new("a", "", [("t//instructions", 1.0)]).unwrap(),
            Commit::new("b", "", [("t//lines", 5.0)]).unwrap(),
            Commit::new("c", "", [("t//instructions", 3.0)]).unwrap(),
        ];

        let union = metric_union(&commits);
        assert_eq!(union.len(), 2);
        assert!(union.contains("t//lines"));

        let series = metric_series(&commits, "t//instructions");
        assert_eq!(series, vec![Some(1.0), None, Some(3.0)]);
    }
}
