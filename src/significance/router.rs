// Router: per-repository decision tables mapping metric names to pipelines
//
// Each repository has an ordered list of rules. The first rule whose pattern
// matches a metric name supplies its direction and steps; a metric matching
// nothing gets an empty pipeline and is never flagged.

use crate::significance::context::Direction;
use crate::significance::steps::Step;
use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// One entry of a repository's decision table
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: Regex,
    direction: Direction,
    steps: Vec<Step>,
}

impl Rule {
    /// Compile a rule, validating the pattern and every step
    pub fn new(pattern: &str, direction: Direction, steps: Vec<Step>) -> Result<Self> {
        let regex = Regex::new(pattern)
            .with_context(|| format!("Invalid metric pattern '{}'", pattern))?;
        for step in &steps {
            step.validate()
                .map_err(|e| anyhow::anyhow!("Rule '{}': {}", pattern, e))?;
        }

        Ok(Self {
            pattern: regex,
            direction,
            steps,
        })
    }

    /// Unanchored search of the pattern in the metric name
    pub fn matches(&self, metric: &str) -> bool {
        self.pattern.is_match(metric)
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

#[derive(Deserialize)]
struct RuleFile {
    #[serde(default)]
    repo: Vec<RepoEntry>,
}

#[derive(Deserialize)]
struct RepoEntry {
    name: String,
    #[serde(default)]
    rule: Vec<RuleEntry>,
}

#[derive(Deserialize)]
struct RuleEntry {
    #[serde(rename = "match")]
    pattern: String,
    #[serde(default)]
    direction: Direction,
    #[serde(default)]
    steps: Vec<Step>,
}

/// Per-repository decision tables mapping metric names to step pipelines
///
/// Rules are tried in file order and the first match wins; nothing is
/// merged across rules. Adding a repository means adding a `[[repo]]` table.
///
/// # Example Usage
/// ```
/// use radar_sig::significance::RuleBook;
///
/// let rules = RuleBook::builtin()?;
/// let steps = rules.steps_for_metric("lean4", "build/module/Init//instructions");
/// assert_eq!(steps.len(), 3);
/// assert!(rules.steps_for_metric("lean4", "build/module/Init//lines").is_empty());
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuleBook {
    repos: Vec<(String, Vec<Rule>)>,
}

impl RuleBook {
    /// Empty rule book: every metric gets an empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Load rule tables from a TOML file
    ///
    /// # Errors
    /// Returns error if the file can't be read, has invalid TOML syntax,
    /// contains an invalid regex or thresholds, or defines a repository twice.
    ///
    /// # Example TOML
    /// ```toml
    /// [[repo]]
    /// name = "lean4"
    ///
    /// [[repo.rule]]
    /// match = '//instructions$'
    /// direction = "lower-is-better"
    /// steps = [
    ///     { kind = "check-quantile-factor", small = 5.0, medium = 15.0, large = 45.0 },
    /// ]
    /// ```
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read rules file: {}", path.as_ref().display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid rules file: {}", path.as_ref().display()))
    }

    /// Parse rule tables from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: RuleFile =
            toml::from_str(content).context("Failed to parse TOML rule definitions")?;

        let mut book = Self::new();
        for repo in file.repo {
            let rules = repo
                .rule
                .into_iter()
                .map(|r| Rule::new(&r.pattern, r.direction, r.steps))
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("Invalid rules for repo '{}'", repo.name))?;
            book.insert_repo(&repo.name, rules)?;
        }

        tracing::debug!("Loaded rules for {} repos", book.repos.len());
        Ok(book)
    }

    /// Default tables for lean4 and mathlib4
    ///
    /// Uses embedded rules-default.toml compiled into the binary.
    pub fn builtin() -> Result<Self> {
        const DEFAULT_TOML: &str = include_str!("../../rules-default.toml");
        Self::from_toml_str(DEFAULT_TOML).context("Failed to parse embedded rules-default.toml")
    }

    /// Add a repository's ordered rule list
    pub fn insert_repo(&mut self, name: &str, rules: Vec<Rule>) -> Result<()> {
        if self.has_repo(name) {
            anyhow::bail!("Duplicate rules for repo '{}'", name);
        }
        self.repos.push((name.to_string(), rules));
        Ok(())
    }

    pub fn has_repo(&self, repo: &str) -> bool {
        self.repos.iter().any(|(name, _)| name == repo)
    }

    /// Repository names in definition order
    pub fn repos(&self) -> impl Iterator<Item = &str> {
        self.repos.iter().map(|(name, _)| name.as_str())
    }

    /// First rule of `repo` matching `metric`
    pub fn rule_for_metric(&self, repo: &str, metric: &str) -> Option<&Rule> {
        let (_, rules) = self.repos.iter().find(|(name, _)| name == repo)?;
        rules.iter().find(|rule| rule.matches(metric))
    }

    /// Pipeline for `metric`; empty when no rule matches
    pub fn steps_for_metric(&self, repo: &str, metric: &str) -> &[Step] {
        self.rule_for_metric(repo, metric)
            .map(Rule::steps)
            .unwrap_or(&[])
    }
}
