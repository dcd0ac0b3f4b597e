//! Metric names of the form `topic//category`
//!
//! The topic groups related measurements (e.g. one build target), the
//! category says what was measured (`instructions`, `lines`, ...). Rules
//! that cross-reference metrics swap the category while keeping the topic.

use std::fmt;
use thiserror::Error;

/// Separator between topic and category
pub const SEPARATOR: &str = "//";

/// A metric name without exactly one `//` separator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed metric name '{0}': expected exactly one '//' separator")]
pub struct MalformedMetricName(pub String);

/// A validated metric name split into topic and category
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MetricName {
    topic: String,
    category: String,
}

impl MetricName {
    /// Parse `topic//category`
    ///
    /// # Example
    /// ```
    /// use radar_sig::metric::MetricName;
    ///
    /// let name = MetricName::parse("build/module/Foo//instructions").unwrap();
    /// assert_eq!(name.topic(), "build/module/Foo");
    /// assert_eq!(name.category(), "instructions");
    /// assert_eq!(name.with_category("lines"), "build/module/Foo//lines");
    /// ```
    pub fn parse(name: &str) -> Result<Self, MalformedMetricName> {
        if name.matches(SEPARATOR).count() != 1 {
            return Err(MalformedMetricName(name.to_string()));
        }
        let (topic, category) = name
            .split_once(SEPARATOR)
            .ok_or_else(|| MalformedMetricName(name.to_string()))?;

        Ok(Self {
            topic: topic.to_string(),
            category: category.to_string(),
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Sibling metric sharing this topic
    pub fn with_category(&self, category: &str) -> String {
        format!("{}{}{}", self.topic, SEPARATOR, category)
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.topic, SEPARATOR, self.category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_topic_and_category() {
        let name = MetricName::parse("build/module/Lean.Elab//instructions").unwrap();
        assert_eq!(name.topic(), "build/module/Lean.Elab");
        assert_eq!(name.category(), "instructions");
        assert_eq!(name.to_string(), "build/module/Lean.Elab//instructions");
    }

    #[test]
    fn test_parse_category_with_spaces_and_dots() {
        let name = MetricName::parse("build/module/Init//bytes .olean.server").unwrap();
        assert_eq!(name.category(), "bytes .olean.server");
    }

    #[test]
    fn test_parse_rejects_missing_separator() {
        let err = MetricName::parse("build/module/Init").unwrap_err();
        assert!(err.to_string().contains("build/module/Init"));
    }

    #[test]
    fn test_parse_rejects_two_separators() {
        assert!(MetricName::parse("a//b//c").is_err());
    }

    #[test]
    fn test_with_category_keeps_topic() {
        let name = MetricName::parse("buildA//instructions").unwrap();
        assert_eq!(name.with_category("lines"), "buildA//lines");
    }
}
