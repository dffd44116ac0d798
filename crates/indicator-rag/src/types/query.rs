//! Search query types and validation of caller-supplied parameters

use serde::{Deserialize, Serialize};

use crate::config::RetrievalConfig;
use crate::error::{Error, Result};

/// Comparison operator of a metadata predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    /// Exact string equality
    Eq,
}

/// Structured metadata predicate handed to the store as data, never as a
/// query-language string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataFilter {
    /// Metadata key
    pub field: String,
    /// Operator
    pub op: FilterOp,
    /// Value compared against
    pub value: String,
}

impl MetadataFilter {
    /// Equality predicate `field == value`
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Eq,
            value: value.into(),
        }
    }

    /// Evaluate the predicate against a metadata map
    pub fn matches(&self, metadata: &crate::types::Metadata) -> bool {
        match self.op {
            FilterOp::Eq => metadata.get(&self.field) == Some(&self.value),
        }
    }
}

/// A similarity search request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Query text, must not be blank
    pub text: String,
    /// Maximum number of matches
    pub top_k: usize,
    /// Minimum similarity score, in `[0, 1]`
    pub similarity_threshold: f32,
    /// Optional equality constraint on one metadata field
    pub filter: Option<MetadataFilter>,
}

impl SearchQuery {
    /// Create a query with the open-search defaults
    pub fn new(text: impl Into<String>) -> Self {
        let defaults = RetrievalConfig::default();
        Self {
            text: text.into(),
            top_k: defaults.default_top_k,
            similarity_threshold: defaults.search_threshold,
            filter: None,
        }
    }

    /// Set the number of results to retrieve
    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = k;
        self
    }

    /// Set the similarity threshold
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Restrict matches with a metadata predicate
    pub fn with_filter(mut self, filter: MetadataFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Reject queries that must never reach the store
    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(Error::validation("Query cannot be empty"));
        }
        if self.top_k == 0 {
            return Err(Error::validation("topK must be a positive integer"));
        }
        validate_threshold(self.similarity_threshold)?;
        if let Some(filter) = &self.filter {
            if filter.field.is_empty() {
                return Err(Error::validation("Filter field cannot be empty"));
            }
        }
        Ok(())
    }
}

/// Parsed `topK` / `similarityThreshold` from untrusted input
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SearchParams {
    /// Requested top_k, if any
    pub top_k: Option<usize>,
    /// Requested threshold, if any
    pub threshold: Option<f32>,
}

impl SearchParams {
    /// Parse raw parameters. Anything malformed is a validation error; values
    /// are never clamped.
    pub fn parse(top_k: Option<&str>, threshold: Option<&str>, max_top_k: usize) -> Result<Self> {
        let top_k = top_k.map(|raw| parse_top_k(raw, max_top_k)).transpose()?;
        let threshold = threshold.map(parse_threshold).transpose()?;
        Ok(Self { top_k, threshold })
    }
}

fn parse_top_k(raw: &str, max_top_k: usize) -> Result<usize> {
    let k: usize = raw
        .trim()
        .parse()
        .map_err(|_| Error::validation(format!("topK must be a positive integer, got '{}'", raw)))?;
    if k == 0 {
        return Err(Error::validation("topK must be a positive integer, got '0'"));
    }
    if k > max_top_k {
        return Err(Error::validation(format!(
            "topK must not exceed {}, got {}",
            max_top_k, k
        )));
    }
    Ok(k)
}

fn parse_threshold(raw: &str) -> Result<f32> {
    let threshold: f32 = raw.trim().parse().map_err(|_| {
        Error::validation(format!(
            "similarityThreshold must be a number between 0 and 1, got '{}'",
            raw
        ))
    })?;
    validate_threshold(threshold)?;
    Ok(threshold)
}

fn validate_threshold(threshold: f32) -> Result<()> {
    if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
        return Err(Error::validation(format!(
            "similarityThreshold must be a number between 0 and 1, got {}",
            threshold
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Metadata;

    #[test]
    fn test_parse_accepts_valid_values() {
        let params = SearchParams::parse(Some(" 3 "), Some("0.75"), 100).unwrap();
        assert_eq!(params.top_k, Some(3));
        assert_eq!(params.threshold, Some(0.75));

        let params = SearchParams::parse(None, None, 100).unwrap();
        assert_eq!(params, SearchParams::default());
    }

    #[test]
    fn test_parse_rejects_bad_top_k() {
        for raw in ["abc", "0", "-1", "2.5", ""] {
            let err = SearchParams::parse(Some(raw), None, 100).unwrap_err();
            assert!(err.is_validation(), "{raw} should be rejected");
        }
        assert!(SearchParams::parse(Some("101"), None, 100).is_err());
    }

    #[test]
    fn test_parse_rejects_bad_threshold() {
        for raw in ["abc", "1.5", "-0.1", "NaN", "inf"] {
            let err = SearchParams::parse(None, Some(raw), 100).unwrap_err();
            assert!(err.is_validation(), "{raw} should be rejected");
        }
    }

    #[test]
    fn test_blank_query_invalid() {
        assert!(SearchQuery::new("   ").validate().is_err());
        assert!(SearchQuery::new("revenue").validate().is_ok());
        assert!(SearchQuery::new("revenue").with_top_k(0).validate().is_err());
    }

    #[test]
    fn test_filter_matches_exact_value_only() {
        let filter = MetadataFilter::eq("year", "2007/08");
        let mut metadata = Metadata::new();
        metadata.insert("year".to_string(), "2007/08".to_string());
        assert!(filter.matches(&metadata));

        metadata.insert("year".to_string(), "2007/08' || year == '2009".to_string());
        assert!(!filter.matches(&metadata));
        assert!(!filter.matches(&Metadata::new()));
    }
}
