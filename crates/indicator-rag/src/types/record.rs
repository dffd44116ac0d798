//! Indicator records and the indexable units derived from them

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata attached to an indexable unit and returned with each match
pub type Metadata = HashMap<String, String>;

/// Metadata keys written by the normalizer
pub mod keys {
    /// Indicator name
    pub const INDICATOR: &str = "indicator";
    /// Unit of measure
    pub const UNITS: &str = "units";
    /// Reporting period (a year or a year range such as `2007/08`)
    pub const YEAR: &str = "year";
    /// Reported value
    pub const VALUE: &str = "value";
    /// Ingest batch the unit came from
    pub const SOURCE: &str = "source";
}

/// Sentinel used by the source data for "not reported"
pub const NOT_REPORTED: &str = "-";

/// A flat structured fact, one row of the indicator table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorRecord {
    /// Indicator name, e.g. `Revenues`
    #[serde(rename = "Indicators", default)]
    pub name: String,
    /// Unit of measure, e.g. `Annual % Change`
    #[serde(rename = "Units", default)]
    pub unit: String,
    /// Year or year range
    #[serde(rename = "Year", default)]
    pub period: String,
    /// Numeric value or `-`
    #[serde(rename = "Value", default)]
    pub value: String,
}

impl IndicatorRecord {
    /// Create a new record
    pub fn new(
        name: impl Into<String>,
        unit: impl Into<String>,
        period: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            period: period.into(),
            value: value.into(),
        }
    }

    /// Render the record as a single sentence
    pub fn to_document_text(&self) -> String {
        format!(
            "In {}, {} was {} {}",
            self.period, self.name, self.value, self.unit
        )
    }
}

/// Canonical unit pushed into the vector store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexableUnit {
    content: String,
    metadata: Metadata,
}

impl IndexableUnit {
    pub(crate) fn new(content: String, metadata: Metadata) -> Self {
        Self { content, metadata }
    }

    /// Human-readable sentence that gets embedded
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Metadata used for filtering and context rendering
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Split into owned parts
    pub fn into_parts(self) -> (String, Metadata) {
        (self.content, self.metadata)
    }
}
