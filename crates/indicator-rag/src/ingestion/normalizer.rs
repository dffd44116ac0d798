//! Turns raw indicator rows into indexable units

use std::fmt;

use crate::types::record::{keys, NOT_REPORTED};
use crate::types::{IndexableUnit, IndicatorRecord, Metadata};

/// Why a row was dropped before indexing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejected {
    /// Indicator name is blank
    MissingName,
    /// Value cell is blank
    MissingValue,
    /// Value is the `-` sentinel
    NotReported,
}

impl fmt::Display for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Rejected::MissingName => "missing indicator name",
            Rejected::MissingValue => "missing value",
            Rejected::NotReported => "value not reported",
        };
        f.write_str(reason)
    }
}

/// Check the validity invariant without building anything
pub fn validate(record: &IndicatorRecord) -> Result<(), Rejected> {
    if record.name.trim().is_empty() {
        return Err(Rejected::MissingName);
    }
    let value = record.value.trim();
    if value.is_empty() {
        return Err(Rejected::MissingValue);
    }
    if value == NOT_REPORTED {
        return Err(Rejected::NotReported);
    }
    Ok(())
}

/// Convert a record into a unit tagged with `source`
pub fn normalize(record: &IndicatorRecord, source: &str) -> Result<IndexableUnit, Rejected> {
    validate(record)?;

    let mut metadata = Metadata::with_capacity(5);
    metadata.insert(keys::INDICATOR.to_string(), record.name.clone());
    metadata.insert(keys::UNITS.to_string(), record.unit.clone());
    metadata.insert(keys::YEAR.to_string(), record.period.clone());
    metadata.insert(keys::VALUE.to_string(), record.value.clone());
    metadata.insert(keys::SOURCE.to_string(), source.to_string());

    Ok(IndexableUnit::new(record.to_document_text(), metadata))
}

/// Units that survived normalization plus rejection counts
#[derive(Debug, Default)]
pub struct NormalizedBatch {
    /// Valid units, in input order
    pub units: Vec<IndexableUnit>,
    /// Number of rows dropped
    pub rejected: usize,
}

/// Normalize a batch, logging each rejected row
pub fn normalize_all(records: &[IndicatorRecord], source: &str) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();
    for (row, record) in records.iter().enumerate() {
        match normalize(record, source) {
            Ok(unit) => batch.units.push(unit),
            Err(reason) => {
                tracing::debug!("Skipping row {} ({}): {:?}", row + 1, reason, record);
                batch.rejected += 1;
            }
        }
    }
    if batch.rejected > 0 {
        tracing::warn!(
            "Dropped {} of {} rows from {} as invalid",
            batch.rejected,
            records.len(),
            source
        );
    }
    batch
}
