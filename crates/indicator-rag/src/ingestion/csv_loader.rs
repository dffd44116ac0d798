//! CSV parsing into indicator records

use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::IndicatorRecord;

/// Read records from a CSV file with `Indicators,Units,Year,Value` headers
pub fn load_csv(path: &Path) -> Result<Vec<IndicatorRecord>> {
    let file = std::fs::File::open(path).map_err(|e| {
        Error::ingest(path.display().to_string(), format!("cannot open file: {}", e))
    })?;
    let records = read_records(file)?;
    tracing::info!(
        "Loaded {} indicator rows from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

/// Header names of the four indicator columns
const COLUMNS: [&str; 4] = ["Indicators", "Units", "Year", "Value"];

/// Read records from any CSV byte source. Columns are matched by header;
/// cells missing from a short row or an absent column read as empty.
pub fn read_records<R: Read>(input: R) -> Result<Vec<IndicatorRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    let positions = COLUMNS.map(|name| headers.iter().position(|h| h == name));
    if positions.iter().all(Option::is_none) {
        tracing::warn!("CSV header has none of the expected columns: {:?}", headers);
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| row.get(i))
                .unwrap_or_default()
                .to_string()
        };
        records.push(IndicatorRecord::new(
            cell(positions[0]),
            cell(positions[1]),
            cell(positions[2]),
            cell(positions[3]),
        ));
    }
    Ok(records)
}
