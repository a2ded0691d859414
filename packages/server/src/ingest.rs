//! CSV validation and aggregation for equipment uploads.
//!
//! Parsing is pure over the input bytes: nothing here touches the database or
//! the blob store, so a rejected upload leaves no trace.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// Columns every upload must carry, by exact header name.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "Equipment Name",
    "Type",
    "Flowrate",
    "Pressure",
    "Temperature",
];

/// Subset of [`REQUIRED_COLUMNS`] that must be uniformly numeric.
pub const NUMERIC_COLUMNS: [&str; 3] = ["Flowrate", "Pressure", "Temperature"];

/// Classified ingest failures; every variant maps to a 400 response.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("CSV file is empty")]
    Empty,
    #[error("Invalid CSV format. Please check your file.")]
    Unparseable(#[source] csv::Error),
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("Column \"{0}\" must contain numeric values")]
    NonNumericColumn(String),
}

/// One materialized equipment row, serialized under the original column names.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct EquipmentRow {
    #[serde(rename = "Equipment Name")]
    pub equipment_name: String,
    #[serde(rename = "Type")]
    pub equipment_type: String,
    #[serde(rename = "Flowrate")]
    pub flowrate: Option<f64>,
    #[serde(rename = "Pressure")]
    pub pressure: Option<f64>,
    #[serde(rename = "Temperature")]
    pub temperature: Option<f64>,
}

/// Aggregates computed at ingest time.
///
/// Means are `None` when the column held no numeric values at all. The
/// `equipment_types` histogram is derived per upload and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestSummary {
    pub total_count: i64,
    pub avg_flowrate: Option<f64>,
    pub avg_pressure: Option<f64>,
    pub avg_temperature: Option<f64>,
    pub equipment_types: BTreeMap<String, i64>,
}

/// A successfully validated upload: materialized rows plus their summary.
#[derive(Debug)]
pub struct IngestOutcome {
    pub rows: Vec<EquipmentRow>,
    pub summary: IngestSummary,
}

/// Parse, validate, and aggregate a CSV byte stream.
pub fn parse_and_summarize(bytes: &[u8]) -> Result<IngestOutcome, IngestError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(IngestError::Empty);
    }

    let mut reader = csv::ReaderBuilder::new().from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(IngestError::Unparseable)?
        .clone();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(IngestError::MissingColumns(missing));
    }

    let column_index = |name: &str| -> usize {
        headers
            .iter()
            .position(|h| h == name)
            .expect("required column present after check")
    };

    let records = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .map_err(IngestError::Unparseable)?;

    // Numeric typing is validated column by column, in declaration order, so
    // the reported column matches no matter which row is malformed.
    let mut numeric: BTreeMap<&str, Vec<Option<f64>>> = BTreeMap::new();
    for col in NUMERIC_COLUMNS {
        let idx = column_index(col);
        let mut values = Vec::with_capacity(records.len());
        for record in &records {
            values.push(parse_numeric_cell(record.get(idx).unwrap_or(""), col)?);
        }
        numeric.insert(col, values);
    }

    let name_idx = column_index("Equipment Name");
    let type_idx = column_index("Type");

    let mut rows = Vec::with_capacity(records.len());
    let mut equipment_types: BTreeMap<String, i64> = BTreeMap::new();
    for (i, record) in records.iter().enumerate() {
        let equipment_type = record.get(type_idx).unwrap_or("").to_string();
        *equipment_types.entry(equipment_type.clone()).or_insert(0) += 1;
        rows.push(EquipmentRow {
            equipment_name: record.get(name_idx).unwrap_or("").to_string(),
            equipment_type,
            flowrate: numeric["Flowrate"][i],
            pressure: numeric["Pressure"][i],
            temperature: numeric["Temperature"][i],
        });
    }

    let summary = IngestSummary {
        total_count: rows.len() as i64,
        avg_flowrate: mean(&numeric["Flowrate"]),
        avg_pressure: mean(&numeric["Pressure"]),
        avg_temperature: mean(&numeric["Temperature"]),
        equipment_types,
    };

    Ok(IngestOutcome { rows, summary })
}

/// Parse one numeric cell. Empty (or NaN-valued) cells count as absent, not
/// as a typing violation; anything else non-numeric fails the whole column.
fn parse_numeric_cell(raw: &str, column: &str) -> Result<Option<f64>, IngestError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_nan() => Ok(None),
        Ok(v) => Ok(Some(v)),
        Err(_) => Err(IngestError::NonNumericColumn(column.to_string())),
    }
}

/// Arithmetic mean over the present values; `None` when there are none.
fn mean(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }
    Some(present.iter().sum::<f64>() / present.len() as f64)
}
