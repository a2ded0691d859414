use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entity::dataset;
use crate::ingest::{EquipmentRow, IngestSummary};

/// Aggregates returned with a successful upload.
///
/// Means are rounded to two decimals here; the stored record keeps full
/// precision (and list/get responses return it).
#[derive(Serialize, utoipa::ToSchema)]
pub struct SummaryResponse {
    /// Number of equipment rows in the upload.
    #[schema(example = 24)]
    pub total_count: i64,
    /// Mean flowrate, or null when the column held no numeric values.
    #[schema(example = 118.42)]
    pub avg_flowrate: Option<f64>,
    #[schema(example = 8.21)]
    pub avg_pressure: Option<f64>,
    #[schema(example = 74.93)]
    pub avg_temperature: Option<f64>,
    /// Occurrences per equipment type, derived at ingest time only.
    #[schema(example = json!({"Pump": 12, "Reactor": 4}))]
    pub equipment_types: BTreeMap<String, i64>,
}

impl From<IngestSummary> for SummaryResponse {
    fn from(summary: IngestSummary) -> Self {
        Self {
            total_count: summary.total_count,
            avg_flowrate: summary.avg_flowrate.map(round2),
            avg_pressure: summary.avg_pressure.map(round2),
            avg_temperature: summary.avg_temperature.map(round2),
            equipment_types: summary.equipment_types,
        }
    }
}

/// Response DTO for a successful upload.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UploadResponse {
    /// Dataset ID.
    #[schema(example = 17)]
    pub id: i32,
    /// Original upload filename.
    #[schema(example = "equipment.csv")]
    pub name: String,
    pub uploaded_at: DateTime<Utc>,
    pub summary: SummaryResponse,
    /// The materialized rows, keyed by the original column names.
    pub data: Vec<EquipmentRow>,
}

/// Response DTO for a stored dataset record.
#[derive(Serialize, utoipa::ToSchema)]
pub struct DatasetResponse {
    /// Dataset ID.
    #[schema(example = 17)]
    pub id: i32,
    /// Original upload filename.
    #[schema(example = "equipment.csv")]
    pub name: String,
    pub uploaded_at: DateTime<Utc>,
    /// SHA-256 content hash of the stored CSV blob.
    #[schema(example = "a1b2c3d4e5f6...")]
    pub content_hash: String,
    /// Blob size in bytes.
    #[schema(example = 2048)]
    pub file_size: i64,
    pub total_count: i64,
    pub avg_flowrate: Option<f64>,
    pub avg_pressure: Option<f64>,
    pub avg_temperature: Option<f64>,
}

impl From<dataset::Model> for DatasetResponse {
    fn from(model: dataset::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            uploaded_at: model.uploaded_at,
            content_hash: model.content_hash,
            file_size: model.file_size,
            total_count: model.total_count,
            avg_flowrate: model.avg_flowrate,
            avg_pressure: model.avg_pressure,
            avg_temperature: model.avg_temperature,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_means_round_to_two_decimals() {
        let summary = IngestSummary {
            total_count: 3,
            avg_flowrate: Some(88.004999),
            avg_pressure: Some(7.733333333),
            avg_temperature: None,
            equipment_types: BTreeMap::new(),
        };

        let response = SummaryResponse::from(summary);
        assert_eq!(response.avg_flowrate, Some(88.0));
        assert_eq!(response.avg_pressure, Some(7.73));
        assert_eq!(response.avg_temperature, None);
    }
}
