use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dataset")]
pub struct Model {
    /// Auto-increment primary key; creation order defines recency.
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Original upload filename.
    pub name: String,

    /// SHA-256 content hash of the stored CSV blob.
    pub content_hash: String,

    /// Blob size in bytes, denormalized so list queries never touch the store.
    pub file_size: i64,

    /// Number of equipment rows in the upload.
    pub total_count: i64,

    /// Column means; NULL when the source column held no numeric values.
    pub avg_flowrate: Option<f64>,
    pub avg_pressure: Option<f64>,
    pub avg_temperature: Option<f64>,

    pub uploaded_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
