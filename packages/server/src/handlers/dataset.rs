use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, body::Body};
use chrono::Utc;
use sea_orm::Set;
use tracing::{info, instrument};

use crate::entity::dataset;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::ingest;
use crate::models::dataset::{DatasetResponse, UploadResponse};
use crate::report;
use crate::state::AppState;
use crate::store;
use crate::utils::filename::validate_upload_filename;

pub fn upload_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(16 * 1024 * 1024) // 16 MB
}

#[utoipa::path(
    post,
    path = "/upload",
    tag = "Datasets",
    operation_id = "uploadDataset",
    summary = "Upload an equipment CSV",
    description = "Uploads a CSV file in the `file` multipart field, validates its columns, \
        computes summary statistics, and stores it as the most recent dataset. Only the 5 \
        most recent datasets are retained; older ones are pruned together with their files.",
    request_body(content_type = "multipart/form-data", description = "CSV file upload"),
    responses(
        (status = 201, description = "Dataset created", body = UploadResponse),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 500, description = "Unexpected failure", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn upload_dataset(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("file") => {
                file_name = field.file_name().map(|s| s.to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?;
                file_bytes = Some(data.to_vec());
            }
            _ => {} // Ignore unknown fields.
        }
    }

    let bytes = file_bytes.ok_or_else(|| AppError::Validation("No file provided".into()))?;
    let name = file_name.ok_or_else(|| AppError::Validation("No file provided".into()))?;
    let name = validate_upload_filename(&name)
        .map_err(|e| AppError::Validation(e.message().into()))?
        .to_string();

    // Validation and aggregation are pure over the bytes; nothing is stored
    // for a rejected upload.
    let outcome = ingest::parse_and_summarize(&bytes)?;

    let hash = state.blob_store.put(&bytes).await?;

    let new_dataset = dataset::ActiveModel {
        name: Set(name),
        content_hash: Set(hash.to_hex()),
        file_size: Set(bytes.len() as i64),
        total_count: Set(outcome.summary.total_count),
        avg_flowrate: Set(outcome.summary.avg_flowrate),
        avg_pressure: Set(outcome.summary.avg_pressure),
        avg_temperature: Set(outcome.summary.avg_temperature),
        uploaded_at: Set(Utc::now()),
        ..Default::default()
    };

    let model = store::create_dataset(&state.db, new_dataset).await?;
    store::prune_datasets(&state.db, &*state.blob_store).await?;

    info!(dataset_id = model.id, name = %model.name, "Dataset uploaded");

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            id: model.id,
            name: model.name,
            uploaded_at: model.uploaded_at,
            summary: outcome.summary.into(),
            data: outcome.rows,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Datasets",
    operation_id = "listDatasets",
    summary = "List retained datasets",
    description = "Returns the retained dataset records as a JSON array, newest first.",
    responses(
        (status = 200, description = "Dataset records", body = [DatasetResponse]),
    ),
)]
#[instrument(skip(state))]
pub async fn list_datasets(
    State(state): State<AppState>,
) -> Result<Json<Vec<DatasetResponse>>, AppError> {
    let datasets = store::list_datasets(&state.db, None).await?;
    Ok(Json(
        datasets.into_iter().map(DatasetResponse::from).collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Datasets",
    operation_id = "getDataset",
    summary = "Fetch one dataset record",
    params(("id" = i32, Path, description = "Dataset ID")),
    responses(
        (status = 200, description = "Dataset record", body = DatasetResponse),
        (status = 404, description = "Dataset not found", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_dataset(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DatasetResponse>, AppError> {
    let dataset = store::get_dataset(&state.db, id).await?;
    Ok(Json(DatasetResponse::from(dataset)))
}

#[utoipa::path(
    get,
    path = "/{id}/report",
    tag = "Datasets",
    operation_id = "generateReport",
    summary = "Generate a PDF report for a dataset",
    description = "Renders the one-page summary report for a dataset. Requires authentication.",
    params(("id" = i32, Path, description = "Dataset ID")),
    responses(
        (status = 200, description = "PDF report", content_type = "application/pdf"),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 404, description = "Dataset not found", body = ErrorBody),
        (status = 500, description = "Render failure", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user = %auth_user.username))]
pub async fn generate_report(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let dataset = store::get_dataset(&state.db, id).await?;

    let pdf = report::render_dataset_report(&dataset, Utc::now())
        .map_err(|e| AppError::Internal(format!("Report render failed: {e}")))?;

    info!(dataset_id = dataset.id, "PDF report generated");

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(header::CONTENT_LENGTH, pdf.len().to_string())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"equipment_report_{}.pdf\"", dataset.id),
        )
        .body(Body::from(pdf))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))?;

    Ok(response)
}
