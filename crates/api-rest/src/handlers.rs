//! Route handlers.
//!
//! Handlers only translate between HTTP and the core services. Ingestion and listing do
//! blocking filesystem work, so they run on the blocking thread pool.

use crate::{error::ApiError, AppState};
use api_shared::{DatasetRecord, ErrorRes, HealthRes, HealthService, MessageRes, UploadForm};
use axum::{
    extract::{multipart::Field, Multipart, State},
    response::Json,
};
use tokio::io::AsyncWriteExt;
use vault_core::{CatalogEntry, MetadataFields, UploadedFile};

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Liveness text", body = String, content_type = "text/plain")
    )
)]
/// Plain-text liveness endpoint. Never touches storage.
pub async fn home() -> &'static str {
    HealthService::liveness()
}

#[utoipa::path(
    get,
    path = "/call",
    responses(
        (status = 200, description = "Call acknowledged", body = MessageRes)
    )
)]
/// Connectivity probe used by the front end.
pub async fn call() -> Json<MessageRes> {
    tracing::info!("call received");
    Json(MessageRes::new("Call received successfully"))
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// # Returns
/// * `Json<HealthRes>` - Health status response containing service status
pub async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

/// Sets a form value unless an earlier part with the same name already did.
fn keep_first(slot: &mut Option<String>, value: String) {
    if slot.is_none() {
        *slot = Some(value);
    }
}

/// Copies a file part into an anonymous temporary file.
///
/// Writing stops once more than `limit` bytes have been stored; the rest of the part is
/// drained and discarded. The spooled size then exceeds the limit, which the pipeline
/// reports as `FileTooLarge`.
async fn spool(field: &mut Field<'_>, limit: u64) -> Result<std::fs::File, ApiError> {
    let mut file = tokio::fs::File::from_std(tempfile::tempfile()?);
    let mut stored: u64 = 0;

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| ApiError::bad_request(format!("Multipart error: {e}")))?
    {
        if stored > limit {
            continue;
        }
        file.write_all(&chunk).await?;
        stored += chunk.len() as u64;
    }

    file.flush().await?;
    Ok(file.into_std().await)
}

#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Artifact and metadata stored", body = MessageRes),
        (status = 400, description = "Missing, empty, oversized, unsupported or invalid file", body = ErrorRes),
        (status = 409, description = "Filename already exists in an earlier version", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Upload an artifact with optional descriptive metadata
///
/// The form field `name` selects the project (default `default`). The artifact is stored in
/// the project's next version directory alongside a `_meta.json` sidecar; zip archives are
/// also expanded next to it.
///
/// # Errors
/// Returns `400` for validation failures and invalid archives, `409` for duplicates and
/// `500` for unexpected storage failures.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<MessageRes>, ApiError> {
    tracing::info!("upload route hit");
    let limit = state.config().max_upload_bytes();
    let mut fields = MetadataFields::default();
    let mut file: Option<UploadedFile<std::fs::File>> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Multipart error: {e}")))?
    {
        let Some(part) = field.name().map(str::to_owned) else {
            continue;
        };

        if part == "file" {
            // Parts without a filename are plain form values, not files.
            let Some(filename) = field.file_name().map(str::to_owned) else {
                continue;
            };
            if file.is_none() {
                let content = spool(&mut field, limit).await?;
                file = Some(UploadedFile::new(filename, content));
            }
            continue;
        }

        let slot = match part.as_str() {
            "name" => &mut fields.name,
            "description" => &mut fields.description,
            "source" => &mut fields.source,
            "date" => &mut fields.date,
            "status" => &mut fields.status,
            _ => continue,
        };
        let value = field
            .text()
            .await
            .map_err(|e| ApiError::bad_request(format!("Multipart error: {e}")))?;
        keep_first(slot, value);
    }

    let ingest = state.ingest.clone();
    let receipt = tokio::task::spawn_blocking(move || ingest.ingest(file, fields))
        .await
        .map_err(|e| {
            tracing::error!("upload task failed: {:?}", e);
            ApiError::internal(e.to_string())
        })?
        .map_err(|e| {
            tracing::warn!("upload rejected: {}", e);
            ApiError::from(e)
        })?;

    Ok(Json(MessageRes::new(receipt.message)))
}

fn to_dataset(entry: CatalogEntry) -> DatasetRecord {
    DatasetRecord {
        name: entry.record.name,
        description: entry.record.description,
        source: entry.record.source,
        date: entry.record.date,
        status: entry.record.status,
        filename: entry.record.filename,
        project: entry.project,
        version: entry.version,
    }
}

#[utoipa::path(
    get,
    path = "/datasets",
    responses(
        (status = 200, description = "Every stored metadata record", body = [DatasetRecord]),
        (status = 500, description = "A sidecar could not be read or parsed", body = ErrorRes)
    )
)]
/// List the metadata of every stored version across all projects
///
/// # Errors
/// Returns `500 Internal Server Error` if any sidecar cannot be read or parsed.
pub async fn list_datasets(
    State(state): State<AppState>,
) -> Result<Json<Vec<DatasetRecord>>, ApiError> {
    let catalog = state.catalog.clone();
    let entries = tokio::task::spawn_blocking(move || catalog.list_all())
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?
        .map_err(|e| {
            tracing::error!("error while listing datasets: {}", e);
            ApiError::from(e)
        })?;

    Ok(Json(entries.into_iter().map(to_dataset).collect()))
}
