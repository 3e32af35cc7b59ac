//! Upload endpoint - benchmark an uploaded model file

use std::path::Path;

use axum::extract::{multipart::Field, multipart::MultipartRejection, Multipart, State};
use axum::Json;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::benchmark::{self, BenchmarkResult, ModelFile};
use crate::state::{AppState, SharedState};
use crate::utils::{bytes_to_mb, format_megabytes, BenchError, Result};

/// Multipart field carrying the model file
pub const FILE_FIELD: &str = "file";

/// An upload persisted to a temporary file.
///
/// The file is removed when this value drops.
#[derive(Debug)]
pub struct StoredUpload {
    pub filename: String,
    pub size_bytes: u64,
    temp: NamedTempFile,
}

impl StoredUpload {
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Remove the temporary file now, logging a failed removal
    pub fn discard(self) {
        if let Err(e) = self.temp.close() {
            warn!("Failed to remove temporary upload: {}", e);
        }
    }
}

/// POST /upload - Benchmark an uploaded model file
pub async fn upload_model(
    State(state): State<SharedState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<BenchmarkResult>> {
    let request_id = Uuid::new_v4();

    async move {
        let mut multipart = multipart.map_err(|e| BenchError::processing(e.body_text()))?;
        let upload = store_file_field(&state, &mut multipart, request_id).await?;
        let result = benchmark_upload(&state, &upload)?;
        upload.discard();

        info!("{}", result.summary());
        Ok::<_, BenchError>(Json(result))
    }
    .instrument(info_span!("upload", %request_id))
    .await
}

/// Find the `file` field and stream it to disk, skipping any other fields
pub async fn store_file_field(
    state: &AppState,
    multipart: &mut Multipart,
    request_id: Uuid,
) -> Result<StoredUpload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| BenchError::processing(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            debug!("Ignoring form field {:?}", field.name());
            continue;
        }

        let filename = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Err(BenchError::processing("Uploaded file has no filename")),
        };

        let temp = create_temp_file(state, request_id)?;
        write_field(field, &temp).await?;
        let size_bytes = tokio::fs::metadata(temp.path()).await?.len();

        return Ok(StoredUpload {
            filename,
            size_bytes,
            temp,
        });
    }

    Err(BenchError::processing(format!(
        "Missing required form field: {}",
        FILE_FIELD
    )))
}

/// Copy the field body chunk by chunk, never buffering the whole upload
async fn write_field(mut field: Field<'_>, temp: &NamedTempFile) -> Result<()> {
    let mut out = tokio::fs::File::from_std(temp.reopen()?);

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| BenchError::processing(e.body_text()))?
    {
        out.write_all(&chunk).await?;
    }

    out.flush().await?;
    Ok(())
}

/// Build the report for a stored upload
pub fn benchmark_upload(state: &AppState, upload: &StoredUpload) -> Result<BenchmarkResult> {
    let model = ModelFile::from_filename(&upload.filename);
    info!(
        format = %model.format,
        family = %model.family,
        size = %format_megabytes(bytes_to_mb(upload.size_bytes)),
        "Benchmarking {}",
        upload.filename
    );

    benchmark::synthesize(
        &state.specs,
        &upload.filename,
        upload.size_bytes,
        state.jitter.as_ref(),
    )
}

/// Temp file named per request, never from the client filename
fn create_temp_file(state: &AppState, request_id: Uuid) -> Result<NamedTempFile> {
    let prefix = format!("upload-{}-", request_id);
    let temp = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".bin")
        .tempfile_in(&state.config.upload_dir)?;

    debug!("Persisting upload to {:?}", temp.path());
    Ok(temp)
}
