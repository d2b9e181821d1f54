//! Multipart upload handler.

use axum::extract::{Extension, Multipart};
use axum::http::StatusCode;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::atomic::AtomicFile;
use crate::config::Limits;
use crate::error::ApiError;
use crate::storage::UploadStore;

/// `POST /upload`: stores the multipart `file` field under its
/// original filename, replacing any existing file of that name.
///
/// The filename gets the same basename sanitization as the delete
/// path. Earlier versions of this service wrote the client-supplied
/// name verbatim; traversal segments in an upload name now resolve
/// inside the uploads directory instead.
pub async fn upload_file(
    Extension(store): Extension<Arc<UploadStore>>,
    Extension(limits): Extension<Arc<Limits>>,
    mut multipart: Multipart,
) -> Result<StatusCode, ApiError> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::BadRequest(err.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_owned)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ApiError::BadRequest("file field has no filename".into()))?;
        let target = store.resolve(&filename)?;

        let mut atomic = AtomicFile::create(&target).await?;
        let mut written: u64 = 0;
        let write_result: Result<(), ApiError> = async {
            while let Some(chunk) = field
                .chunk()
                .await
                .map_err(|err| ApiError::Internal(err.to_string()))?
            {
                written += chunk.len() as u64;
                if limits.max_file_size > 0 && written > limits.max_file_size {
                    return Err(ApiError::PayloadTooLarge(limits.max_file_size));
                }
                atomic
                    .file_mut()
                    .write_all(&chunk)
                    .await
                    .map_err(|err| ApiError::Internal(err.to_string()))?;
            }
            Ok(())
        }
        .await;
        if let Err(err) = write_result {
            warn!(filename, bytes = written, "upload aborted");
            atomic.cleanup().await;
            return Err(err);
        }
        atomic.finalize().await?;

        info!(filename, bytes = written, "file uploaded");
        return Ok(StatusCode::OK);
    }

    Err(ApiError::BadRequest("file field is required".into()))
}
