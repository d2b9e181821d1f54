//! Delete, directory index, and raw file serving handlers.

use axum::body::Body as AxumBody;
use axum::extract::{Extension, Form, Path as UrlPath};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use std::io::ErrorKind;
use std::sync::Arc;
use tokio::fs::{self, File};
use tokio_util::io::ReaderStream;
use tracing::info;

use crate::bytesize::format_bytes;
use crate::error::ApiError;
use crate::storage::UploadStore;

#[derive(Deserialize)]
pub(crate) struct DeleteRequest {
    filename: String,
}

/// `POST /delete`: removes a stored file by its sanitized filename.
pub async fn delete_file(
    Extension(store): Extension<Arc<UploadStore>>,
    Form(request): Form<DeleteRequest>,
) -> Result<StatusCode, ApiError> {
    if request.filename.is_empty() {
        return Err(ApiError::BadRequest("filename is required".into()));
    }
    store.remove(&request.filename).await?;
    info!(filename = request.filename, "file deleted");
    Ok(StatusCode::OK)
}

/// `GET /uploads/`: auto-generated HTML index of stored files, one
/// anchor per file so clients can enumerate uploads by scraping links.
pub async fn list_uploads(
    Extension(store): Extension<Arc<UploadStore>>,
) -> Result<Html<String>, ApiError> {
    let entries = store.list().await?;
    let mut page = String::from(
        "<!DOCTYPE html>\n<html>\n<head><title>uploads</title></head>\n<body>\n<pre>\n",
    );
    for entry in &entries {
        page.push_str(&format!(
            "<a href=\"{}\">{}</a>  {}  {}\n",
            urlencoding::encode(&entry.name),
            escape_html(&entry.name),
            format_bytes(entry.size),
            entry.modified.as_deref().unwrap_or("-"),
        ));
    }
    page.push_str("</pre>\n</body>\n</html>\n");
    Ok(Html(page))
}

/// `GET /uploads/{name}`: streams the raw bytes of one stored file.
pub async fn serve_upload(
    UrlPath(name): UrlPath<String>,
    Extension(store): Extension<Arc<UploadStore>>,
) -> Result<Response, ApiError> {
    let target = store.resolve(&name)?;
    let metadata = match fs::metadata(&target).await {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(ApiError::NotFound("file not found".into()));
        }
        Err(err) => return Err(ApiError::Internal(err.to_string())),
    };
    if metadata.is_dir() {
        return Err(ApiError::BadRequest("not a file".into()));
    }

    let mime = mime_guess::from_path(&target).first_or_octet_stream();
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(mime.essence_str())
            .map_err(|_| ApiError::Internal("invalid mime type".into()))?,
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(metadata.len()));

    let file = File::open(&target)
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?;
    let stream = ReaderStream::new(file);
    Ok((StatusCode::OK, headers, AxumBody::from_stream(stream)).into_response())
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use tempfile::tempdir;

    fn make_store() -> (tempfile::TempDir, Arc<UploadStore>) {
        let temp = tempdir().expect("tempdir");
        let root = temp.path().join("uploads");
        std::fs::create_dir_all(&root).expect("create uploads root");
        (temp, Arc::new(UploadStore::new(root)))
    }

    #[tokio::test]
    async fn delete_removes_stored_file() {
        let (_temp, store) = make_store();
        let path = store.root_path().join("doc.txt");
        std::fs::write(&path, b"bytes").expect("write file");

        let status = delete_file(
            Extension(store),
            Form(DeleteRequest {
                filename: "doc.txt".to_string(),
            }),
        )
        .await
        .expect("delete");

        assert_eq!(status, StatusCode::OK);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn delete_missing_file_is_not_found() {
        let (_temp, store) = make_store();
        let result = delete_file(
            Extension(store),
            Form(DeleteRequest {
                filename: "ghost.txt".to_string(),
            }),
        )
        .await;

        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_empty_filename_is_bad_request() {
        let (_temp, store) = make_store();
        let result = delete_file(
            Extension(store),
            Form(DeleteRequest {
                filename: String::new(),
            }),
        )
        .await;

        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn delete_directory_entry_is_bad_request() {
        let (_temp, store) = make_store();
        std::fs::create_dir(store.root_path().join("subdir")).expect("create subdir");

        let result = delete_file(
            Extension(store),
            Form(DeleteRequest {
                filename: "subdir".to_string(),
            }),
        )
        .await;

        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn delete_traversal_name_operates_inside_uploads_only() {
        let (temp, store) = make_store();
        let outside = temp.path().join("passwd");
        std::fs::write(&outside, b"keep me").expect("write outside file");

        let result = delete_file(
            Extension(store),
            Form(DeleteRequest {
                filename: "../../passwd".to_string(),
            }),
        )
        .await;

        assert!(matches!(result, Err(ApiError::NotFound(_))));
        assert!(outside.exists());
    }

    #[tokio::test]
    async fn listing_links_each_stored_file() {
        let (_temp, store) = make_store();
        std::fs::write(store.root_path().join("a.txt"), b"a").expect("write");
        std::fs::write(store.root_path().join("b c.txt"), vec![0u8; 1536]).expect("write");

        let Html(page) = list_uploads(Extension(store)).await.expect("list");
        assert!(page.contains("<a href=\"a.txt\">a.txt</a>"));
        assert!(page.contains("<a href=\"b%20c.txt\">b c.txt</a>"));
        assert!(page.contains("1.5 KB"));
    }

    #[tokio::test]
    async fn serves_raw_file_bytes() {
        let (_temp, store) = make_store();
        std::fs::write(store.root_path().join("data.bin"), b"raw bytes").expect("write");

        let response = serve_upload(UrlPath("data.bin".to_string()), Extension(store))
            .await
            .expect("serve");
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        assert_eq!(&body[..], b"raw bytes");
    }

    #[tokio::test]
    async fn serving_missing_file_is_not_found() {
        let (_temp, store) = make_store();
        let result = serve_upload(UrlPath("ghost.bin".to_string()), Extension(store)).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
