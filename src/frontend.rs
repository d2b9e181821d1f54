//! Upload page delivery from the templates directory.

use axum::extract::Extension;
use axum::response::Html;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::error;

use crate::error::ApiError;

/// Location of the upload page template and static assets, resolved
/// once at startup.
#[derive(Debug)]
pub struct Templates {
    dir: PathBuf,
}

impl Templates {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir).await
    }

    pub fn dir_path(&self) -> &Path {
        &self.dir
    }

    fn index_path(&self) -> PathBuf {
        self.dir.join("index.html")
    }
}

/// `GET /`: serves the upload page template verbatim.
pub async fn serve_index(
    Extension(templates): Extension<Arc<Templates>>,
) -> Result<Html<String>, ApiError> {
    match fs::read_to_string(templates.index_path()).await {
        Ok(content) => Ok(Html(content)),
        Err(err) => {
            error!(error = %err, "failed to read index template");
            Err(ApiError::Internal("template not found".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Templates, serve_index};
    use crate::error::ApiError;
    use axum::extract::Extension;
    use axum::response::Html;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[tokio::test]
    async fn serves_template_verbatim() {
        let temp = tempdir().expect("tempdir");
        std::fs::write(temp.path().join("index.html"), "<html>upload</html>")
            .expect("write template");
        let templates = Arc::new(Templates::new(temp.path().to_path_buf()));

        let Html(content) = serve_index(Extension(templates)).await.expect("serve");
        assert_eq!(content, "<html>upload</html>");
    }

    #[tokio::test]
    async fn missing_template_is_internal_error() {
        let temp = tempdir().expect("tempdir");
        let templates = Arc::new(Templates::new(temp.path().to_path_buf()));

        let result = serve_index(Extension(templates)).await;
        assert!(matches!(result, Err(ApiError::Internal(_))));
    }
}
