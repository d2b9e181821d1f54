//! filedrop server binary.
//!
//! A small HTTP file-upload service: serves an upload page, accepts
//! multipart uploads into a flat uploads directory, lists and serves
//! stored files, and deletes them by filename.

mod atomic;
mod bytesize;
mod config;
mod error;
mod files;
mod frontend;
mod http;
mod logging;
mod storage;
mod upload;

use axum::extract::{DefaultBodyLimit, Extension};
use axum::http::Request;
use axum::response::Redirect;
use axum::routing::{get, post};
use axum::{Router, middleware};
use axum_server::Handle;
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, error, info, info_span};

use crate::bytesize::format_bytes;
use crate::config::{Args, Limits, parse_max_file_size};
use crate::frontend::Templates;
use crate::storage::UploadStore;

/// Starts the filedrop server and blocks until shutdown.
#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    logging::init_logging();

    let args = Args::parse();
    let store = Arc::new(UploadStore::new(PathBuf::from(&args.upload_dir)));
    let templates = Arc::new(Templates::new(PathBuf::from(&args.templates_dir)));
    let limits = Arc::new(Limits {
        max_file_size: parse_max_file_size(&args.max_file_size),
    });

    if let Err(err) = store.ensure_root().await {
        error!(dir = args.upload_dir, error = %err, "failed to create upload directory");
        return Err(err);
    }
    if let Err(err) = templates.ensure_dir().await {
        error!(dir = args.templates_dir, error = %err, "failed to create templates directory");
        return Err(err);
    }

    info!(dir = %store.root_path().display(), "serving uploads");
    if limits.max_file_size > 0 {
        info!(
            "maximum file size set to {}",
            format_bytes(limits.max_file_size)
        );
    } else {
        info!("maximum file size: unlimited");
    }

    let app = build_router(store, templates, limits);

    let host = args
        .host
        .parse::<IpAddr>()
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string()))?;
    let addr = SocketAddr::new(host, args.port);
    let handle = Handle::new();

    info!("starting server at {}", addr);

    let server = axum_server::bind(addr)
        .handle(handle.clone())
        .serve(app.into_make_service());

    tokio::select! {
        result = server => result?,
        _ = shutdown_signal(handle) => {}
    }

    Ok(())
}

fn build_router(
    store: Arc<UploadStore>,
    templates: Arc<Templates>,
    limits: Arc<Limits>,
) -> Router {
    let static_dir = templates.dir_path().to_path_buf();
    Router::new()
        .route("/", get(frontend::serve_index))
        .route(
            "/upload",
            post(upload::upload_file).layer(DefaultBodyLimit::disable()),
        )
        .route("/delete", post(files::delete_file))
        .route(
            "/uploads",
            get(|| async { Redirect::permanent("/uploads/") }),
        )
        .route("/uploads/", get(files::list_uploads))
        .route("/uploads/{name}", get(files::serve_upload))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(middleware::from_fn(http::add_security_headers))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    info_span!(
                        env!("CARGO_CRATE_NAME"),
                        method = ?request.method(),
                        path = ?request.uri().path(),
                    )
                })
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
        )
        .layer(Extension(store))
        .layer(Extension(templates))
        .layer(Extension(limits))
}

async fn shutdown_signal(handle: Handle) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("received termination signal, shutting down");
    handle.graceful_shutdown(Some(Duration::from_secs(10)));
}
