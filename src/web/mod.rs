//! Browser UI: Home, Upload & Modifying, Delete.

mod handlers;
pub mod pages;

use crate::card_db::CardStore;
use crate::card_processor::ScanError;
use crate::config::Config;
use crate::heuristics::ClassifyError;
use crate::ocr::OcrEngine;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// State shared by all routes.
#[derive(Clone)]
pub struct AppState {
    pub db_path: Arc<PathBuf>,
    pub ocr: Arc<dyn OcrEngine>,
}

/// Room for the eight text fields next to the image in a `/save` form.
const SAVE_FIELDS_ALLOWANCE: usize = 64 * 1024;

/// Body cap for `/save`. The image comes back base64 encoded in a form field,
/// and form encoding turns each `+`, `/` and `=` into three bytes.
pub fn save_body_limit(max_upload_bytes: usize) -> usize {
    max_upload_bytes
        .saturating_mul(4)
        .saturating_add(SAVE_FIELDS_ALLOWANCE)
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/upload", get(handlers::upload_form).post(handlers::upload))
        .route(
            "/save",
            post(handlers::save).layer(DefaultBodyLimit::max(save_body_limit(max_upload_bytes))),
        )
        .route("/upload/preview", get(handlers::preview))
        .route(
            "/upload/modify",
            get(handlers::modify_form).post(handlers::modify),
        )
        .route("/delete", get(handlers::delete_form).post(handlers::delete))
        .route("/cards/:rowid/image", get(handlers::card_image))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

/// Open the store once so the table exists, then serve until shutdown.
pub async fn serve(
    cfg: &Config,
    ocr: Arc<dyn OcrEngine>,
) -> Result<(), Box<dyn std::error::Error>> {
    let db_path = PathBuf::from(&cfg.db_path);
    let cards = CardStore::new(&db_path)?.count()?;
    info!(db_path = %db_path.display(), cards, "Card store ready");

    let state = AppState {
        db_path: Arc::new(db_path),
        ocr,
    };
    let app = router(state, cfg.server.max_upload_bytes);

    let listener = TcpListener::bind(&cfg.server.bind).await?;
    info!("BizCard UI listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Run a store action on a blocking thread with a fresh connection.
pub(crate) async fn with_store<T, F>(state: &AppState, action: F) -> Result<T, WebError>
where
    F: FnOnce(&mut CardStore) -> rusqlite::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let db_path = Arc::clone(&state.db_path);
    let result = tokio::task::spawn_blocking(move || {
        let mut store = CardStore::new(db_path.as_path())?;
        action(&mut store)
    })
    .await?;
    Ok(result?)
}

/// An error rendered as an HTML page.
#[derive(Debug)]
pub struct WebError {
    status: StatusCode,
    message: String,
}

impl WebError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = %status, error = %self.message, "Request failed");
        } else {
            warn!(status = %status, error = %self.message, "Request rejected");
        }
        (status, Html(pages::error_page(status, &self.message))).into_response()
    }
}

impl From<rusqlite::Error> for WebError {
    fn from(e: rusqlite::Error) -> Self {
        match e {
            rusqlite::Error::QueryReturnedNoRows => {
                WebError::new(StatusCode::NOT_FOUND, "No matching card found")
            }
            other => WebError::new(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        }
    }
}

impl From<ScanError> for WebError {
    fn from(e: ScanError) -> Self {
        let status = match e {
            ScanError::UnsupportedImage
            | ScanError::Classify(ClassifyError::InsufficientText { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ScanError::Ocr(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        WebError::new(status, e.to_string())
    }
}

impl From<tokio::task::JoinError> for WebError {
    fn from(e: tokio::task::JoinError) -> Self {
        WebError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    }
}

impl From<axum::extract::multipart::MultipartError> for WebError {
    fn from(e: axum::extract::multipart::MultipartError) -> Self {
        WebError::new(StatusCode::BAD_REQUEST, e.body_text())
    }
}

impl From<base64::DecodeError> for WebError {
    fn from(e: base64::DecodeError) -> Self {
        WebError::new(StatusCode::BAD_REQUEST, format!("invalid image payload: {e}"))
    }
}
