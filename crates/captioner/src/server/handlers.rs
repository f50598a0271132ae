//! Route handlers.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::response::Html;
use axum::Json;
use captioner_core::{CaptionResult, PipelineError};
use serde::Serialize;

use super::error::ApiError;
use super::AppState;

/// Multipart field carrying the upload.
pub const IMAGE_FIELD: &str = "image";

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub version: &'static str,
    pub vocabulary_size: usize,
    pub max_length: usize,
}

/// GET /: upload page.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /health: liveness plus the loaded vocabulary shape.
pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    let context = state.processor.context();
    Json(HealthReport {
        status: "ok",
        version: captioner_core::VERSION,
        vocabulary_size: context.vocabulary().cardinality(),
        max_length: context.max_length(),
    })
}

/// POST /predict: caption the `image` field of a multipart upload.
///
/// A body that is not multipart counts as a missing image.
pub async fn predict(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<CaptionResult>, ApiError> {
    let Ok(mut multipart) = multipart else {
        return Err(PipelineError::MissingImage.into());
    };

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(ApiError::from_multipart)?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        // Only file parts count; a plain text field named `image` is not an upload.
        let Some(file_name) = field.file_name() else {
            continue;
        };
        let name = if file_name.is_empty() {
            "upload".to_string()
        } else {
            file_name.to_string()
        };
        let bytes = field.bytes().await.map_err(ApiError::from_multipart)?;
        upload = Some((name, bytes));
        break;
    }

    let Some((name, bytes)) = upload else {
        return Err(PipelineError::MissingImage.into());
    };
    tracing::debug!("Received {} ({} bytes)", name, bytes.len());

    let result = state.processor.process_bytes(bytes.to_vec(), &name).await?;
    Ok(Json(result))
}
