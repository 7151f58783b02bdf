//! Action endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use crate::error::ServerError;
use crate::state::AppState;

/// Request body for POST /action/mark-read.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MarkReadRequest {
    /// Slug of the article that was read.
    #[serde(default)]
    article_slug: String,
}

/// Handle POST /action/mark-read.
pub(crate) async fn mark_read(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MarkReadRequest>,
) -> Result<StatusCode, ServerError> {
    let slug = request.article_slug.trim();
    if slug.is_empty() {
        return Err(ServerError::BadRequest("articleSlug is required".to_owned()));
    }

    let reads = state.reads.record(slug);
    tracing::info!(slug, reads, "article marked as read");

    Ok(StatusCode::NO_CONTENT)
}
