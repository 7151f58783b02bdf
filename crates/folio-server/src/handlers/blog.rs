//! Blog API endpoints.
//!
//! Returns compiled blog posts and the newest-first post index.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use folio_site::{BLOG_AREA, CompiledPage, FetchOptions, PageListItem, PageMeta, page_meta};
use serde::Serialize;

use crate::error::ServerError;
use crate::handlers::with_library;
use crate::state::AppState;

/// Cache policy for post responses, found or not.
const POST_CACHE_CONTROL: &str = "public, max-age=3600";

/// Response for GET /blog/{slug}.
#[derive(Serialize)]
pub(crate) struct PostResponse {
    /// Compiled post, `null` when it does not exist.
    page: Option<CompiledPage>,
    /// Document head metadata.
    meta: PageMeta,
}

/// Response for GET /blog.
#[derive(Serialize)]
pub(crate) struct PostListResponse {
    /// Posts, newest first.
    items: Vec<PageListItem>,
}

/// Handle GET /blog/{slug}.
pub(crate) async fn get_post(
    Path(slug): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ServerError> {
    let page = {
        let slug = slug.clone();
        with_library(&state, move |library| {
            library.page(BLOG_AREA, &slug, &FetchOptions::default())
        })
        .await?
    };

    let status = if page.is_some() {
        StatusCode::OK
    } else {
        tracing::debug!(slug = %slug, "post not found");
        StatusCode::BAD_REQUEST
    };
    let response = PostResponse {
        meta: page_meta(page.as_ref()),
        page,
    };

    Ok((
        status,
        [(header::CACHE_CONTROL, POST_CACHE_CONTROL)],
        Json(response),
    )
        .into_response())
}

/// Handle GET /blog.
pub(crate) async fn get_posts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PostListResponse>, ServerError> {
    let items = with_library(&state, |library| {
        library.blog_list_items(&FetchOptions::default())
    })
    .await?;

    Ok(Json(PostListResponse { items }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_post_serializes_null_page() {
        let response = PostResponse {
            page: None,
            meta: page_meta(None),
        };

        let json = serde_json::to_value(&response).unwrap();

        assert!(json["page"].is_null());
        assert_eq!(json["meta"]["title"], "Not found");
    }
}
