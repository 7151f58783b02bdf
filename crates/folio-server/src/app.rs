//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower::ServiceBuilder;

use crate::handlers;
use crate::middleware::security;
use crate::state::AppState;

/// Create the application router.
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/blog", get(handlers::blog::get_posts))
        .route("/blog/{slug}", get(handlers::blog::get_post))
        .route("/action/mark-read", post(handlers::actions::mark_read))
        .layer(
            ServiceBuilder::new()
                .layer(security::content_type_options_layer())
                .layer(security::frame_options_layer()),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use folio_bundler::{Bundler, TransformSet};
    use folio_cache::NullCache;
    use folio_content::MockContentSource;
    use folio_site::{Library, LibraryConfig};
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    use super::*;

    fn state() -> Arc<AppState> {
        let source = MockContentSource::new()
            .with_file(
                "content/blog/older/index.mdx",
                "---\ntitle: Older\ndate: 2024-01-01\n---\nOld\n",
            )
            .with_file(
                "content/blog/newer/index.mdx",
                "---\ntitle: Newer\ndate: 2024-02-01\n---\nNew\n",
            );
        let library = Library::new(
            Arc::new(source),
            &NullCache,
            Bundler::new(),
            TransformSet::new(),
            LibraryConfig::default(),
        );
        Arc::new(AppState::new(library))
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn mark_read_request(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/action/mark-read")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_post() {
        let app = create_router(state());

        let response = app
            .oneshot(Request::builder().uri("/blog/newer").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            "public, max-age=3600"
        );
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
        let json = json_body(response).await;
        assert_eq!(json["page"]["slug"], "newer");
        assert_eq!(json["page"]["code"], "<p>New</p>\n");
        assert_eq!(json["page"]["readTime"]["text"], "1 min read");
        assert_eq!(json["meta"]["title"], "Newer");
    }

    #[tokio::test]
    async fn test_get_missing_post() {
        let app = create_router(state());

        let response = app
            .oneshot(Request::builder().uri("/blog/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            "public, max-age=3600"
        );
        let json = json_body(response).await;
        assert!(json["page"].is_null());
        assert_eq!(json["meta"]["title"], "Not found");
    }

    #[tokio::test]
    async fn test_escaping_slug_is_not_found() {
        let app = create_router(state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/blog/..%2F..%2Fetc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert!(json["page"].is_null());
        assert_eq!(json["meta"]["title"], "Not found");
    }

    #[tokio::test]
    async fn test_list_posts_newest_first() {
        let app = create_router(state());

        let response = app
            .oneshot(Request::builder().uri("/blog").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        let slugs: Vec<&str> = json["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["slug"].as_str().unwrap())
            .collect();
        assert_eq!(slugs, vec!["newer", "older"]);
        assert!(json["items"][0].get("code").is_none());
    }

    #[tokio::test]
    async fn test_mark_read() {
        let state = state();
        let app = create_router(Arc::clone(&state));

        let response = app
            .oneshot(mark_read_request(r#"{"articleSlug":"newer"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(state.reads.count("newer"), 1);
    }

    #[tokio::test]
    async fn test_mark_read_requires_slug() {
        let state = state();
        let app = create_router(Arc::clone(&state));

        let response = app
            .oneshot(mark_read_request(r#"{"articleSlug":""}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.reads.count(""), 0);
    }
}
