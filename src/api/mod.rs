//! API layer - HTTP handlers and routing
//!
//! - Blog post endpoints (`/api/v1/posts`)
//! - Author endpoints (`/api/v1/authors`)
//! - Health check (`/api/v1/health`)
//! - Stored banner images (`<upload.public_prefix>/<file>`)

pub mod authors;
pub mod common;
pub mod middleware;
pub mod payload;
pub mod posts;

#[cfg(test)]
pub(crate) mod test_support;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, Method},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::db::repositories::{
    SqlxAuthorRepository, SqlxBannerImageRepository, SqlxBlogPostRepository,
};
use crate::db::DynDatabasePool;
use crate::services::{AuthorService, BlogPostService, MediaStore};

pub use middleware::{ApiError, AppState};

/// Room left in a request body for the text fields next to the image
const FORM_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// Wire repositories and services into the shared state
pub fn build_state(pool: DynDatabasePool, config: &Config) -> AppState {
    let media = Arc::new(MediaStore::new(config.upload.clone()));
    let post_service = Arc::new(BlogPostService::new(
        SqlxBlogPostRepository::boxed(pool.clone()),
        SqlxBannerImageRepository::boxed(pool.clone()),
        media,
    ));
    let author_service = Arc::new(AuthorService::new(SqlxAuthorRepository::boxed(pool.clone())));

    AppState {
        pool,
        post_service,
        author_service,
        pagination: Arc::new(config.pagination.clone()),
    }
}

/// Build the main API router
pub fn build_api_router() -> Router<AppState> {
    Router::new()
        .nest("/posts", posts::router())
        .nest("/authors", authors::router())
        .route("/health", get(health))
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, config: &Config) -> Router {
    let body_limit = config
        .upload
        .max_file_size
        .saturating_add(FORM_OVERHEAD_BYTES);

    Router::new()
        .nest("/api/v1", build_api_router())
        .nest_service(
            config.upload.public_prefix.trim_end_matches('/'),
            ServeDir::new(&config.upload.path),
        )
        .layer(DefaultBodyLimit::max(
            usize::try_from(body_limit).unwrap_or(usize::MAX),
        ))
        .layer(cors_layer(&config.server.cors_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    if origin == "*" {
        return cors.allow_origin(Any);
    }
    match origin.parse::<HeaderValue>() {
        Ok(value) => cors.allow_origin(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid CORS origin: {}", origin);
            cors
        }
    }
}

/// GET /api/v1/health
async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.pool.ping().await.map_err(|e| ApiError::storage(&e))?;
    Ok(Json(json!({ "status": "ok" })))
}

#[cfg(test)]
mod tests {
    use super::test_support::TestApp;
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_cors_preflight_allows_patch() {
        let pool = crate::db::create_test_pool().await.unwrap();
        let mut config = Config::default();
        config.server.cors_origin = "http://localhost:3000".to_string();
        let app = build_router(build_state(pool, &config), &config);

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/v1/posts/1")
                    .header(header::ORIGIN, "http://localhost:3000")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PATCH")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3000"
        );
        let methods = response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS]
            .to_str()
            .unwrap()
            .to_string();
        assert!(methods.contains("PATCH"));
    }

    #[tokio::test]
    async fn test_health() {
        let app = TestApp::new().await;
        let response = app.server.get("/api/v1/health").await;
        response.assert_status_ok();
        response.assert_json(&serde_json::json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = TestApp::new().await;
        app.server
            .get("/api/v1/nope")
            .await
            .assert_status_not_found();
    }
}
