//! Blog post API endpoints
//!
//! - GET    /api/v1/posts       - List active posts
//! - POST   /api/v1/posts       - Create a post (multipart or JSON)
//! - GET    /api/v1/posts/{id}  - Get a post
//! - PUT    /api/v1/posts/{id}  - Replace all writable fields
//! - PATCH  /api/v1/posts/{id}  - Update some fields
//! - DELETE /api/v1/posts/{id}  - Soft-delete a post

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::api::common::{FieldsQuery, ListPostsQuery};
use crate::api::middleware::{ApiError, AppState};
use crate::api::payload::PostPayload;
use crate::models::BlogPostWithBanner;
use crate::services::{shape_post, Action, AllowList, PostShape, UpdateMode};

/// Response for the post list
#[derive(Debug, Serialize)]
pub struct PostListResponse {
    /// Active posts across all pages
    pub count: i64,
    /// Soft-deleted posts still in storage
    pub deleted_count: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub results: Vec<Map<String, Value>>,
}

/// Build the post router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route(
            "/{id}",
            get(get_post)
                .put(replace_post)
                .patch(patch_post)
                .delete(delete_post),
        )
}

/// GET /api/v1/posts
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<PostListResponse>, ApiError> {
    let params = query.list_params(&state.pagination);
    let requested = query.allow_list();

    let listing = state.post_service.list(&params).await?;
    let total_pages = listing.page.total_pages();
    let results = listing
        .page
        .items
        .iter()
        .map(|record| PostShape::List.render(record, &requested))
        .collect();

    Ok(Json(PostListResponse {
        count: listing.page.total,
        deleted_count: listing.deleted_count,
        page: listing.page.page,
        page_size: listing.page.per_page,
        total_pages,
        results,
    }))
}

/// GET /api/v1/posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<FieldsQuery>,
) -> Result<Json<Map<String, Value>>, ApiError> {
    let record = state.post_service.retrieve(id).await?;
    Ok(Json(render(Action::Retrieve, &record, &query.allow_list())))
}

/// POST /api/v1/posts
pub async fn create_post(
    State(state): State<AppState>,
    Query(query): Query<FieldsQuery>,
    payload: PostPayload,
) -> Result<(StatusCode, Json<Map<String, Value>>), ApiError> {
    let (input, image) = payload.into_create();
    let record = state.post_service.create(input, image).await?;
    Ok((
        StatusCode::CREATED,
        Json(render(Action::Create, &record, &query.allow_list())),
    ))
}

/// PUT /api/v1/posts/{id}
pub async fn replace_post(
    state: State<AppState>,
    path: Path<i64>,
    query: Query<FieldsQuery>,
    payload: PostPayload,
) -> Result<Json<Map<String, Value>>, ApiError> {
    update_post(state, path, query, payload, Action::Update).await
}

/// PATCH /api/v1/posts/{id}
pub async fn patch_post(
    state: State<AppState>,
    path: Path<i64>,
    query: Query<FieldsQuery>,
    payload: PostPayload,
) -> Result<Json<Map<String, Value>>, ApiError> {
    update_post(state, path, query, payload, Action::PartialUpdate).await
}

async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<FieldsQuery>,
    payload: PostPayload,
    action: Action,
) -> Result<Json<Map<String, Value>>, ApiError> {
    let mode = if action == Action::Update {
        UpdateMode::Full
    } else {
        UpdateMode::Partial
    };
    let record = state
        .post_service
        .update(id, payload.fields, payload.image, mode)
        .await?;
    Ok(Json(render(action, &record, &query.allow_list())))
}

/// DELETE /api/v1/posts/{id}
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.post_service.soft_delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn render(
    action: Action,
    record: &BlogPostWithBanner,
    requested: &AllowList,
) -> Map<String, Value> {
    shape_post(action, record, requested).unwrap_or_default()
}
