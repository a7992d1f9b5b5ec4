//! Author API endpoints
//!
//! - GET    /api/v1/authors       - List authors (first and last name only)
//! - POST   /api/v1/authors       - Create an author
//! - GET    /api/v1/authors/{id}  - Get an author
//! - PUT    /api/v1/authors/{id}  - Replace an author
//! - PATCH  /api/v1/authors/{id}  - Update some fields
//! - DELETE /api/v1/authors/{id}  - Delete an author

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{Map, Value};

use crate::api::common::FieldsQuery;
use crate::api::middleware::{ApiError, AppState};
use crate::models::{CreateAuthorInput, UpdateAuthorInput};
use crate::services::{shape_author, Action, AuthorUpdateMode};

/// Build the author router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_authors).post(create_author))
        .route(
            "/{id}",
            get(get_author)
                .put(replace_author)
                .patch(patch_author)
                .delete(delete_author),
        )
}

/// GET /api/v1/authors
pub async fn list_authors(
    State(state): State<AppState>,
    Query(query): Query<FieldsQuery>,
) -> Result<Json<Vec<Map<String, Value>>>, ApiError> {
    let requested = query.allow_list();
    let authors = state.author_service.list().await?;
    Ok(Json(
        authors
            .iter()
            .map(|author| shape_author(Action::List, author, &requested))
            .collect(),
    ))
}

/// GET /api/v1/authors/{id}
pub async fn get_author(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<FieldsQuery>,
) -> Result<Json<Map<String, Value>>, ApiError> {
    let author = state.author_service.retrieve(id).await?;
    Ok(Json(shape_author(Action::Retrieve, &author, &query.allow_list())))
}

/// POST /api/v1/authors
pub async fn create_author(
    State(state): State<AppState>,
    Query(query): Query<FieldsQuery>,
    body: Result<Json<CreateAuthorInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Map<String, Value>>), ApiError> {
    let Json(input) = body.map_err(|e| ApiError::validation_error(e.body_text()))?;
    let author = state.author_service.create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(shape_author(Action::Create, &author, &query.allow_list())),
    ))
}

/// PUT /api/v1/authors/{id}
pub async fn replace_author(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<FieldsQuery>,
    body: Result<Json<UpdateAuthorInput>, JsonRejection>,
) -> Result<Json<Map<String, Value>>, ApiError> {
    let Json(input) = body.map_err(|e| ApiError::validation_error(e.body_text()))?;
    let author = state
        .author_service
        .update(id, input, AuthorUpdateMode::Full)
        .await?;
    Ok(Json(shape_author(Action::Update, &author, &query.allow_list())))
}

/// PATCH /api/v1/authors/{id}
pub async fn patch_author(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<FieldsQuery>,
    body: Result<Json<UpdateAuthorInput>, JsonRejection>,
) -> Result<Json<Map<String, Value>>, ApiError> {
    let Json(input) = body.map_err(|e| ApiError::validation_error(e.body_text()))?;
    let author = state
        .author_service
        .update(id, input, AuthorUpdateMode::Partial)
        .await?;
    Ok(Json(shape_author(
        Action::PartialUpdate,
        &author,
        &query.allow_list(),
    )))
}

/// DELETE /api/v1/authors/{id}
pub async fn delete_author(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.author_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
