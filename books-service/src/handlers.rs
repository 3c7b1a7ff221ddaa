use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use bookstore_common::{
    auth::{require_auth, Identity, TokenVerifier},
    validation::{json_body, path_id},
    AppError,
};
use serde_json::json;

use crate::{
    models::{NewBook, INVALID_BOOK_DATA},
    repository::BookRepository,
};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn BookRepository>,
    pub verifier: Arc<TokenVerifier>,
}

pub fn app(state: AppState) -> Router {
    let public = Router::new()
        .route("/books", get(list_books))
        .route("/books/:id", get(get_book));

    let protected = Router::new()
        .route("/books", post(create_book))
        .route("/books/:id", delete(delete_book))
        .route_layer(from_fn_with_state(state.verifier.clone(), require_auth));

    Router::new()
        .nest("/api", public.merge(protected))
        .route("/healthz", get(health))
        .with_state(state)
}

pub async fn list_books(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let books = state.repo.list().await?;
    Ok(Json(books))
}

/// Also answers `HEAD`, which the orders service uses as an existence probe.
pub async fn get_book(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = path_id(id)?;
    let book = state.repo.find_by_id(id).await?;
    Ok(Json(book))
}

pub async fn create_book(
    State(state): State<AppState>,
    identity: Identity,
    body: Result<Json<NewBook>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let payload = json_body(body, INVALID_BOOK_DATA)?;
    let book = state.repo.create(payload).await?;
    tracing::info!(book_id = book.id, user_id = identity.user_id, "book created");
    Ok(Json(json!({ "id": book.id })))
}

pub async fn delete_book(
    State(state): State<AppState>,
    identity: Identity,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = path_id(id)?;
    state.repo.delete(id).await?;
    tracing::info!(book_id = id, user_id = identity.user_id, "book deleted");
    Ok(Json(json!({ "success": true })))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    if state.repo.ping().await {
        (StatusCode::OK, Json(json!({ "status": "ok" })))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "status": "degraded" })))
    }
}
