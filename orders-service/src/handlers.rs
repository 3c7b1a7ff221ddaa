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
    books::BookDirectory,
    models::{NewOrder, OrderChanges, INVALID_BOOK_ID, INVALID_ORDER_DATA, NO_CHANGES},
    repository::OrderRepository,
};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn OrderRepository>,
    pub books: Arc<dyn BookDirectory>,
    pub verifier: Arc<TokenVerifier>,
}

pub fn app(state: AppState) -> Router {
    let public = Router::new().route("/orders/:id", get(orders_for_user));

    let protected = Router::new()
        .route("/orders", post(create_order))
        .route("/orders/:id", delete(delete_order).patch(update_order))
        .route_layer(from_fn_with_state(state.verifier.clone(), require_auth));

    Router::new()
        .nest("/api", public.merge(protected))
        .route("/healthz", get(health))
        .with_state(state)
}

/// `GET /api/orders/:id`: the path id is a *user* id; returns every order that user placed.
pub async fn orders_for_user(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = path_id(id)?;
    let orders = state.repo.list_by_user(user_id).await?;
    Ok(Json(orders))
}

pub async fn create_order(
    State(state): State<AppState>,
    identity: Identity,
    body: Result<Json<NewOrder>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let payload = json_body(body, INVALID_ORDER_DATA)?;
    payload.validate()?;

    if !state.books.exists(payload.book_id).await {
        tracing::info!(book_id = payload.book_id, user_id = identity.user_id, "order rejected: unknown book");
        return Err(AppError::NotFound(INVALID_BOOK_ID.into()));
    }

    let order = state.repo.create(payload).await?;
    tracing::info!(order_id = order.id, user_id = identity.user_id, "order created");
    Ok(Json(json!({ "id": order.id })))
}

pub async fn delete_order(
    State(state): State<AppState>,
    identity: Identity,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = path_id(id)?;
    state.repo.delete(id).await?;
    tracing::info!(order_id = id, user_id = identity.user_id, "order deleted");
    Ok(Json(json!({ "success": true })))
}

/// Partial update. A changed `bookId` is stored as given; it is not re-checked against
/// the books service.
pub async fn update_order(
    State(state): State<AppState>,
    identity: Identity,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<OrderChanges>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = path_id(id)?;
    let changes = json_body(body, INVALID_ORDER_DATA)?;
    changes.validate()?;
    if changes.is_empty() {
        return Err(AppError::NotFound(NO_CHANGES.into()));
    }

    let order = state.repo.update(id, changes).await?;
    tracing::info!(order_id = order.id, user_id = identity.user_id, "order updated");
    Ok(Json(json!({ "id": order.id })))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    if state.repo.ping().await {
        (StatusCode::OK, Json(json!({ "status": "ok" })))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "status": "degraded" })))
    }
}
