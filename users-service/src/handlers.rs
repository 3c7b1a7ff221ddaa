use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use bookstore_common::{validation::json_body, AppError};
use serde_json::json;

use crate::{
    auth::AuthService,
    models::{Credentials, NewUser, User, EMAIL_TAKEN, INVALID_USER_DATA},
    repository::UserRepository,
};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn UserRepository>,
    pub auth: Arc<dyn AuthService>,
}

pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .route("/register", post(register))
        .route("/login", post(login));

    Router::new()
        .nest("/api", api)
        .route("/healthz", get(health))
        .with_state(state)
}

pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let payload = json_body(body, INVALID_USER_DATA)?;
    User::validate_email(&payload.email)?;

    if state.repo.find_by_email(&payload.email).await?.is_some() {
        return Err(AppError::Conflict(EMAIL_TAKEN.into()));
    }

    let password_hash = state.auth.hash_password(payload.password).await?;
    let user = state.repo.create(NewUser { email: payload.email, password_hash }).await?;
    tracing::info!(user_id = user.id, "user registered");
    Ok(Json(json!({ "success": true })))
}

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let payload = json_body(body, INVALID_USER_DATA)?;
    User::validate_email(&payload.email)?;

    // Unknown email and wrong password share one response.
    let Some(user) = state.repo.find_by_email(&payload.email).await? else {
        return Err(AppError::Validation(INVALID_USER_DATA.into()));
    };
    if !state.auth.verify_password(payload.password, user.password_hash).await? {
        tracing::info!(user_id = user.id, "login rejected: wrong password");
        return Err(AppError::Validation(INVALID_USER_DATA.into()));
    }

    let token = state.auth.generate_token(user.id).await?;
    Ok(Json(json!({ "token": token })))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    if state.repo.ping().await {
        (StatusCode::OK, Json(json!({ "status": "ok" })))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "status": "degraded" })))
    }
}
