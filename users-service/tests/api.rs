use std::sync::Arc;

use axum::{body::{self, Body}, http::{Method, Request, StatusCode}, Router};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot`

use bookstore_common::auth::{TokenIssuer, TokenVerifier};
use users_service::auth::Argon2AuthService;
use users_service::handlers::{app, AppState};
use users_service::repository::{RepositoryFactory, UserRepository};

const PRIVATE_PEM: &[u8] = include_bytes!("../../testdata/jwt_private.pem");
const PUBLIC_PEM: &[u8] = include_bytes!("../../testdata/jwt_public.pem");

fn harness() -> (Router, Arc<dyn UserRepository>) {
    let repo = RepositoryFactory::in_memory();
    let auth = Arc::new(Argon2AuthService::new(TokenIssuer::from_rsa_pem(PRIVATE_PEM).unwrap()));
    (app(AppState { repo: repo.clone(), auth }), repo)
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn register_then_login_issues_token_for_user() {
    let (app, repo) = harness();
    let (status, v) = post(&app, "/api/register", json!({ "email": "a@b.com", "password": "pw" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v, json!({ "success": true }));

    let stored = repo.find_by_email("a@b.com").await.unwrap().unwrap();
    assert!(stored.password_hash.starts_with("$argon2id$"));

    let (status, v) = post(&app, "/api/login", json!({ "email": "a@b.com", "password": "pw" })).await;
    assert_eq!(status, StatusCode::OK);
    let token = v["token"].as_str().unwrap();
    let claims = TokenVerifier::from_rsa_pem(PUBLIC_PEM).unwrap().verify(token).unwrap();
    assert_eq!(claims.user_id, stored.id);
}

#[tokio::test]
async fn duplicate_registration_is_409_and_keeps_original_hash() {
    let (app, repo) = harness();
    post(&app, "/api/register", json!({ "email": "a@b.com", "password": "first" })).await;
    let original = repo.find_by_email("a@b.com").await.unwrap().unwrap();

    let (status, v) = post(&app, "/api/register", json!({ "email": "a@b.com", "password": "second" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(v["error"], "Email is already taken");
    assert_eq!(repo.find_by_email("a@b.com").await.unwrap().unwrap(), original);

    let (status, _) = post(&app, "/api/login", json!({ "email": "a@b.com", "password": "first" })).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_the_same() {
    let (app, _) = harness();
    post(&app, "/api/register", json!({ "email": "a@b.com", "password": "pw" })).await;

    let (wrong_status, wrong) = post(&app, "/api/login", json!({ "email": "a@b.com", "password": "nope" })).await;
    let (unknown_status, unknown) = post(&app, "/api/login", json!({ "email": "x@b.com", "password": "pw" })).await;
    assert_eq!(wrong_status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown_status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong, json!({ "error": "Invalid user data" }));
    assert_eq!(wrong, unknown);
}

#[tokio::test]
async fn email_match_is_case_sensitive() {
    let (app, _) = harness();
    post(&app, "/api/register", json!({ "email": "a@b.com", "password": "pw" })).await;
    let (status, _) = post(&app, "/api/login", json!({ "email": "A@B.com", "password": "pw" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_payloads_are_400() {
    let (app, repo) = harness();
    for body in [
        json!({ "email": "invalid", "password": "pw" }),
        json!({ "email": "a@b.com" }),
        json!({ "password": "pw" }),
        json!({ "email": 5, "password": "pw" }),
    ] {
        for uri in ["/api/register", "/api/login"] {
            let (status, v) = post(&app, uri, body.clone()).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{} {}", uri, body);
            assert_eq!(v["error"], "Invalid user data");
        }
    }
    assert_eq!(repo.find_by_email("invalid").await.unwrap(), None);
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _) = harness();
    let req = Request::builder().uri("/healthz").body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn malformed_emails_are_not_registered() {
    let (app, repo) = harness();
    for email in ["a@b.c", "a!b@c.com", "a.@b.com", ".a@b.com", "a@-b.com", "a@b.123"] {
        let (status, v) = post(&app, "/api/register", json!({ "email": email, "password": "pw" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", email);
        assert_eq!(v["error"], "Invalid user data");
        assert_eq!(repo.find_by_email(email).await.unwrap(), None);
    }
}
