//! Bearer tokens: RS256 issuance with the private key, verification with the public key,
//! and the axum gate that guards mutating routes.
//!
//! Tokens carry `{ "userId", "iat" }` and no expiry, so a token stays valid until the key
//! pair is rotated.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::AppError;

pub const TOKEN_NOT_PROVIDED: &str = "Token not provided";
pub const TOKEN_MISSING: &str = "Token missing from Authorization header";
pub const INVALID_TOKEN: &str = "Invalid token";

/// Token payload. Field names are part of the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: i64,
    /// Issued at (seconds since epoch).
    #[serde(default)]
    pub iat: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("invalid key: {0}")]
    InvalidKey(String),
    #[error("signing failed: {0}")]
    Signing(String),
}

/// Signs tokens with the RSA private key.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
}

impl TokenIssuer {
    pub fn from_rsa_pem(pem: &[u8]) -> Result<Self, TokenError> {
        let encoding = EncodingKey::from_rsa_pem(pem).map_err(|e| TokenError::InvalidKey(e.to_string()))?;
        Ok(Self { encoding })
    }

    pub fn issue(&self, user_id: i64) -> Result<String, TokenError> {
        let claims = Claims { user_id, iat: Utc::now().timestamp() };
        encode(&Header::new(Algorithm::RS256), &claims, &self.encoding).map_err(|e| TokenError::Signing(e.to_string()))
    }
}

/// Verifies tokens with the RSA public key. Built once at startup and shared read-only.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn from_rsa_pem(pem: &[u8]) -> Result<Self, TokenError> {
        let decoding = DecodingKey::from_rsa_pem(pem).map_err(|e| TokenError::InvalidKey(e.to_string()))?;
        let mut validation = Validation::new(Algorithm::RS256);
        // Issued tokens carry no exp/aud, so neither may be required.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();
        Ok(Self { decoding, validation })
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed(e.to_string()),
            })
    }
}

/// Caller identity injected by [`require_auth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .copied()
            .ok_or_else(|| AppError::Unauthorized(TOKEN_NOT_PROVIDED.into()))
    }
}

/// Second whitespace-separated segment of an `Authorization` value; the scheme is ignored.
pub fn bearer_token(value: &str) -> Option<&str> {
    value.split_whitespace().nth(1)
}

/// Resolve the caller from request headers without touching any store.
pub fn authenticate(headers: &HeaderMap, verifier: &TokenVerifier) -> Result<Identity, AppError> {
    let Some(raw) = headers.get(header::AUTHORIZATION) else {
        tracing::warn!("authentication failed: missing authorization header");
        return Err(AppError::Unauthorized(TOKEN_NOT_PROVIDED.into()));
    };
    let Ok(value) = raw.to_str() else {
        tracing::warn!("authentication failed: authorization header is not visible ascii");
        return Err(AppError::Unauthorized(INVALID_TOKEN.into()));
    };
    let Some(token) = bearer_token(value) else {
        tracing::warn!("authentication failed: no token segment in authorization header");
        return Err(AppError::Unauthorized(TOKEN_MISSING.into()));
    };
    let claims = verifier.verify(token).map_err(|e| {
        tracing::warn!(reason = %e, "authentication failed: token rejected");
        AppError::Unauthorized(INVALID_TOKEN.into())
    })?;
    Ok(Identity { user_id: claims.user_id })
}

/// Gate for mutating routes; use with `axum::middleware::from_fn_with_state`.
pub async fn require_auth(
    State(verifier): State<Arc<TokenVerifier>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = authenticate(request.headers(), &verifier)?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}
