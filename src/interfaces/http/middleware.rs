//! Authentication middleware for Axum
//!
//! Verifies the bearer token and stores the caller's [`CallerIdentity`] in
//! request extensions for the handlers behind it.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::domain::{CallerIdentity, DomainError};
use crate::infrastructure::crypto::jwt::{verify_token, JwtConfig};
use crate::interfaces::http::common::ApiError;

/// Authentication error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
}

/// State for the authentication middleware
#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
}

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolve the caller from an `Authorization` header value.
pub fn authenticate_header(
    auth_header: Option<&str>,
    config: &JwtConfig,
) -> Result<CallerIdentity, AuthError> {
    let auth_header = auth_header.ok_or(AuthError::MissingToken)?;
    let token = extract_token(auth_header).ok_or(AuthError::InvalidToken)?;

    let claims = verify_token(token, config).map_err(|e| {
        debug!(error = %e, "Rejected bearer token");
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken,
        }
    })?;
    if claims.is_expired() {
        return Err(AuthError::ExpiredToken);
    }
    claims.identity().ok_or(AuthError::InvalidToken)
}

/// JWT authentication middleware
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    match authenticate_header(auth_header, &auth_state.jwt_config) {
        Ok(caller) => {
            request.extensions_mut().insert(caller);
            next.run(request).await
        }
        Err(error) => auth_error_response(error),
    }
}

fn auth_error_response(error: AuthError) -> Response {
    let (reason, message) = match error {
        AuthError::MissingToken => ("missing", "Missing authentication token"),
        AuthError::InvalidToken => ("invalid", "Invalid authentication token"),
        AuthError::ExpiredToken => ("expired", "Token has expired"),
    };
    metrics::counter!("auth_rejections_total", "reason" => reason).increment(1);

    ApiError(DomainError::Unauthorized(message.to_string())).into_response()
}
