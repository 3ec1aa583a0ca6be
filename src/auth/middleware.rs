//! Authentication Middleware
//! Mission: Protect API endpoints with JWT validation

use crate::auth::{jwt::JwtHandler, models::AuthenticatedAdmin};
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// Auth middleware that validates bearer tokens
pub async fn auth_middleware(
    State(jwt_handler): State<Arc<JwtHandler>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?;

    let token = header_value
        .to_str()
        .ok()
        .and_then(bearer_token)
        .ok_or(AuthError::InvalidFormat)?;

    let claims = jwt_handler.validate_token(token).map_err(|e| {
        debug!("Rejected bearer token: {:#}", e);
        AuthError::InvalidToken
    })?;

    // Add identity to request extensions so handlers and policies can access it
    req.extensions_mut().insert(AuthenticatedAdmin::from(claims));

    Ok(next.run(req).await)
}

/// Extract the token from an `Authorization` header value. The scheme is
/// matched case-insensitively.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

/// Extract the authenticated administrator from a request (use after auth middleware)
pub fn current_admin(req: &Request) -> Option<&AuthenticatedAdmin> {
    req.extensions().get::<AuthenticatedAdmin>()
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedAdmin>()
            .cloned()
            .ok_or(AuthError::Unauthenticated)
    }
}

/// Auth error types
///
/// Every authentication failure renders the same 401 body; only the log line
/// tells them apart.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidFormat,
    InvalidToken,
    Unauthenticated,
    Forbidden,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingToken
            | AuthError::InvalidFormat
            | AuthError::InvalidToken
            | AuthError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, "Bearer")],
                Json(json!({
                    "error": "unauthorized",
                    "message": "Authentication required",
                })),
            )
                .into_response(),
            AuthError::Forbidden => (
                StatusCode::FORBIDDEN,
                Json(json!({
                    "error": "forbidden",
                    "message": "Insufficient permissions",
                })),
            )
                .into_response(),
        }
    }
}
