//! Authentication API Endpoints
//! Mission: Provide login and identity endpoints

use crate::auth::{
    login::{LoginError, LoginFlow},
    models::{AuthenticatedAdmin, LoginRequest, LoginResponse},
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, info};

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub login_flow: LoginFlow,
}

impl AuthState {
    pub fn new(login_flow: LoginFlow) -> Self {
        Self { login_flow }
    }
}

/// Login endpoint - POST /api/auth/login
pub async fn login(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, LoginError> {
    info!("Login attempt: {}", payload.email);

    // bcrypt verification blocks; run it on the blocking pool
    let flow = state.login_flow.clone();
    let issued = tokio::task::spawn_blocking(move || {
        flow.authenticate(&payload.email, &payload.password)
    })
    .await
    .map_err(|e| {
        error!("Login task failed: {}", e);
        LoginError::Internal(e.into())
    })??;

    Ok(Json(LoginResponse {
        token: issued.token,
        expires_in: issued.expires_in,
    }))
}

/// Get current administrator - GET /api/auth/me
/// Built from the token claims; no database lookup
pub async fn get_current_admin(admin: AuthenticatedAdmin) -> Json<AuthenticatedAdmin> {
    Json(admin)
}

impl IntoResponse for LoginError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            LoginError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "Invalid email or password",
            ),
            LoginError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error",
            ),
        };

        (status, Json(json!({ "error": error, "message": message }))).into_response()
    }
}
