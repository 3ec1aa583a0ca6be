use anyhow::{Context, Result};
use axum::{
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::auth::{
    api as auth_api, auth_middleware, policy_middleware, AuthState, CredentialStore, JwtHandler,
    LoginFlow, PasswordVerifier, Policy, SqliteCredentialStore,
};
use crate::config::AppConfig;
use crate::middleware::request_logging;
use crate::vehicles::{api as vehicles_api, VehicleState, VehicleStore};

/// Shared application state, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub jwt_handler: Arc<JwtHandler>,
    pub auth: AuthState,
    pub vehicles: VehicleState,
}

impl AppState {
    /// Open storage and wire the auth components from validated configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let verifier = Arc::new(
            PasswordVerifier::with_cost(config.bcrypt_cost)
                .context("Failed to initialize password verifier")?,
        );

        let credential_store = SqliteCredentialStore::new(config.sqlite_path())?;
        if config.seed_test_admin {
            credential_store.seed_test_admin(&verifier)?;
        }
        let vehicle_store = Arc::new(VehicleStore::new(credential_store.connection())?);

        info!("Credential store opened at: {}", config.sqlite_path());

        let jwt_handler = Arc::new(JwtHandler::from_config(config));
        Ok(Self::new(
            Arc::new(credential_store),
            vehicle_store,
            verifier,
            jwt_handler,
        ))
    }

    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        vehicles: Arc<VehicleStore>,
        verifier: Arc<PasswordVerifier>,
        jwt_handler: Arc<JwtHandler>,
    ) -> Self {
        let login_flow = LoginFlow::new(credentials.clone(), verifier, jwt_handler.clone());

        Self {
            jwt_handler,
            auth: AuthState::new(login_flow),
            vehicles: VehicleState {
                vehicles,
                credentials,
            },
        }
    }
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    // Auth routes (separate router with auth state)
    let auth_router = Router::new()
        .route("/api/auth/login", post(auth_api::login))
        .with_state(state.auth);

    // Protected routes: token validation first, then the route's policy
    let protected_routes = Router::new()
        .route("/api/auth/me", get(auth_api::get_current_admin))
        .route(
            "/api/vehicles",
            get(vehicles_api::list_vehicles)
                .route_layer(middleware::from_fn_with_state(
                    Policy::RequireEditorOrAdmin,
                    policy_middleware,
                ))
                .merge(
                    post(vehicles_api::create_vehicle).route_layer(
                        middleware::from_fn_with_state(Policy::RequireAdminRole, policy_middleware),
                    ),
                ),
        )
        .route_layer(middleware::from_fn_with_state(
            state.jwt_handler,
            auth_middleware,
        ))
        .with_state(state.vehicles);

    let public_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(auth_router)
        .layer(middleware::from_fn(request_logging))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}
