//! Vehicle API Endpoints
//! Mission: Register and list vehicles behind role policies

use crate::auth::{credential_store::CredentialStore, models::AuthenticatedAdmin};
use crate::vehicles::{
    models::{CreateVehicleRequest, Vehicle, VehicleListing},
    store::{InsertOutcome, VehicleStore},
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Shared vehicle state
#[derive(Clone)]
pub struct VehicleState {
    pub vehicles: Arc<VehicleStore>,
    pub credentials: Arc<dyn CredentialStore>,
}

/// Register vehicle - POST /api/vehicles (RequireAdminRole)
pub async fn create_vehicle(
    State(state): State<VehicleState>,
    admin: AuthenticatedAdmin,
    Json(payload): Json<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<Vehicle>), VehicleApiError> {
    let payload = payload.normalized().map_err(VehicleApiError::MissingField)?;

    // Plate must be unique
    let existing = state
        .vehicles
        .find_by_plate(&payload.plate)
        .map_err(VehicleApiError::internal)?;
    if existing.is_some() {
        return Err(VehicleApiError::DuplicatePlate(payload.plate));
    }

    // Stamp the registering administrator
    let registrar = state
        .credentials
        .find_by_email(&admin.email)
        .map_err(VehicleApiError::internal)?
        .ok_or_else(|| {
            warn!("Token identity {} has no administrator record", admin.email);
            VehicleApiError::UnknownAdministrator
        })?;

    let vehicle = Vehicle {
        id: Uuid::new_v4(),
        plate: payload.plate,
        model: payload.model,
        color: payload.color,
        slot_position: payload.slot_position,
        registered_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        registered_by: Some(registrar.id),
    };

    match state
        .vehicles
        .insert(&vehicle)
        .map_err(VehicleApiError::internal)?
    {
        InsertOutcome::Inserted => {
            info!("Vehicle {} registered by {}", vehicle.plate, registrar.email);
            Ok((StatusCode::CREATED, Json(vehicle)))
        }
        // Lost a race with a concurrent registration of the same plate
        InsertOutcome::DuplicatePlate => Err(VehicleApiError::DuplicatePlate(vehicle.plate)),
    }
}

/// List vehicles - GET /api/vehicles (RequireEditorOrAdmin)
pub async fn list_vehicles(
    State(state): State<VehicleState>,
) -> Result<Json<Vec<VehicleListing>>, VehicleApiError> {
    let listings = state
        .vehicles
        .list_all()
        .map_err(VehicleApiError::internal)?;
    Ok(Json(listings))
}

/// Vehicle API errors
#[derive(Debug)]
pub enum VehicleApiError {
    MissingField(&'static str),
    DuplicatePlate(String),
    UnknownAdministrator,
    InternalError,
}

impl VehicleApiError {
    fn internal(e: anyhow::Error) -> Self {
        error!("Vehicle store error: {:#}", e);
        Self::InternalError
    }
}

impl IntoResponse for VehicleApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            VehicleApiError::MissingField(field) => (
                StatusCode::BAD_REQUEST,
                "invalid_request",
                format!("Field '{}' is required", field),
            ),
            VehicleApiError::DuplicatePlate(plate) => (
                StatusCode::CONFLICT,
                "duplicate_plate",
                format!("Vehicle with plate {} is already registered", plate),
            ),
            VehicleApiError::UnknownAdministrator => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Authentication required".to_string(),
            ),
            VehicleApiError::InternalError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error".to_string(),
            ),
        };

        (status, Json(json!({ "error": error, "message": message }))).into_response()
    }
}
