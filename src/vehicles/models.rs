//! Vehicle Models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registered vehicle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vehicle {
    pub id: Uuid,
    pub plate: String, // upper-cased, unique
    pub model: String,
    pub color: String,
    pub slot_position: Option<String>,
    pub registered_at: String,
    pub registered_by: Option<Uuid>, // administrator id
}

/// Vehicle listing row with the registering administrator resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleListing {
    #[serde(flatten)]
    pub vehicle: Vehicle,
    pub registered_by_name: Option<String>,
    pub registered_by_email: Option<String>,
}

/// Vehicle registration request body
#[derive(Debug, Deserialize)]
pub struct CreateVehicleRequest {
    #[serde(alias = "placa")]
    pub plate: String,
    #[serde(alias = "modelo")]
    pub model: String,
    #[serde(alias = "cor")]
    pub color: String,
    #[serde(default, alias = "posicaoVaga")]
    pub slot_position: Option<String>,
}

impl CreateVehicleRequest {
    /// Trim fields and upper-case the plate. Returns the name of the first
    /// empty required field on failure.
    pub fn normalized(self) -> Result<Self, &'static str> {
        let plate = self.plate.trim().to_uppercase();
        let model = self.model.trim().to_string();
        let color = self.color.trim().to_string();

        if plate.is_empty() {
            return Err("plate");
        }
        if model.is_empty() {
            return Err("model");
        }
        if color.is_empty() {
            return Err("color");
        }

        Ok(Self {
            plate,
            model,
            color,
            slot_position: self
                .slot_position
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(plate: &str, model: &str, color: &str) -> CreateVehicleRequest {
        CreateVehicleRequest {
            plate: plate.to_string(),
            model: model.to_string(),
            color: color.to_string(),
            slot_position: Some("  ".to_string()),
        }
    }

    #[test]
    fn test_normalized_uppercases_plate() {
        let req = request(" abc1d23 ", " Onix ", "Prata").normalized().unwrap();
        assert_eq!(req.plate, "ABC1D23");
        assert_eq!(req.model, "Onix");
        assert_eq!(req.slot_position, None);
    }

    #[test]
    fn test_normalized_rejects_blank_fields() {
        assert_eq!(request(" ", "Onix", "Prata").normalized().unwrap_err(), "plate");
        assert_eq!(request("ABC", "", "Prata").normalized().unwrap_err(), "model");
        assert_eq!(request("ABC", "Onix", " ").normalized().unwrap_err(), "color");
    }

    #[test]
    fn test_request_accepts_portuguese_field_names() {
        let req: CreateVehicleRequest =
            serde_json::from_str(r#"{"placa":"abc1234","modelo":"Gol","cor":"Azul"}"#).unwrap();
        assert_eq!(req.plate, "abc1234");
        assert_eq!(req.model, "Gol");
        assert!(req.slot_position.is_none());
    }
}
