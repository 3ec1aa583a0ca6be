//! Vehicle Storage
//! Mission: Persist registered vehicles alongside the administrators who registered them

use crate::vehicles::models::{Vehicle, VehicleListing};
use anyhow::{Context, Result};
use parking_lot::Mutex;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Result of an insert attempt
#[derive(Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    DuplicatePlate,
}

/// Vehicle storage sharing the credential store's SQLite connection
pub struct VehicleStore {
    conn: Arc<Mutex<Connection>>,
}

impl VehicleStore {
    /// Expects the `administrators` table to exist on the same connection
    pub fn new(conn: Arc<Mutex<Connection>>) -> Result<Self> {
        let store = Self { conn };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS vehicles (
                id TEXT PRIMARY KEY,
                plate TEXT UNIQUE NOT NULL,
                model TEXT NOT NULL,
                color TEXT NOT NULL,
                slot_position TEXT,
                registered_at TEXT NOT NULL,
                administrator_id TEXT REFERENCES administrators(id) ON DELETE RESTRICT
            );
            CREATE INDEX IF NOT EXISTS idx_vehicles_registered_at ON vehicles(registered_at);",
        )
        .context("Failed to initialize vehicles table")?;

        Ok(())
    }

    pub fn find_by_plate(&self, plate: &str) -> Result<Option<Vehicle>> {
        let conn = self.conn.lock();

        conn.query_row(
            "SELECT id, plate, model, color, slot_position, registered_at, administrator_id
             FROM vehicles WHERE plate = ?1",
            params![plate],
            vehicle_from_row,
        )
        .optional()
        .context("Failed to query vehicle")
    }

    /// Insert a vehicle; a plate collision is reported, not raised
    pub fn insert(&self, vehicle: &Vehicle) -> Result<InsertOutcome> {
        let conn = self.conn.lock();

        let result = conn.execute(
            "INSERT INTO vehicles
                (id, plate, model, color, slot_position, registered_at, administrator_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                vehicle.id.to_string(),
                vehicle.plate,
                vehicle.model,
                vehicle.color,
                vehicle.slot_position,
                vehicle.registered_at,
                vehicle.registered_by.map(|id| id.to_string()),
            ],
        );

        match result {
            Ok(_) => {
                info!("Registered vehicle {}", vehicle.plate);
                Ok(InsertOutcome::Inserted)
            }
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Ok(InsertOutcome::DuplicatePlate)
            }
            Err(e) => Err(e).context("Failed to insert vehicle"),
        }
    }

    /// All vehicles, newest registration first
    pub fn list_all(&self) -> Result<Vec<VehicleListing>> {
        let conn = self.conn.lock();

        let mut stmt = conn.prepare(
            "SELECT v.id, v.plate, v.model, v.color, v.slot_position, v.registered_at,
                    v.administrator_id, a.name, a.email
             FROM vehicles v
             LEFT JOIN administrators a ON a.id = v.administrator_id
             ORDER BY v.registered_at DESC",
        )?;

        let listings = stmt
            .query_map([], |row| {
                Ok(VehicleListing {
                    vehicle: vehicle_from_row(row)?,
                    registered_by_name: row.get(7)?,
                    registered_by_email: row.get(8)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list vehicles")?;

        Ok(listings)
    }
}

fn parse_uuid(idx: usize, raw: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn vehicle_from_row(row: &Row<'_>) -> rusqlite::Result<Vehicle> {
    let id: String = row.get(0)?;
    let admin_id: Option<String> = row.get(6)?;

    Ok(Vehicle {
        id: parse_uuid(0, &id)?,
        plate: row.get(1)?,
        model: row.get(2)?,
        color: row.get(3)?,
        slot_position: row.get(4)?,
        registered_at: row.get(5)?,
        registered_by: admin_id.as_deref().map(|raw| parse_uuid(6, raw)).transpose()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Role, SqliteCredentialStore};
    use chrono::{Duration, Utc};

    fn stores() -> (SqliteCredentialStore, VehicleStore) {
        let credentials = SqliteCredentialStore::in_memory().unwrap();
        let vehicles = VehicleStore::new(credentials.connection()).unwrap();
        (credentials, vehicles)
    }

    fn vehicle(plate: &str, registered_by: Option<Uuid>, age_minutes: i64) -> Vehicle {
        Vehicle {
            id: Uuid::new_v4(),
            plate: plate.to_string(),
            model: "Onix".to_string(),
            color: "Prata".to_string(),
            slot_position: None,
            registered_at: (Utc::now() - Duration::minutes(age_minutes)).to_rfc3339(),
            registered_by,
        }
    }

    #[test]
    fn test_insert_and_find() {
        let (_, store) = stores();
        let v = vehicle("ABC1D23", None, 0);

        assert_eq!(store.insert(&v).unwrap(), InsertOutcome::Inserted);
        assert_eq!(store.find_by_plate("ABC1D23").unwrap(), Some(v));
        assert!(store.find_by_plate("ZZZ9Z99").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_plate_reported() {
        let (_, store) = stores();
        store.insert(&vehicle("ABC1D23", None, 0)).unwrap();

        let outcome = store.insert(&vehicle("ABC1D23", None, 0)).unwrap();
        assert_eq!(outcome, InsertOutcome::DuplicatePlate);
    }

    #[test]
    fn test_list_newest_first_with_registrar() {
        let (credentials, store) = stores();
        let admin = credentials
            .provision("Ana", "ana@nexopark.com", "h", Role::Admin)
            .unwrap();

        store.insert(&vehicle("OLD0001", Some(admin.id), 60)).unwrap();
        store.insert(&vehicle("NEW0001", Some(admin.id), 1)).unwrap();
        store.insert(&vehicle("MID0001", None, 30)).unwrap();

        let listings = store.list_all().unwrap();
        let plates: Vec<&str> = listings.iter().map(|l| l.vehicle.plate.as_str()).collect();
        assert_eq!(plates, vec!["NEW0001", "MID0001", "OLD0001"]);

        assert_eq!(listings[0].registered_by_email.as_deref(), Some("ana@nexopark.com"));
        assert_eq!(listings[0].registered_by_name.as_deref(), Some("Ana"));
        assert!(listings[1].registered_by_email.is_none());
    }
}
