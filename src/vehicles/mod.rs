//! Vehicle Registry
//! Mission: Plate-unique vehicle registration and listing for authenticated administrators

pub mod api;
pub mod models;
pub mod store;

pub use api::VehicleState;
pub use store::VehicleStore;
