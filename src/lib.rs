//! NexoPark Backend Library
//!
//! Administrator authentication (bcrypt + HS256 JWT), role policies, and the
//! vehicle registry they gate. The binary in `main.rs` wires these together.

pub mod api;
pub mod auth;
pub mod config;
pub mod middleware;
pub mod vehicles;
