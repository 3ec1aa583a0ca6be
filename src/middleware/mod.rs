//! Middleware for observability.
//!
//! Authentication and policy middleware live in `crate::auth`.

pub mod logging;

pub use logging::request_logging;
