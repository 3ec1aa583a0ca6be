//! Authentication Module
//! Mission: Administrator login, JWT validation, and role policies

pub mod api;
pub mod credential_store;
pub mod jwt;
pub mod login;
pub mod middleware;
pub mod models;
pub mod password;
pub mod policy;

pub use api::AuthState;
pub use credential_store::{CredentialStore, SqliteCredentialStore};
pub use jwt::JwtHandler;
pub use login::LoginFlow;
pub use middleware::{auth_middleware, current_admin, AuthError};
pub use models::{AuthenticatedAdmin, Role};
pub use password::PasswordVerifier;
pub use policy::{policy_middleware, Policy};
