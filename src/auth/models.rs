//! Authentication Models
//! Mission: Define administrator, role, and token claim structures

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Administrator account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Administrator {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub role: Role,
    pub created_at: String,
}

/// Administrator roles for RBAC
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,  // Registers vehicles and everything Editor can do
    Editor, // Lists vehicles
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Editor => "Editor",
        }
    }

    /// Parse a stored role name. Matching is case-insensitive so rows written
    /// by other tooling still resolve.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "editor" => Some(Role::Editor),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT Claims payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // administrator email
    pub role: Role,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// Identity attached to a request once its bearer token has been validated
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AuthenticatedAdmin {
    pub email: String,
    pub role: Role,
}

impl From<Claims> for AuthenticatedAdmin {
    fn from(claims: Claims) -> Self {
        Self {
            email: claims.sub,
            role: claims.role,
        }
    }
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    #[serde(alias = "senha")]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64, // seconds until expiration
}

/// Lower-case and trim an email so provisioning and lookup agree on the key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        let admin = Role::Admin;
        let json = serde_json::to_string(&admin).unwrap();
        assert_eq!(json, r#""Admin""#);

        let editor: Role = serde_json::from_str(r#""Editor""#).unwrap();
        assert_eq!(editor, Role::Editor);
    }

    #[test]
    fn test_role_string_conversion() {
        assert_eq!(Role::Admin.as_str(), "Admin");
        assert_eq!(Role::Editor.to_string(), "Editor");

        assert_eq!(Role::parse("Admin"), Some(Role::Admin));
        assert_eq!(Role::parse("EDITOR"), Some(Role::Editor));
        assert_eq!(Role::parse("viewer"), None);
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let admin = Administrator {
            id: Uuid::new_v4(),
            name: "Usuario Teste".to_string(),
            email: "test@nexopark.com".to_string(),
            password_hash: "$2b$12$secret".to_string(),
            role: Role::Editor,
            created_at: "2025-10-02T02:16:43Z".to_string(),
        };

        let json = serde_json::to_string(&admin).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("$2b$12$secret"));
    }

    #[test]
    fn test_login_request_accepts_senha_alias() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"email":"a@b.com","senha":"test456"}"#).unwrap();
        assert_eq!(req.password, "test456");

        let req: LoginRequest =
            serde_json::from_str(r#"{"email":"a@b.com","password":"test456"}"#).unwrap();
        assert_eq!(req.password, "test456");
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Test@NexoPark.com "), "test@nexopark.com");
    }
}
