//! Login Flow
//! Mission: Credential lookup -> password check -> token issuance, in one pass
//!
//! Unknown email and wrong password end in the same `InvalidCredentials`
//! outcome. A lookup miss still pays for one bcrypt verification so the two
//! cases also take comparable time.

use crate::auth::{
    credential_store::CredentialStore,
    jwt::{IssuedToken, JwtHandler},
    password::PasswordVerifier,
};
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Terminal login failures
#[derive(Debug)]
pub enum LoginError {
    InvalidCredentials,
    Internal(anyhow::Error),
}

impl fmt::Display for LoginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "Invalid email or password"),
            Self::Internal(e) => write!(f, "Internal error: {:#}", e),
        }
    }
}

impl std::error::Error for LoginError {}

/// Orchestrates a single login attempt
#[derive(Clone)]
pub struct LoginFlow {
    credentials: Arc<dyn CredentialStore>,
    verifier: Arc<PasswordVerifier>,
    jwt_handler: Arc<JwtHandler>,
}

impl LoginFlow {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        verifier: Arc<PasswordVerifier>,
        jwt_handler: Arc<JwtHandler>,
    ) -> Self {
        Self {
            credentials,
            verifier,
            jwt_handler,
        }
    }

    /// Run the flow. CPU-bound (bcrypt); call from a blocking context.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<IssuedToken, LoginError> {
        // LookupIdentity
        let admin = self.credentials.find_by_email(email).map_err(|e| {
            error!("Credential lookup failed: {:#}", e);
            LoginError::Internal(e)
        })?;

        // VerifyPassword
        let Some(admin) = admin else {
            self.verifier.verify_dummy(password);
            warn!("Failed login attempt: {}", email);
            return Err(LoginError::InvalidCredentials);
        };

        if !self.verifier.verify(password, &admin.password_hash) {
            warn!("Failed login attempt: {}", email);
            return Err(LoginError::InvalidCredentials);
        }

        // IssueToken
        let issued = self
            .jwt_handler
            .issue_token(&admin.email, admin.role)
            .map_err(|e| {
                error!("Token issuance failed: {:#}", e);
                LoginError::Internal(e)
            })?;

        info!("Login successful: {} ({})", admin.email, admin.role);

        Ok(issued)
    }
}
