//! JWT Token Handler
//! Mission: Issue and validate HS256 tokens carrying identity and role

use crate::auth::models::{Claims, Role};
use crate::config::AppConfig;
use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use tracing::debug;

/// Token lifetime. There is no revocation; expiry is the only invalidation path.
pub const TOKEN_TTL_HOURS: i64 = 2;

/// A freshly signed token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64, // seconds until expiration
}

/// JWT Handler for token operations
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl: Duration,
    validation: Validation,
}

impl JwtHandler {
    /// Create a handler from a raw secret and issuer name
    pub fn new(secret: &[u8], issuer: impl Into<String>) -> Self {
        let issuer = issuer.into();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.validate_aud = false; // single-audience system
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer,
            ttl: Duration::hours(TOKEN_TTL_HOURS),
            validation,
        }
    }

    /// Create a handler from validated process configuration
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.jwt_secret.expose_secret().as_bytes(),
            config.jwt_issuer.clone(),
        )
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Generate a signed token for an administrator
    pub fn issue_token(&self, email: &str, role: Role) -> Result<IssuedToken> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(self.ttl)
            .context("Invalid timestamp")?;

        let claims = Claims {
            sub: email.to_string(),
            role,
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        };

        debug!(
            "Generating JWT for {} ({}), expires in {}h",
            email,
            role,
            self.ttl.num_hours()
        );

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("Failed to generate JWT")?;

        Ok(IssuedToken {
            token,
            expires_in: self.ttl.num_seconds(),
        })
    }

    /// Validate signature, issuer, and expiry, then return the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let decoded = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .context("Invalid or expired token")?;

        debug!("Validated JWT for {}", decoded.claims.sub);

        Ok(decoded.claims)
    }
}
