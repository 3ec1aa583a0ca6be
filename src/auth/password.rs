//! Password Verifier
//! Mission: Check plaintext passwords against stored bcrypt hashes

use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use tracing::error;

/// bcrypt accepts work factors in this range
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

/// Verifies passwords with bcrypt at a fixed work factor.
///
/// Holds a dummy hash computed at the same cost so a lookup miss can burn the
/// same amount of CPU as a real mismatch.
pub struct PasswordVerifier {
    cost: u32,
    dummy_hash: String,
}

impl PasswordVerifier {
    /// Create a verifier at bcrypt's default cost (12)
    pub fn new() -> Result<Self> {
        Self::with_cost(DEFAULT_COST)
    }

    pub fn with_cost(cost: u32) -> Result<Self> {
        let dummy_hash =
            hash("nexopark-unknown-identity", cost).context("Failed to compute dummy hash")?;
        Ok(Self { cost, dummy_hash })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext password for provisioning
    pub fn hash(&self, plaintext: &str) -> Result<String> {
        hash(plaintext, self.cost).context("Failed to hash password")
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// A malformed stored hash never matches.
    pub fn verify(&self, plaintext: &str, stored_hash: &str) -> bool {
        match verify(plaintext, stored_hash) {
            Ok(valid) => valid,
            Err(e) => {
                error!("Stored password hash could not be parsed: {}", e);
                false
            }
        }
    }

    /// Run a verification that always fails, for unknown identities.
    pub fn verify_dummy(&self, plaintext: &str) -> bool {
        let _ = verify(plaintext, &self.dummy_hash);
        false
    }
}
