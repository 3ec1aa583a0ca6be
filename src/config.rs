//! Process Configuration
//!
//! Parsed once at startup from CLI flags with environment fallbacks, then
//! validated into an immutable [`AppConfig`] that is passed explicitly to the
//! components that need it. Any missing or unusable value is fatal.

use crate::auth::password::{MAX_BCRYPT_COST, MIN_BCRYPT_COST};
use clap::Parser;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::net::SocketAddr;

/// Minimum signing secret length for HS256 (256 bits)
pub const MIN_SECRET_BYTES: usize = 32;

#[derive(Parser, Debug)]
#[command(name = "nexopark")]
#[command(about = "NexoPark API - administrator authentication and vehicle registry")]
pub struct Cli {
    /// Database connection string (SQLite path, sqlite:// URL, or :memory:)
    #[arg(long, env = "NEXOPARK_CONNECTION_STRING")]
    pub database_url: Option<String>,

    /// Token signing secret (at least 32 bytes)
    #[arg(long, env = "NEXOPARK_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Token issuer name
    #[arg(long, env = "NEXOPARK_JWT_ISSUER")]
    pub jwt_issuer: Option<String>,

    /// Address the HTTP server binds to
    #[arg(long, env = "NEXOPARK_LISTEN_ADDR", default_value = "0.0.0.0:3000")]
    pub listen_addr: SocketAddr,

    /// bcrypt work factor for password hashing
    #[arg(long, env = "NEXOPARK_BCRYPT_COST", default_value_t = bcrypt::DEFAULT_COST)]
    pub bcrypt_cost: u32,

    /// Seed the test administrator when the store is empty
    #[arg(long, env = "NEXOPARK_SEED_TEST_ADMIN")]
    pub seed_test_admin: bool,
}

/// Validated, immutable process configuration
#[derive(Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: SecretString,
    pub jwt_issuer: String,
    pub listen_addr: SocketAddr,
    pub bcrypt_cost: u32,
    pub seed_test_admin: bool,
}

/// Configuration errors are fatal at startup
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    MissingDatabaseUrl,
    MissingJwtSecret,
    WeakJwtSecret(usize),
    MissingJwtIssuer,
    InvalidBcryptCost(u32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDatabaseUrl => {
                write!(f, "NEXOPARK_CONNECTION_STRING is not configured")
            }
            Self::MissingJwtSecret => write!(f, "NEXOPARK_JWT_SECRET is not configured"),
            Self::WeakJwtSecret(len) => write!(
                f,
                "NEXOPARK_JWT_SECRET is {} bytes; at least {} are required",
                len, MIN_SECRET_BYTES
            ),
            Self::MissingJwtIssuer => write!(f, "NEXOPARK_JWT_ISSUER is not configured"),
            Self::InvalidBcryptCost(cost) => write!(
                f,
                "bcrypt cost {} is outside {}..={}",
                cost,
                MIN_BCRYPT_COST, MAX_BCRYPT_COST
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl TryFrom<Cli> for AppConfig {
    type Error = ConfigError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let database_url = non_empty(cli.database_url).ok_or(ConfigError::MissingDatabaseUrl)?;

        // The secret is used byte-for-byte; only reject it when blank.
        let secret = cli
            .jwt_secret
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingJwtSecret)?;
        if secret.len() < MIN_SECRET_BYTES {
            return Err(ConfigError::WeakJwtSecret(secret.len()));
        }

        let jwt_issuer = non_empty(cli.jwt_issuer).ok_or(ConfigError::MissingJwtIssuer)?;

        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cli.bcrypt_cost) {
            return Err(ConfigError::InvalidBcryptCost(cli.bcrypt_cost));
        }

        Ok(Self {
            database_url,
            jwt_secret: SecretString::from(secret),
            jwt_issuer,
            listen_addr: cli.listen_addr,
            bcrypt_cost: cli.bcrypt_cost,
            seed_test_admin: cli.seed_test_admin,
        })
    }
}

impl AppConfig {
    /// Resolve the connection string to a SQLite path.
    pub fn sqlite_path(&self) -> &str {
        let url = self.database_url.as_str();
        url.strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .unwrap_or(url)
    }

    pub fn secret_len(&self) -> usize {
        self.jwt_secret.expose_secret().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn cli(database_url: Option<&str>, secret: Option<&str>, issuer: Option<&str>) -> Cli {
        Cli {
            database_url: database_url.map(str::to_string),
            jwt_secret: secret.map(str::to_string),
            jwt_issuer: issuer.map(str::to_string),
            listen_addr: "127.0.0.1:3000".parse().unwrap(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            seed_test_admin: false,
        }
    }

    #[test]
    fn test_valid_config() {
        let config =
            AppConfig::try_from(cli(Some("nexopark.db"), Some(SECRET), Some("NexoParkAPI")))
                .unwrap();
        assert_eq!(config.database_url, "nexopark.db");
        assert_eq!(config.jwt_issuer, "NexoParkAPI");
        assert_eq!(config.secret_len(), 32);
    }

    #[test]
    fn test_missing_values_are_fatal() {
        assert_eq!(
            AppConfig::try_from(cli(None, Some(SECRET), Some("iss"))).unwrap_err(),
            ConfigError::MissingDatabaseUrl
        );
        assert_eq!(
            AppConfig::try_from(cli(Some("db"), None, Some("iss"))).unwrap_err(),
            ConfigError::MissingJwtSecret
        );
        assert_eq!(
            AppConfig::try_from(cli(Some("db"), Some("   "), Some("iss"))).unwrap_err(),
            ConfigError::MissingJwtSecret
        );
        assert_eq!(
            AppConfig::try_from(cli(Some("db"), Some(SECRET), Some(""))).unwrap_err(),
            ConfigError::MissingJwtIssuer
        );
    }

    #[test]
    fn test_short_secret_rejected() {
        assert_eq!(
            AppConfig::try_from(cli(Some("db"), Some("short"), Some("iss"))).unwrap_err(),
            ConfigError::WeakJwtSecret(5)
        );
    }

    #[test]
    fn test_bcrypt_cost_bounds() {
        let mut c = cli(Some("db"), Some(SECRET), Some("iss"));
        c.bcrypt_cost = 2;
        assert_eq!(
            AppConfig::try_from(c).unwrap_err(),
            ConfigError::InvalidBcryptCost(2)
        );
    }

    #[test]
    fn test_secret_not_in_debug_output() {
        let config =
            AppConfig::try_from(cli(Some("db"), Some(SECRET), Some("NexoParkAPI"))).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains(SECRET));
    }

    #[test]
    fn test_sqlite_path_resolution() {
        let mut config =
            AppConfig::try_from(cli(Some("sqlite://data/nexopark.db"), Some(SECRET), Some("i")))
                .unwrap();
        assert_eq!(config.sqlite_path(), "data/nexopark.db");

        config.database_url = ":memory:".to_string();
        assert_eq!(config.sqlite_path(), ":memory:");
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "nexopark",
            "--database-url",
            "nexopark.db",
            "--jwt-secret",
            SECRET,
            "--jwt-issuer",
            "NexoParkAPI",
            "--seed-test-admin",
        ])
        .unwrap();
        assert!(cli.seed_test_admin);
        let config = AppConfig::try_from(cli).unwrap();
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
    }
}
