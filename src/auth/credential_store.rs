//! Credential Storage
//! Mission: Hold administrator records for login lookups, backed by SQLite

use crate::auth::models::{normalize_email, Administrator, Role};
use crate::auth::password::PasswordVerifier;
use anyhow::{bail, Context, Result};
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

pub const TEST_ADMIN_NAME: &str = "Usuario Teste";
pub const TEST_ADMIN_EMAIL: &str = "test@nexopark.com";
pub const TEST_ADMIN_PASSWORD: &str = "test456";

/// Read access to administrator records.
///
/// Lookups take an email in any case; implementations normalize it the same
/// way provisioning does.
pub trait CredentialStore: Send + Sync {
    fn find_by_email(&self, email: &str) -> Result<Option<Administrator>>;
}

/// Administrator storage with SQLite backend
pub struct SqliteCredentialStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCredentialStore {
    /// Open (or create) the store at the given path and initialize the schema
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path).context("Failed to open credential database")?;
        Self::from_connection(conn)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_db()?;
        Ok(store)
    }

    /// Shared handle to the underlying connection, for stores that join
    /// against administrators.
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }

    fn init_db(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS administrators (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_administrators_role ON administrators(role);",
        )
        .context("Failed to initialize administrators table")?;

        Ok(())
    }

    /// Insert the test administrator when no administrator exists yet
    pub fn seed_test_admin(&self, verifier: &PasswordVerifier) -> Result<Option<Administrator>> {
        if self.count()? > 0 {
            return Ok(None);
        }

        let password_hash = verifier.hash(TEST_ADMIN_PASSWORD)?;
        let admin = self.provision(TEST_ADMIN_NAME, TEST_ADMIN_EMAIL, &password_hash, Role::Editor)?;

        warn!(
            "Test administrator seeded ({}); CHANGE OR REMOVE IT IN PRODUCTION",
            admin.email
        );

        Ok(Some(admin))
    }

    /// Provision an administrator from an already computed password hash
    pub fn provision(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<Administrator> {
        let email = normalize_email(email);
        if email.is_empty() {
            bail!("Administrator email must not be empty");
        }

        let admin = Administrator {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            email,
            password_hash: password_hash.to_string(),
            role,
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = self.conn.lock();

        let exists = conn
            .query_row(
                "SELECT 1 FROM administrators WHERE email = ?1",
                params![admin.email],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if exists {
            bail!("Administrator {} already exists", admin.email);
        }

        conn.execute(
            "INSERT INTO administrators (id, name, email, password_hash, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                admin.id.to_string(),
                admin.name,
                admin.email,
                admin.password_hash,
                admin.role.as_str(),
                admin.created_at,
            ],
        )
        .context("Failed to insert administrator")?;

        info!("Provisioned administrator: {} ({})", admin.email, admin.role);

        Ok(admin)
    }

    pub fn count(&self) -> Result<i64> {
        let conn = self.conn.lock();
        let count = conn
            .query_row("SELECT COUNT(*) FROM administrators", [], |row| row.get(0))
            .context("Failed to count administrators")?;
        Ok(count)
    }
}

impl CredentialStore for SqliteCredentialStore {
    fn find_by_email(&self, email: &str) -> Result<Option<Administrator>> {
        let conn = self.conn.lock();

        let row = conn
            .query_row(
                "SELECT id, name, email, password_hash, role, created_at
                 FROM administrators WHERE email = ?1",
                params![normalize_email(email)],
                raw_admin,
            )
            .optional()
            .context("Failed to query administrator")?;

        row.map(RawAdmin::into_admin).transpose()
    }
}

struct RawAdmin {
    id: String,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: String,
}

fn raw_admin(row: &Row<'_>) -> rusqlite::Result<RawAdmin> {
    Ok(RawAdmin {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role: row.get(4)?,
        created_at: row.get(5)?,
    })
}

impl RawAdmin {
    fn into_admin(self) -> Result<Administrator> {
        let id = Uuid::parse_str(&self.id)
            .with_context(|| format!("Corrupt administrator id for {}", self.email))?;
        let Some(role) = Role::parse(&self.role) else {
            bail!("Unknown role '{}' for administrator {}", self.role, self.email);
        };

        Ok(Administrator {
            id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            role,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::MIN_BCRYPT_COST;
    use tempfile::NamedTempFile;

    fn verifier() -> PasswordVerifier {
        PasswordVerifier::with_cost(MIN_BCRYPT_COST).unwrap()
    }

    #[test]
    fn test_seed_test_admin_once() {
        let store = SqliteCredentialStore::in_memory().unwrap();
        let v = verifier();

        let seeded = store.seed_test_admin(&v).unwrap().unwrap();
        assert_eq!(seeded.email, TEST_ADMIN_EMAIL);
        assert_eq!(seeded.role, Role::Editor);
        assert!(v.verify(TEST_ADMIN_PASSWORD, &seeded.password_hash));

        assert!(store.seed_test_admin(&v).unwrap().is_none());
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_find_by_email_normalizes() {
        let store = SqliteCredentialStore::in_memory().unwrap();
        store
            .provision("Ana", "Ana@NexoPark.com", "$2b$04$hash", Role::Admin)
            .unwrap();

        let found = store.find_by_email("  ANA@nexopark.COM").unwrap().unwrap();
        assert_eq!(found.email, "ana@nexopark.com");
        assert_eq!(found.name, "Ana");
        assert_eq!(found.role, Role::Admin);

        assert!(store.find_by_email("nobody@nexopark.com").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let store = SqliteCredentialStore::in_memory().unwrap();
        store
            .provision("A", "dup@nexopark.com", "h", Role::Admin)
            .unwrap();

        let result = store.provision("B", "DUP@nexopark.com", "h", Role::Editor);
        assert!(result.is_err());
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_empty_email_rejected() {
        let store = SqliteCredentialStore::in_memory().unwrap();
        assert!(store.provision("A", "   ", "h", Role::Admin).is_err());
    }

    #[test]
    fn test_unknown_role_is_an_error() {
        let store = SqliteCredentialStore::in_memory().unwrap();
        {
            let conn = store.connection();
            let conn = conn.lock();
            conn.execute(
                "INSERT INTO administrators (id, name, email, password_hash, role, created_at)
                 VALUES (?1, 'X', 'x@nexopark.com', 'h', 'Superuser', '2025-01-01T00:00:00Z')",
                params![Uuid::new_v4().to_string()],
            )
            .unwrap();
        }

        assert!(store.find_by_email("x@nexopark.com").is_err());
    }

    #[test]
    fn test_persists_across_reopen() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();

        {
            let store = SqliteCredentialStore::new(&path).unwrap();
            store
                .provision("Ana", "ana@nexopark.com", "h", Role::Admin)
                .unwrap();
        }

        let reopened = SqliteCredentialStore::new(&path).unwrap();
        assert!(reopened.find_by_email("ana@nexopark.com").unwrap().is_some());
    }
}
