//! Account Storage
//! Mission: Securely store administrator accounts with SQLite

use crate::auth::models::Account;
use crate::store::{unique_violation, StoreError};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use tracing::info;
use uuid::Uuid;

const ACCOUNTS_SQL: &str = "CREATE TABLE IF NOT EXISTS accounts (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT UNIQUE NOT NULL,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL,
    created_at TEXT NOT NULL
)";

const SELECT_ACCOUNT: &str = "SELECT id, name, email, password_hash, role, created_at FROM accounts";

/// Account storage with SQLite backend
pub struct AccountStore {
    conn: Mutex<Connection>,
    hash_cost: u32,
}

impl AccountStore {
    /// Open the store at `db_path` and make sure the schema exists
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self, StoreError> {
        Self::init(Connection::open(db_path)?)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(ACCOUNTS_SQL, [])?;
        Ok(Self {
            conn: Mutex::new(conn),
            hash_cost: DEFAULT_COST,
        })
    }

    /// Override the bcrypt cost (tests use the minimum to stay fast)
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    /// Get account by email (case-insensitive)
    pub fn get_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let conn = self.conn.lock();
        let sql = format!("{SELECT_ACCOUNT} WHERE email = ?1");
        let raw = conn
            .query_row(&sql, params![normalize_email(email)], read_row)
            .optional()?;
        raw.map(RawAccount::into_account).transpose()
    }

    pub fn get_by_id(&self, id: &Uuid) -> Result<Option<Account>, StoreError> {
        let conn = self.conn.lock();
        let sql = format!("{SELECT_ACCOUNT} WHERE id = ?1");
        let raw = conn
            .query_row(&sql, params![id.to_string()], read_row)
            .optional()?;
        raw.map(RawAccount::into_account).transpose()
    }

    /// Create a new account. Duplicate emails fail with `Duplicate { field: "email" }`.
    pub fn create_account(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: &str,
    ) -> Result<Account, StoreError> {
        let password_hash = hash(password, self.hash_cost)?;

        let account = Account {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            email: normalize_email(email),
            password_hash,
            role: role.trim().to_lowercase(),
            created_at: Utc::now(),
        };

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO accounts (id, name, email, password_hash, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                account.id.to_string(),
                account.name,
                account.email,
                account.password_hash,
                account.role,
                account.created_at.to_rfc3339(),
            ],
        )
        .map_err(|err| match unique_violation(&err) {
            Some("accounts.email") => StoreError::Duplicate { field: "email" },
            _ => err.into(),
        })?;

        info!("✅ Created account: {} ({})", account.email, account.role);

        Ok(account)
    }

    /// Compare a candidate secret against the stored hash
    pub fn verify_password(&self, account: &Account, password: &str) -> Result<bool, StoreError> {
        Ok(verify(password, &account.password_hash)?)
    }

    /// Direct administrative role change; not exposed over HTTP
    pub fn update_role(&self, id: &Uuid, role: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE accounts SET role = ?1 WHERE id = ?2",
            params![role.trim().to_lowercase(), id.to_string()],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound { entity: "Account" });
        }
        info!("🔑 Role for account {} set to {}", id, role);
        Ok(())
    }

    pub fn update_password(&self, id: &Uuid, password: &str) -> Result<(), StoreError> {
        let password_hash = hash(password, self.hash_cost)?;
        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE accounts SET password_hash = ?1 WHERE id = ?2",
            params![password_hash, id.to_string()],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound { entity: "Account" });
        }
        info!("🔑 Password reset for account {}", id);
        Ok(())
    }

    pub fn count(&self) -> Result<u64, StoreError> {
        let conn = self.conn.lock();
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM accounts", [], |row| row.get(0))?;
        Ok(n as u64)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Row as stored, before the id and timestamp are parsed
struct RawAccount {
    id: String,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: String,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<RawAccount> {
    Ok(RawAccount {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role: row.get(4)?,
        created_at: row.get(5)?,
    })
}

impl RawAccount {
    fn into_account(self) -> Result<Account, StoreError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| StoreError::Corrupt(format!("account id {}: {e}", self.id)))?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| StoreError::Corrupt(format!("account {} created_at: {e}", self.id)))?
            .with_timezone(&Utc);
        Ok(Account {
            id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            role: self.role,
            created_at,
        })
    }
}
