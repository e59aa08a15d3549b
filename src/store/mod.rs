//! Court Records Store
//! Mission: Persist cases, judges and hearings as JSON documents in SQLite
//!
//! Each collection is one table keyed by `id` holding the serialized document,
//! plus the columns that need UNIQUE enforcement or are grouped/filtered on.
//! References between collections are plain id strings with no foreign keys.
//! Row order (`rowid`) is insertion order; "newest first" listings walk it backwards.

pub mod cases;
pub mod hearings;
pub mod judges;
pub mod search;
pub mod stats;

pub use stats::{CaseStats, DashboardStats, HearingStats, JudgeStats, TypeCount};

use parking_lot::Mutex;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

const SCHEMA_SQL: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA temp_store = MEMORY;

CREATE TABLE IF NOT EXISTS cases (
    id TEXT PRIMARY KEY,
    case_number TEXT NOT NULL UNIQUE,
    case_id TEXT NOT NULL UNIQUE,
    status TEXT NOT NULL,
    case_type TEXT NOT NULL,
    doc TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS judges (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    availability TEXT NOT NULL,
    doc TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS hearings (
    id TEXT PRIMARY KEY,
    case_ref TEXT NOT NULL,
    judge_ref TEXT NOT NULL,
    hearing_ts INTEGER NOT NULL,
    doc TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_hearings_case ON hearings(case_ref);
CREATE INDEX IF NOT EXISTS idx_hearings_judge ON hearings(judge_ref);
CREATE INDEX IF NOT EXISTS idx_hearings_ts ON hearings(hearing_ts);
"#;

/// Errors raised by the document store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Validation(String),
    #[error("{field} already exists")]
    Duplicate { field: &'static str },
    #[error("{entity} not found")]
    NotFound { entity: &'static str },
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("document encoding error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("password hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        StoreError::Validation(msg.into())
    }
}

/// What happens to references when a case, judge or hearing is deleted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReferencePolicy {
    /// Leave every reference in place; reads resolve dangling ids to null.
    #[default]
    Retain,
    /// Remove dependent hearings and scrub ids from the other collections.
    Cleanup,
}

impl ReferencePolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "retain" | "none" => Some(ReferencePolicy::Retain),
            "cleanup" | "cascade" => Some(ReferencePolicy::Cleanup),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReferencePolicy::Retain => "retain",
            ReferencePolicy::Cleanup => "cleanup",
        }
    }
}

/// SQLite-backed store for the three court collections
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    policy: ReferencePolicy,
}

impl Database {
    /// Open (or create) the store at `path`
    pub fn open<P: AsRef<Path>>(path: P, policy: ReferencePolicy) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        let db = Self::from_connection(conn, policy)?;
        info!(
            "📚 Court records store opened at {} (reference policy: {})",
            path.as_ref().display(),
            policy.as_str()
        );
        Ok(db)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory(policy: ReferencePolicy) -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?, policy)
    }

    fn from_connection(conn: Connection, policy: ReferencePolicy) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            policy,
        })
    }

    pub fn policy(&self) -> ReferencePolicy {
        self.policy
    }

    /// Run `f` while holding the connection. Everything inside sees one consistent state.
    pub(crate) fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let conn = self.conn.lock();
        f(&conn)
    }

    /// Run `f` inside a transaction that commits only if `f` succeeds
    pub(crate) fn with_tx<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let conn = self.conn.lock();
        let tx = conn.unchecked_transaction()?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }
}

// ===== Document helpers shared by the collection modules =====

pub(crate) fn load_doc<T: DeserializeOwned>(
    conn: &Connection,
    table: &str,
    id: &str,
) -> Result<Option<T>, StoreError> {
    let sql = format!("SELECT doc FROM {table} WHERE id = ?1");
    let raw: Option<String> = conn
        .query_row(&sql, params![id], |row| row.get(0))
        .optional()?;
    raw.map(|doc| serde_json::from_str(&doc).map_err(StoreError::from))
        .transpose()
}

/// Load documents with an arbitrary trailing clause, e.g. `ORDER BY rowid`
pub(crate) fn load_docs<T: DeserializeOwned>(
    conn: &Connection,
    sql: &str,
    args: impl rusqlite::Params,
) -> Result<Vec<T>, StoreError> {
    let mut stmt = conn.prepare(sql)?;
    let raw = stmt
        .query_map(args, |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    raw.iter()
        .map(|doc| serde_json::from_str(doc).map_err(StoreError::from))
        .collect()
}

pub(crate) fn encode<T: Serialize>(doc: &T) -> Result<String, StoreError> {
    Ok(serde_json::to_string(doc)?)
}

/// Column named by a UNIQUE violation, e.g. `cases.case_number`
pub(crate) fn unique_violation(err: &rusqlite::Error) -> Option<&str> {
    match err {
        rusqlite::Error::SqliteFailure(e, Some(msg)) if e.code == ErrorCode::ConstraintViolation => {
            msg.strip_prefix("UNIQUE constraint failed: ")
        }
        _ => None,
    }
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Trimmed non-empty text or a validation error naming the field
pub(crate) fn required(value: Option<String>, field: &str) -> Result<String, StoreError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| StoreError::validation(format!("{field} is required")))
}

/// Empty strings from form inputs count as absent
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn parse_enum<T>(
    raw: &str,
    field: &str,
    parse: impl Fn(&str) -> Option<T>,
    allowed: &[&str],
) -> Result<T, StoreError> {
    parse(raw.trim()).ok_or_else(|| {
        StoreError::validation(format!("{field} must be one of: {}", allowed.join(", ")))
    })
}

pub(crate) fn parse_date_field(
    raw: &str,
    field: &str,
) -> Result<chrono::DateTime<chrono::Utc>, StoreError> {
    crate::models::parse_date(raw)
        .ok_or_else(|| StoreError::validation(format!("{field} must be a valid date")))
}
