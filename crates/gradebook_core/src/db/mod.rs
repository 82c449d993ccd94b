//! SQLite storage bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure the single grade database connection.
//! - Bring legacy and fresh databases to the latest schema.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - No grade data is read or written before migrations succeed.
//! - Connections are owned by the caller; core keeps no global handle.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

/// Tables every migrated grade database must contain.
pub const GRADE_TABLES: [&str; 4] = ["Fach", "Zeitraum", "Note", "ZeitraumHatNote"];

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "grade database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Reads the schema version recorded in `PRAGMA user_version`.
pub fn schema_version(conn: &rusqlite::Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

/// Counts rows in one of the known grade tables.
///
/// Returns `Ok(None)` for names outside [`GRADE_TABLES`] so callers cannot
/// smuggle arbitrary SQL through the table name.
pub fn table_row_count(conn: &rusqlite::Connection, table: &str) -> DbResult<Option<i64>> {
    if !GRADE_TABLES.contains(&table) {
        return Ok(None);
    }
    let count = conn.query_row(&format!("SELECT COUNT(*) FROM \"{table}\";"), [], |row| {
        row.get::<_, i64>(0)
    })?;
    Ok(Some(count))
}
