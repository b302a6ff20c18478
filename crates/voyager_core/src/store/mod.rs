//! Persistence gateway for the `days` and `activities` tables.
//!
//! # Responsibility
//! - Define the record shapes stored in SQLite and the per-table store
//!   contracts (insert / update / delete / full-table read).
//! - Report duplicate keys as a typed error instead of a raw SQLite failure.
//! - Publish a change notification per table after every successful write.
//!
//! # Invariants
//! - Stores only run against connections migrated to `latest_version()`.
//! - Update and delete report rows affected; callers decide what zero means.
//! - Malformed persisted values are rejected as `InvalidData`, never masked.

use crate::db::migrations::{latest_version, schema_version};
use crate::db::DbError;
use crate::model::activity::{ActivityId, WhenType};
use chrono::{NaiveDate, NaiveTime};
use rusqlite::{Connection, ErrorCode};
use std::error::Error;
use std::fmt::{Display, Formatter};

mod activity_store;
mod columns;
mod day_store;
mod gateway;

pub use activity_store::SqliteActivityStore;
pub use day_store::SqliteDayStore;
pub use gateway::{Gateway, Table};

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by the persistence gateway.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Insert hit an existing primary key.
    Duplicate { table: &'static str, key: String },
    /// Persisted value cannot be decoded into a record.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Blocking worker running the query panicked or was cancelled.
    Worker(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Duplicate { table, key } => write!(f, "duplicate key `{key}` in {table}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::Worker(message) => write!(f, "storage worker failed: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persisted shape of a day. Activities live in their own table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayRecord {
    /// Primary key, stored as ISO `YYYY-MM-DD`.
    pub date: NaiveDate,
    /// Stored comma-joined; `None` is SQL `NULL`.
    pub locations: Option<Vec<String>>,
    pub image_uri: Option<String>,
}

/// Persisted shape of an activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRecord {
    /// Primary key.
    pub id: ActivityId,
    /// Owning day, stored as ISO `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub location: Option<String>,
    /// Stored by enum name.
    pub when_type: WhenType,
    /// Stored as ISO `HH:MM:SS`.
    pub specific: Option<NaiveTime>,
    pub what: String,
}

/// Store contract for the `days` table.
pub trait DayStore {
    /// Reads every day ordered by date.
    fn all_days(&self) -> StoreResult<Vec<DayRecord>>;
    /// Inserts one day; an existing date yields `StoreError::Duplicate`.
    fn insert_day(&self, record: &DayRecord) -> StoreResult<usize>;
    /// Updates the day with the same date; returns rows affected.
    fn update_day(&self, record: &DayRecord) -> StoreResult<usize>;
    /// Deletes the day with the same date; returns rows affected.
    fn delete_day(&self, record: &DayRecord) -> StoreResult<usize>;
}

/// Store contract for the `activities` table.
pub trait ActivityStore {
    /// Reads every activity ordered by date, then id.
    fn all_activities(&self) -> StoreResult<Vec<ActivityRecord>>;
    /// Inserts one activity; an existing id yields `StoreError::Duplicate`.
    fn insert_activity(&self, record: &ActivityRecord) -> StoreResult<usize>;
    /// Updates the activity with the same id; returns rows affected.
    fn update_activity(&self, record: &ActivityRecord) -> StoreResult<usize>;
    /// Deletes the activity with the same id; returns rows affected.
    fn delete_activity(&self, record: &ActivityRecord) -> StoreResult<usize>;
    /// Deletes every activity dated `date`; returns rows affected.
    fn delete_activities_for_date(&self, date: NaiveDate) -> StoreResult<usize>;
}

/// Maps a primary-key conflict on insert to `StoreError::Duplicate`.
fn map_insert_error(err: rusqlite::Error, table: &'static str, key: String) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
        {
            StoreError::Duplicate { table, key }
        }
        _ => err.into(),
    }
}

/// Verifies that `conn` carries the itinerary schema.
pub fn ensure_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version = schema_version(conn)?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in ["days", "activities"] {
        if !table_exists(conn, table)? {
            return Err(StoreError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
