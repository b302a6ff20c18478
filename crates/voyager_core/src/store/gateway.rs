//! Shared, async-facing handle over one itinerary connection.
//!
//! # Responsibility
//! - Run store work on tokio's blocking pool so async callers never block.
//! - Serialize access to the single SQLite connection.
//! - Publish a monotonically increasing version per table after writes.
//!
//! # Invariants
//! - A table's version only moves after a write touching it succeeded.
//! - Failed writes never notify observers.

use super::{
    ensure_connection_ready, ActivityRecord, ActivityStore, DayRecord, DayStore,
    SqliteActivityStore, SqliteDayStore, StoreError, StoreResult,
};
use crate::db::{open_db, open_db_in_memory};
use log::{debug, error};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

/// Observable tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Days,
    Activities,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Self::Days => "days",
            Self::Activities => "activities",
        }
    }
}

struct GatewayInner {
    conn: Mutex<Connection>,
    days_version: watch::Sender<u64>,
    activities_version: watch::Sender<u64>,
}

impl GatewayInner {
    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A panic inside a previous closure leaves the connection usable;
        // SQLite rolls back any transaction that was left open.
        self.conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn version(&self, table: Table) -> &watch::Sender<u64> {
        match table {
            Table::Days => &self.days_version,
            Table::Activities => &self.activities_version,
        }
    }
}

/// Cloneable gateway; clones share the connection and notifications.
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<GatewayInner>,
}

impl Gateway {
    /// Wraps a migrated connection.
    pub fn new(conn: Connection) -> StoreResult<Self> {
        ensure_connection_ready(&conn)?;
        let (days_version, _) = watch::channel(0);
        let (activities_version, _) = watch::channel(0);
        Ok(Self {
            inner: Arc::new(GatewayInner {
                conn: Mutex::new(conn),
                days_version,
                activities_version,
            }),
        })
    }

    /// Opens the database file at `path` and wraps it.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::new(open_db(path)?)
    }

    /// Opens a private in-memory database and wraps it.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::new(open_db_in_memory()?)
    }

    /// Subscribes to change notifications for `table`.
    ///
    /// The receiver starts with the current version marked as seen.
    pub fn subscribe(&self, table: Table) -> watch::Receiver<u64> {
        self.inner.version(table).subscribe()
    }

    /// Number of live change subscriptions on `table`.
    pub fn listener_count(&self, table: Table) -> usize {
        self.inner.version(table).receiver_count()
    }

    /// Current change version of `table`.
    pub fn version(&self, table: Table) -> u64 {
        *self.inner.version(table).borrow()
    }

    /// Runs a read-only closure on the blocking pool.
    pub async fn read<T, E, F>(&self, f: F) -> Result<T, E>
    where
        T: Send + 'static,
        E: From<StoreError> + Send + 'static,
        F: FnOnce(&Connection) -> Result<T, E> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        run_blocking(move || {
            let conn = inner.lock();
            f(&conn)
        })
        .await
    }

    /// Runs a mutating closure on the blocking pool, then notifies `touched`
    /// tables when it returned `Ok`.
    pub async fn write<T, E, F>(&self, touched: &[Table], f: F) -> Result<T, E>
    where
        T: Send + 'static,
        E: From<StoreError> + Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, E> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        let result = run_blocking(move || {
            let mut conn = inner.lock();
            f(&mut conn)
        })
        .await;

        if result.is_ok() {
            for table in touched {
                self.inner.version(*table).send_modify(|version| *version += 1);
                debug!(
                    "event=table_changed module=store table={} version={}",
                    table.name(),
                    self.version(*table)
                );
            }
        }
        result
    }

    /// Reads the whole `days` table.
    pub async fn all_days(&self) -> StoreResult<Vec<DayRecord>> {
        self.read(|conn| SqliteDayStore::new(conn).all_days()).await
    }

    /// Reads the whole `activities` table.
    pub async fn all_activities(&self) -> StoreResult<Vec<ActivityRecord>> {
        self.read(|conn| SqliteActivityStore::new(conn).all_activities())
            .await
    }
}

async fn run_blocking<T, E, F>(f: F) -> Result<T, E>
where
    T: Send + 'static,
    E: From<StoreError> + Send + 'static,
    F: FnOnce() -> Result<T, E> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result,
        Err(join_err) => {
            error!("event=store_worker module=store status=error error={join_err}");
            Err(StoreError::Worker(join_err.to_string()).into())
        }
    }
}
