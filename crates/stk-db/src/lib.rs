//! # stk-db
//!
//! libSQL persistence and the batch ledger service for Stockroom.
//!
//! Handles all relational state: events, items, batches, waste logs, and
//! audit logs. Every stock mutation runs inside one `BEGIN IMMEDIATE`
//! transaction on a local libSQL database, so the availability check, the
//! FEFO plan, and the writes it produces commit or abort together.

pub mod error;
pub mod helpers;
pub mod journal;
mod migrations;
pub mod repos;
pub mod retry;
pub mod service;
pub mod updates;

#[cfg(test)]
pub(crate) mod test_support;

use std::time::Duration;

use error::DatabaseError;
use libsql::{Builder, TransactionBehavior};

/// Default wait for the write lock before libSQL reports the database busy.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Central database handle for all Stockroom state.
///
/// Wraps a libSQL database and one connection.
pub struct StockDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl StockDb {
    /// Open a local database at the given path with the default busy timeout.
    ///
    /// Runs migrations automatically on first open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        Self::open_local_with_timeout(path, DEFAULT_BUSY_TIMEOUT).await
    }

    /// Open a local database with an explicit lock wait.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local_with_timeout(
        path: &str,
        busy_timeout: Duration,
    ) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        // PRAGMA busy_timeout echoes the new value back as a row.
        let millis = u64::try_from(busy_timeout.as_millis()).unwrap_or(u64::MAX);
        conn.query(&format!("PRAGMA busy_timeout = {millis}"), ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA busy_timeout: {e}")))?;

        let stock_db = Self { db, conn };
        stock_db.run_migrations().await?;
        Ok(stock_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Start a write transaction that takes the database write lock up front.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::LibSql` if the lock cannot be acquired within
    /// the busy timeout.
    pub async fn begin_immediate(&self) -> Result<libsql::Transaction, DatabaseError> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .await?)
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"bat-a3f8b2c1"`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        helpers::generate_id(&self.conn, prefix).await
    }
}
