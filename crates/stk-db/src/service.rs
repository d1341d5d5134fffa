//! Service layer orchestrating ledger mutations with the journal.
//!
//! `StockService` wraps `StockDb` (raw database access) and `JournalWriter`
//! (JSONL persistence). All repo methods are implemented as
//! `impl StockService`.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use stk_config::StkConfig;
use stk_core::enums::JournalOp;
use stk_core::identity::Actor;
use stk_core::journal::JournalEntry;
use tokio::sync::{Mutex, MutexGuard};

use crate::StockDb;
use crate::error::DatabaseError;
use crate::helpers::fmt_ts;
use crate::journal::writer::JournalWriter;
use crate::retry::{self, RetryConfig};

/// Orchestrates ledger mutations with the JSONL journal.
///
/// Every mutation method follows this protocol:
/// 1. Authorize the actor and validate the request
/// 2. Take the service write lock, then `BEGIN IMMEDIATE`
/// 3. Read current state, plan, and execute guarded SQL
/// 4. Append the journal entry (inside the transaction)
/// 5. Commit, or roll back on any failure
///
/// Lock contention retries the whole sequence with backoff.
pub struct StockService {
    db: StockDb,
    journal: JournalWriter,
    retry: RetryConfig,
    write_lock: Mutex<()>,
}

/// An open write transaction holding the service write lock.
pub(crate) struct WriteScope<'a> {
    _guard: MutexGuard<'a, ()>,
    tx: libsql::Transaction,
    journal: &'a JournalWriter,
}

impl WriteScope<'_> {
    pub(crate) fn tx(&self) -> &libsql::Connection {
        &self.tx
    }

    /// Commit on success, roll back on failure.
    ///
    /// Journal entries appended in this scope are kept only when the commit
    /// succeeds.
    pub(crate) async fn finish<T>(
        self,
        result: Result<T, DatabaseError>,
    ) -> Result<T, DatabaseError> {
        match result {
            Ok(value) => match self.tx.commit().await {
                Ok(()) => {
                    self.journal.settle();
                    Ok(value)
                }
                Err(e) => {
                    discard_journal(self.journal);
                    Err(e.into())
                }
            },
            Err(e) => {
                if let Err(rollback) = self.tx.rollback().await {
                    tracing::warn!(error = %rollback, "rollback failed");
                }
                discard_journal(self.journal);
                Err(e)
            }
        }
    }
}

fn discard_journal(journal: &JournalWriter) {
    if let Err(e) = journal.discard() {
        tracing::warn!(error = %e, "failed to discard uncommitted journal entries");
    }
}

/// A read holding the service write lock.
///
/// Reads share the writer's connection, so they wait until no write
/// transaction is open on it.
pub(crate) struct ReadScope<'a> {
    _guard: MutexGuard<'a, ()>,
    conn: &'a libsql::Connection,
}

impl<'a> ReadScope<'a> {
    pub(crate) const fn conn(&self) -> &'a libsql::Connection {
        self.conn
    }
}

impl StockService {
    /// Create a new service wrapping a local database.
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the libSQL database file, or `":memory:"` for tests.
    /// * `journal_dir` - Directory for JSONL journal files. Pass `None` to
    ///   disable the journal.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or the journal
    /// directory cannot be created.
    pub async fn new_local(
        db_path: &str,
        journal_dir: Option<PathBuf>,
    ) -> Result<Self, DatabaseError> {
        let db = StockDb::open_local(db_path).await?;
        let journal = match journal_dir {
            Some(dir) => JournalWriter::new(dir)?,
            None => JournalWriter::disabled(),
        };
        Ok(Self::from_db(db, journal))
    }

    /// Create a service from loaded configuration.
    ///
    /// Creates the database's parent directory when it is missing.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or the journal
    /// directory cannot be created.
    pub async fn from_config(config: &StkConfig) -> Result<Self, DatabaseError> {
        let path = &config.database.path;
        if path.as_str() != ":memory:"
            && let Some(parent) = std::path::Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| DatabaseError::Other(e.into()))?;
        }

        let db = StockDb::open_local_with_timeout(
            path,
            Duration::from_millis(config.database.busy_timeout_ms),
        )
        .await?;
        let journal = if config.database.has_journal() {
            JournalWriter::new(PathBuf::from(&config.database.journal_dir))?
        } else {
            JournalWriter::disabled()
        };
        Ok(Self::from_db(db, journal).with_retry(RetryConfig::from(&config.ledger)))
    }

    /// Create from an existing `StockDb`.
    #[must_use]
    pub fn from_db(db: StockDb, journal: JournalWriter) -> Self {
        Self {
            db,
            journal,
            retry: RetryConfig::default(),
            write_lock: Mutex::new(()),
        }
    }

    /// Replace the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Access the underlying database handle.
    ///
    /// Queries on it bypass the write lock and can observe a transaction
    /// another task has not yet committed.
    #[must_use]
    pub const fn db(&self) -> &StockDb {
        &self.db
    }

    /// Access the journal writer.
    #[must_use]
    pub const fn journal(&self) -> &JournalWriter {
        &self.journal
    }

    /// Reject actors whose role may not modify stock.
    pub(crate) fn authorize(actor: &Actor) -> Result<(), DatabaseError> {
        if actor.can_mutate_stock() {
            Ok(())
        } else {
            Err(DatabaseError::Forbidden {
                user_id: actor.user_id.clone(),
                role: actor.role,
            })
        }
    }

    /// Take the write lock and open an immediate transaction.
    pub(crate) async fn begin_write(&self) -> Result<WriteScope<'_>, DatabaseError> {
        let guard = self.write_lock.lock().await;
        // Appends left by a scope dropped before finishing were rolled back.
        if self.journal.has_pending() {
            discard_journal(&self.journal);
        }
        let tx = self.db.begin_immediate().await?;
        Ok(WriteScope {
            _guard: guard,
            tx,
            journal: &self.journal,
        })
    }

    /// Take the write lock for a read on the shared connection.
    pub(crate) async fn begin_read(&self) -> ReadScope<'_> {
        ReadScope {
            _guard: self.write_lock.lock().await,
            conn: self.db.conn(),
        }
    }

    /// Run `attempt` until it succeeds, fails permanently, or runs out of
    /// attempts on lock contention.
    pub(crate) async fn retrying<T, F, Fut>(
        &self,
        op: &'static str,
        mut attempt: F,
    ) -> Result<T, DatabaseError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DatabaseError>>,
    {
        let mut n = 1;
        loop {
            match attempt().await {
                Err(e) if retry::is_transient(&e) => {
                    if n >= self.retry.max_attempts {
                        return Err(DatabaseError::Conflict(format!(
                            "{op}: gave up after {n} attempts: {e}"
                        )));
                    }
                    let delay = self.retry.delay_after(n);
                    tracing::warn!(op, attempt = n, ?delay, error = %e, "write contention, retrying");
                    tokio::time::sleep(delay).await;
                    n += 1;
                }
                other => return other,
            }
        }
    }

    /// Append a journal entry for a mutation about to commit.
    pub(crate) fn record<T: Serialize>(
        &self,
        actor: &Actor,
        event_id: &str,
        item_id: &str,
        op: JournalOp,
        data: &T,
    ) -> Result<(), DatabaseError> {
        if !self.journal.is_enabled() {
            return Ok(());
        }
        let entry = JournalEntry {
            v: 1,
            ts: fmt_ts(&crate::helpers::now()),
            event_id: event_id.to_string(),
            actor: actor.user_id.clone(),
            op,
            item_id: item_id.to_string(),
            data: serde_json::to_value(data).map_err(|e| DatabaseError::Other(e.into()))?,
        };
        self.journal.append(&entry).inspect_err(|e| {
            tracing::warn!(event_id, item_id, %op, error = %e, "journal append failed");
        })
    }
}
