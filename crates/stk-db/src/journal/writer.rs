//! JSONL journal writer.
//!
//! Appends `JournalEntry` records to per-event `{journal_dir}/{event_id}.jsonl`
//! files. Uses `serde_jsonlines::append_json_lines` for per-line appends.
//!
//! Appends made inside a write transaction stay pending until the transaction
//! settles: `settle()` keeps them after a commit, `discard()` truncates each
//! touched file back to where it ended before the transaction.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use stk_core::journal::JournalEntry;

use crate::error::DatabaseError;

/// Length of a journal file before a pending append.
#[derive(Debug)]
struct JournalMark {
    path: PathBuf,
    len: u64,
}

/// Appends journal entries to per-event JSONL files.
///
/// `StockService` calls `append()` inside the write transaction, before
/// commit. A failed append aborts the mutation, and a transaction that does
/// not commit has its appends discarded.
pub struct JournalWriter {
    journal_dir: PathBuf,
    enabled: bool,
    pending: Mutex<Vec<JournalMark>>,
}

impl JournalWriter {
    /// Create a new `JournalWriter` pointing at the given directory.
    ///
    /// Creates the directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the directory cannot be created.
    pub fn new(journal_dir: PathBuf) -> Result<Self, DatabaseError> {
        std::fs::create_dir_all(&journal_dir).map_err(|e| DatabaseError::Other(e.into()))?;
        Ok(Self {
            journal_dir,
            enabled: true,
            pending: Mutex::new(Vec::new()),
        })
    }

    /// Create a disabled writer.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            journal_dir: PathBuf::new(),
            enabled: false,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Whether journal writing is enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Append an entry to the event's JSONL file.
    ///
    /// The append stays pending until [`Self::settle`] or [`Self::discard`].
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the file write fails.
    pub fn append(&self, entry: &JournalEntry) -> Result<(), DatabaseError> {
        if !self.enabled {
            return Ok(());
        }

        let path = self.path_for(&entry.event_id);
        let len = std::fs::metadata(&path).map_or(0, |meta| meta.len());
        serde_jsonlines::append_json_lines(&path, [entry])
            .map_err(|e| DatabaseError::Other(e.into()))?;
        self.pending_marks().push(JournalMark { path, len });
        Ok(())
    }

    /// Keep every pending append. Called once the transaction has committed.
    pub fn settle(&self) {
        self.pending_marks().clear();
    }

    /// Truncate every file touched by pending appends back to its length
    /// before the first of them.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a file cannot be truncated. Marks that were
    /// not restored stay pending.
    pub fn discard(&self) -> Result<(), DatabaseError> {
        let mut pending = self.pending_marks();
        while let Some(mark) = pending.pop() {
            let restored = if mark.len == 0 {
                std::fs::remove_file(&mark.path)
            } else {
                OpenOptions::new()
                    .write(true)
                    .open(&mark.path)
                    .and_then(|file| file.set_len(mark.len))
            };
            if let Err(e) = restored {
                pending.push(mark);
                return Err(DatabaseError::Other(e.into()));
            }
        }
        Ok(())
    }

    /// Whether appends are waiting on a transaction outcome.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending_marks().is_empty()
    }

    /// Read back every entry recorded for an event, oldest first.
    ///
    /// Returns an empty list if the event has no journal file.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the file cannot be read or a line is not a
    /// valid entry.
    pub fn read_event(&self, event_id: &str) -> Result<Vec<JournalEntry>, DatabaseError> {
        let path = self.path_for(event_id);
        if !self.enabled || !path.exists() {
            return Ok(Vec::new());
        }
        serde_jsonlines::json_lines(&path)
            .map_err(|e| DatabaseError::Other(e.into()))?
            .collect::<std::io::Result<Vec<JournalEntry>>>()
            .map_err(|e| DatabaseError::Other(e.into()))
    }

    /// The directory where journal files are stored.
    #[must_use]
    pub fn journal_dir(&self) -> &Path {
        &self.journal_dir
    }

    fn path_for(&self, event_id: &str) -> PathBuf {
        self.journal_dir.join(format!("{event_id}.jsonl"))
    }

    fn pending_marks(&self) -> std::sync::MutexGuard<'_, Vec<JournalMark>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
