//! Lock-contention retry logic.
//!
//! A write transaction that cannot take the database write lock within the
//! busy timeout, or whose optimistic guards find rows changed underneath it,
//! is retried with exponential backoff. Once attempts run out the caller
//! receives `DatabaseError::Conflict`.

use std::time::Duration;

use stk_config::LedgerConfig;

use crate::error::DatabaseError;

/// Configuration for retry behavior on lock contention.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial one).
    pub max_attempts: u32,
    /// Initial delay before the first retry.
    pub base_delay: Duration,
    /// Maximum delay between retries (backoff is capped here).
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::from(&LedgerConfig::default())
    }
}

impl From<&LedgerConfig> for RetryConfig {
    fn from(config: &LedgerConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }
}

impl RetryConfig {
    /// A single attempt with no backoff.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay before attempt `attempt + 1`, where `attempt` starts at 1.
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Detect `SQLITE_BUSY` / `SQLITE_LOCKED` style failures.
///
/// The predicate is intentionally narrow to avoid retrying genuine SQL or
/// constraint errors.
pub fn is_lock_contention(e: &libsql::Error) -> bool {
    let msg = e.to_string().to_ascii_lowercase();
    msg.contains("database is locked")
        || msg.contains("database table is locked")
        || msg.contains("sqlite_busy")
        || msg.contains("database is busy")
}

/// Whether a failed attempt should be retried.
#[must_use]
pub fn is_transient(e: &DatabaseError) -> bool {
    match e {
        DatabaseError::Conflict(_) => true,
        DatabaseError::LibSql(inner) => is_lock_contention(inner),
        _ => false,
    }
}
