//! Database and ledger error types for stk-db.

use stk_core::enums::{EntityType, Role};
use stk_core::errors::{CoreError, ErrorKind};
use thiserror::Error;

/// Errors from ledger operations and the storage underneath them.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// The referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityType, id: String },

    /// An argument was rejected (bad quantity, wrong event, closed batch).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested quantity exceeds the available stock.
    #[error("Insufficient stock for item {item_id}: requested {requested}, available {available}")]
    InsufficientStock {
        item_id: String,
        requested: i64,
        available: i64,
    },

    /// A batch-tracked item has no open batches to draw from.
    #[error("Item {item_id} has no open batches")]
    NoOpenBatches { item_id: String },

    /// The actor's role does not permit stock mutations.
    #[error("Actor {user_id} with role {role} may not modify stock")]
    Forbidden { user_id: String, role: Role },

    /// A concurrent writer changed the rows this operation read, or the
    /// write lock could not be acquired before retries ran out.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A SQL query failed or returned malformed data.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    /// Classify this error for callers.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            Self::NoOpenBatches { .. } => ErrorKind::NoOpenBatches,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::LibSql(e) if crate::retry::is_lock_contention(e) => ErrorKind::Conflict,
            Self::Query(_) | Self::Migration(_) | Self::NoResult | Self::LibSql(_) | Self::Other(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Whether the caller may retry the same request unchanged.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }

    pub(crate) fn not_found(entity: EntityType, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

impl From<CoreError> for DatabaseError {
    fn from(value: CoreError) -> Self {
        match value {
            CoreError::InsufficientStock {
                item_id,
                requested,
                available,
            } => Self::InsufficientStock {
                item_id,
                requested,
                available,
            },
            CoreError::NoOpenBatches { item_id } => Self::NoOpenBatches { item_id },
            other @ (CoreError::InvalidQuantity { .. }
            | CoreError::InvalidTransition { .. }
            | CoreError::Validation(_)) => Self::InvalidArgument(other.to_string()),
        }
    }
}
