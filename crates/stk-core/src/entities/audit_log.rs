use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An immutable physical-count record.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AuditLog {
    pub id: String,
    pub item_id: String,
    pub actual_quantity: i64,
    pub expected_quantity: i64,
    /// `actual_quantity - expected_quantity`.
    pub discrepancy: i64,
    pub notes: Option<String>,
    pub session_context_id: Option<String>,
    pub actor_id: String,
    pub created_at: DateTime<Utc>,
}
