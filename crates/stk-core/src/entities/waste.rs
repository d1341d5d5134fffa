use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::WasteReason;

/// An immutable record of stock written off.
///
/// `cost_impact` is `quantity * unit_price` at the time of the waste and is
/// never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct WasteLog {
    pub id: String,
    pub item_id: String,
    pub batch_id: Option<String>,
    pub quantity: i64,
    pub reason: WasteReason,
    pub notes: Option<String>,
    pub cost_impact: Option<i64>,
    pub actor_id: String,
    pub created_at: DateTime<Utc>,
}
