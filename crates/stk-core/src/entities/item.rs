use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::StockTracking;

/// An inventory item and its denormalized total quantity.
///
/// For `batched` items `quantity` always equals the sum of open batch
/// quantities. `unit_price` is in minor currency units.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Item {
    pub id: String,
    pub event_id: String,
    pub name: String,
    pub unit: String,
    pub quantity: i64,
    pub unit_price: Option<i64>,
    pub tracking: StockTracking,
    pub last_audited_at: Option<DateTime<Utc>>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    #[must_use]
    pub const fn is_batched(&self) -> bool {
        matches!(self.tracking, StockTracking::Batched)
    }
}
