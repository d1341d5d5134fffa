//! Outcome payloads returned by ledger operations.
//!
//! These are the structured success values handed back to the application
//! layer and written to the journal.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Batch, WasteLog};
use crate::stock::BatchAllocation;

/// Result of `receive`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ReceiveOutcome {
    pub batch: Batch,
    /// Opening-balance batch created when an unbatched item switched to
    /// batch tracking on this receipt.
    pub opening_batch: Option<Batch>,
    pub item_quantity: i64,
}

/// Result of `consume`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ConsumeOutcome {
    pub item_id: String,
    pub requested: i64,
    /// Per-batch takes in FEFO order. Empty for unbatched items.
    pub allocations: Vec<BatchAllocation>,
    pub item_quantity: i64,
}

/// Result of `record_waste`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct WasteOutcome {
    pub waste: WasteLog,
    pub allocations: Vec<BatchAllocation>,
    pub item_quantity: i64,
}

/// Item total compared with the ledger it should mirror.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct LedgerCheck {
    pub item_id: String,
    pub batched: bool,
    pub item_quantity: i64,
    pub open_batch_sum: i64,
    pub open_batches: u32,
    pub consistent: bool,
}
