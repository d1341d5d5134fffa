//! JSONL ledger journal envelope.
//!
//! Every committed stock mutation is appended as one `JournalEntry` line to
//! a per-event `{event_id}.jsonl` file. The `v` field versions the envelope;
//! lines written without it deserialize as `v == 1`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::JournalOp;

const fn default_journal_version() -> u32 {
    1
}

/// A single ledger mutation recorded in the journal.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct JournalEntry {
    #[serde(default = "default_journal_version")]
    pub v: u32,

    /// RFC 3339 timestamp of the mutation.
    pub ts: String,

    pub event_id: String,

    /// User ID of the actor that performed the mutation.
    pub actor: String,

    pub op: JournalOp,

    pub item_id: String,

    /// Operation payload: the outcome returned to the caller.
    pub data: serde_json::Value,
}
