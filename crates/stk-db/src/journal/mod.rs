//! JSONL ledger journal.
//!
//! Every committed stock mutation is appended to a per-event
//! `{event_id}.jsonl` file alongside the database write.

pub mod writer;
