//! # stk-core
//!
//! Core types, batch ledger planning, and error types for Stockroom.
//!
//! This crate provides the foundational types shared across all Stockroom crates:
//! - Entity structs for events, items, batches, waste and audit logs
//! - Batch state machine, waste reasons, and member roles
//! - FEFO deduction planning over an item's open batches
//! - ID prefix constants
//! - Domain error types and the caller-facing error classification
//! - Journal envelope for JSONL persistence
//! - Validated input payloads for ledger operations
//! - Operation outcome payloads

pub mod entities;
pub mod enums;
pub mod errors;
pub mod identity;
pub mod ids;
pub mod journal;
pub mod requests;
pub mod responses;
pub mod stock;
