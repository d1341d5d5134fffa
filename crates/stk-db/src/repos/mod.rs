//! Repository modules implementing the ledger and its supporting records.
//!
//! Each module adds methods to `StockService` via `impl StockService` blocks.

pub mod audit;
pub mod batch;
pub mod check;
pub mod consume;
pub mod event;
pub mod item;
pub mod waste;
