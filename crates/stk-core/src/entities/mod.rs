//! Entity structs for all Stockroom domain objects.
//!
//! Each entity maps to a table in the libSQL database. All structs derive
//! `Serialize`, `Deserialize`, and `JsonSchema` for JSON output and schema
//! validation.

mod audit_log;
pub(crate) mod batch;
mod event;
mod item;
mod waste;

pub use audit_log::AuditLog;
pub use batch::Batch;
pub use event::Event;
pub use item::Item;
pub use waste::WasteLog;
