//! ID prefix constants.
//!
//! IDs are generated in SQL as `{prefix}-{8 hex chars}`, e.g. `bat-a3f8b2c1`.

pub const PREFIX_EVENT: &str = "evt";
pub const PREFIX_ITEM: &str = "itm";
pub const PREFIX_BATCH: &str = "bat";
pub const PREFIX_WASTE: &str = "wst";
pub const PREFIX_AUDIT: &str = "aud";

/// Every prefix in use, for exhaustive tests.
pub const ALL_PREFIXES: [&str; 5] = [
    PREFIX_EVENT,
    PREFIX_ITEM,
    PREFIX_BATCH,
    PREFIX_WASTE,
    PREFIX_AUDIT,
];
