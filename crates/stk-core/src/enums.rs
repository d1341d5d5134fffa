//! Status enums, reason codes, roles, and journal operations for Stockroom.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`
//! and expose `as_str()` returning the exact string stored in SQL.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// BatchState
// ---------------------------------------------------------------------------

/// Lifecycle of a received batch.
///
/// ```text
/// open → closed
/// ```
///
/// `closed` is terminal. A closed batch is kept for history and never
/// reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BatchState {
    Open,
    Closed,
}

impl BatchState {
    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Open => &[Self::Closed],
            Self::Closed => &[],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// State implied by a remaining quantity.
    #[must_use]
    pub const fn for_quantity(quantity: i64) -> Self {
        if quantity > 0 { Self::Open } else { Self::Closed }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for BatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// StockTracking
// ---------------------------------------------------------------------------

/// How an item's quantity is tracked.
///
/// An item starts `unbatched` (plain counter) and becomes `batched` the first
/// time stock is received through the batch ledger. The switch is one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StockTracking {
    Unbatched,
    Batched,
}

impl StockTracking {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unbatched => "unbatched",
            Self::Batched => "batched",
        }
    }
}

impl fmt::Display for StockTracking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// WasteReason
// ---------------------------------------------------------------------------

/// Why stock was written off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WasteReason {
    Spoilage,
    Overproduction,
    Damage,
    Contamination,
    Other,
}

impl WasteReason {
    pub const ALL: [Self; 5] = [
        Self::Spoilage,
        Self::Overproduction,
        Self::Damage,
        Self::Contamination,
        Self::Other,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Spoilage => "spoilage",
            Self::Overproduction => "overproduction",
            Self::Damage => "damage",
            Self::Contamination => "contamination",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for WasteReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WasteReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|reason| reason.as_str() == s)
            .ok_or_else(|| format!("unknown waste reason '{s}'"))
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Member role within an event, ordered by privilege.
///
/// ```text
/// owner > admin > editor > viewer
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    Admin,
    Editor,
    Viewer,
}

impl Role {
    pub const ALL: [Self; 4] = [Self::Owner, Self::Admin, Self::Editor, Self::Viewer];

    /// Numeric privilege rank; higher outranks lower.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Owner => 3,
            Self::Admin => 2,
            Self::Editor => 1,
            Self::Viewer => 0,
        }
    }

    /// Whether this role is at least as privileged as `required`.
    #[must_use]
    pub const fn at_least(self, required: Self) -> bool {
        self.rank() >= required.rank()
    }

    /// Stock mutations require `editor` or above.
    #[must_use]
    pub const fn can_mutate_stock(self) -> bool {
        self.at_least(Self::Editor)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == lowered)
            .ok_or_else(|| format!("unknown role '{s}'"))
    }
}

// ---------------------------------------------------------------------------
// EntityType
// ---------------------------------------------------------------------------

/// Entity kinds referenced by errors and journal entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Event,
    Item,
    Batch,
    WasteLog,
    AuditLog,
}

impl EntityType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Item => "item",
            Self::Batch => "batch",
            Self::WasteLog => "waste_log",
            Self::AuditLog => "audit_log",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// JournalOp
// ---------------------------------------------------------------------------

/// Kind of ledger mutation recorded in the JSONL journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum JournalOp {
    ItemCreated,
    ItemUpdated,
    Received,
    Consumed,
    Wasted,
    Audited,
}

impl JournalOp {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ItemCreated => "item_created",
            Self::ItemUpdated => "item_updated",
            Self::Received => "received",
            Self::Consumed => "consumed",
            Self::Wasted => "wasted",
            Self::Audited => "audited",
        }
    }
}

impl fmt::Display for JournalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_state_is_monotonic() {
        assert!(BatchState::Open.can_transition_to(BatchState::Closed));
        assert!(!BatchState::Closed.can_transition_to(BatchState::Open));
        assert!(BatchState::Closed.allowed_next_states().is_empty());
    }

    #[test]
    fn batch_state_for_quantity() {
        assert_eq!(BatchState::for_quantity(3), BatchState::Open);
        assert_eq!(BatchState::for_quantity(0), BatchState::Closed);
    }

    #[test]
    fn role_hierarchy() {
        assert!(Role::Owner.at_least(Role::Admin));
        assert!(Role::Admin.at_least(Role::Editor));
        assert!(!Role::Viewer.at_least(Role::Editor));
        assert!(Role::Editor.can_mutate_stock());
        assert!(!Role::Viewer.can_mutate_stock());
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn waste_reason_as_str_matches_serde() {
        for reason in WasteReason::ALL {
            let json = serde_json::to_value(reason).unwrap();
            assert_eq!(json, serde_json::Value::String(reason.as_str().to_string()));
            assert_eq!(reason.as_str().parse::<WasteReason>().unwrap(), reason);
        }
    }
}
