use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Role;

/// An already-authenticated caller and the role it holds in the event.
///
/// Produced by the application layer; the ledger only reads the role to
/// decide whether a mutation may proceed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Actor {
    pub user_id: String,
    pub role: Role,
}

impl Actor {
    #[must_use]
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    #[must_use]
    pub const fn can_mutate_stock(&self) -> bool {
        self.role.can_mutate_stock()
    }
}
