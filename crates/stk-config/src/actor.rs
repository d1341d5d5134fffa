//! Identity used by the CLI when it calls into the ledger.
//!
//! Authentication happens upstream; this only names the caller and the role
//! it has already been granted.

use serde::{Deserialize, Serialize};
use stk_core::enums::Role;
use stk_core::identity::Actor;

fn default_user_id() -> String {
    "local".to_string()
}

const fn default_role() -> Role {
    Role::Editor
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ActorConfig {
    #[serde(default = "default_user_id")]
    pub user_id: String,

    #[serde(default = "default_role")]
    pub role: Role,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            role: default_role(),
        }
    }
}

impl ActorConfig {
    #[must_use]
    pub fn to_actor(&self) -> Actor {
        Actor::new(self.user_id.clone(), self.role)
    }
}
