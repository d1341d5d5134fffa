//! Local libSQL database configuration.

use serde::{Deserialize, Serialize};

fn default_path() -> String {
    ".stockroom/stockroom.db".to_string()
}

/// Default lock wait before a write reports the database as busy.
const fn default_busy_timeout_ms() -> u64 {
    5_000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Database file path, or `:memory:`.
    #[serde(default = "default_path")]
    pub path: String,

    /// How long a transaction waits for the write lock, in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Directory for the JSONL ledger journal. Empty disables the journal.
    #[serde(default)]
    pub journal_dir: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            journal_dir: String::new(),
        }
    }
}

impl DatabaseConfig {
    /// Whether mutations are mirrored to the JSONL journal.
    #[must_use]
    pub fn has_journal(&self) -> bool {
        !self.journal_dir.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = DatabaseConfig::default();
        assert_eq!(config.path, ".stockroom/stockroom.db");
        assert_eq!(config.busy_timeout_ms, 5_000);
        assert!(!config.has_journal());
    }
}
