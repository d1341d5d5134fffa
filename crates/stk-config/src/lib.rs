//! # stk-config
//!
//! Layered configuration loading for Stockroom using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`STOCKROOM_*` prefix, `__` as separator)
//! 2. Project-level `.stockroom/config.toml`
//! 3. User-level `~/.config/stockroom/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `STOCKROOM_DATABASE__PATH` -> `database.path`,
//! `STOCKROOM_ACTOR__ROLE` -> `actor.role`, etc. The `__` (double underscore)
//! separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use stk_config::StkConfig;
//!
//! let config = StkConfig::load_with_dotenv().expect("config");
//! println!("database: {}", config.database.path);
//! ```

mod actor;
mod database;
mod error;
mod general;
mod ledger;

pub use actor::ActorConfig;
pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use ledger::LedgerConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project-local directory holding config, database, and journal.
pub const PROJECT_DIR: &str = ".stockroom";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StkConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub actor: ActorConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl StkConfig {
    /// Load configuration from all sources rooted at the current directory.
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("."))
    }

    /// Load configuration with the project config taken from `project_root`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is out of range.
    pub fn load_from(project_root: &Path) -> Result<Self, ConfigError> {
        let config: Self = Self::figment_for(project_root).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is out of range.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain for the current directory.
    ///
    /// Public so tests can inspect the figment directly or add providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        Self::figment_for(Path::new("."))
    }

    /// Build the figment provider chain for a given project root.
    #[must_use]
    pub fn figment_for(project_root: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = project_root.join(PROJECT_DIR).join("config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("STOCKROOM_").split("__"))
    }

    /// Reject values that would make the ledger unusable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ledger.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ledger.max_attempts".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.ledger.base_delay_ms > self.ledger.max_delay_ms {
            return Err(ConfigError::InvalidValue {
                field: "ledger.base_delay_ms".into(),
                reason: format!(
                    "{} exceeds ledger.max_delay_ms ({})",
                    self.ledger.base_delay_ms, self.ledger.max_delay_ms
                ),
            });
        }
        if self.database.path.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database.path".into(),
                reason: "must not be empty".into(),
            });
        }
        if self.actor.user_id.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "actor.user_id".into(),
                reason: "must not be blank".into(),
            });
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("stockroom").join("config.toml"))
    }
}
