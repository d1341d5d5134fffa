use std::path::Path;

use anyhow::Context;
use stk_config::StkConfig;

/// Load `.env` from the project root (if any), then layered configuration.
pub fn load_config(project_root: &Path) -> anyhow::Result<StkConfig> {
    let env_path = project_root.join(".env");
    if env_path.exists() {
        dotenvy::from_path(&env_path)
            .with_context(|| format!("failed to load dotenv file at {}", env_path.display()))?;
    }

    StkConfig::load_from(project_root).map_err(anyhow::Error::from)
}
