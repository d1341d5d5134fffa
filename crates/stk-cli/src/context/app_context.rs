use std::path::Path;

use anyhow::Context;
use stk_config::StkConfig;
use stk_core::identity::Actor;
use stk_db::service::StockService;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: StockService,
    pub config: StkConfig,
    pub actor: Actor,
}

impl AppContext {
    /// Open the ledger for the discovered project root.
    ///
    /// Relative database and journal paths are resolved against the root.
    pub async fn init(project_root: &Path, mut config: StkConfig) -> anyhow::Result<Self> {
        config.database.path = resolve_path(project_root, &config.database.path);
        if config.database.has_journal() {
            config.database.journal_dir = resolve_path(project_root, &config.database.journal_dir);
        }

        let service = StockService::from_config(&config)
            .await
            .with_context(|| format!("failed to open ledger at {}", config.database.path))?;
        let actor = config.actor.to_actor();
        tracing::debug!(
            root = %project_root.display(),
            db = %config.database.path,
            user = %actor.user_id,
            role = %actor.role,
            "context ready"
        );

        Ok(Self {
            service,
            config,
            actor,
        })
    }
}

fn resolve_path(root: &Path, configured: &str) -> String {
    if configured == ":memory:" || Path::new(configured).is_absolute() {
        return configured.to_string();
    }
    root.join(configured).to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::resolve_path;

    #[test]
    fn relative_paths_join_project_root() {
        let resolved = resolve_path(Path::new("/srv/gala"), ".stockroom/stockroom.db");
        assert_eq!(resolved, "/srv/gala/.stockroom/stockroom.db");
    }

    #[test]
    fn absolute_and_memory_paths_are_kept() {
        assert_eq!(resolve_path(Path::new("/srv"), "/var/db.sqlite"), "/var/db.sqlite");
        assert_eq!(resolve_path(Path::new("/srv"), ":memory:"), ":memory:");
    }
}
