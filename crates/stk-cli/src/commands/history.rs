use stk_core::enums::WasteReason;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::HistoryCommands;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `stk history`.
pub async fn handle(
    action: &HistoryCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let fallback = ctx.config.general.default_limit;
    match action {
        HistoryCommands::Waste {
            event,
            item,
            reason,
            limit,
        } => {
            let reason = reason
                .as_deref()
                .map(|raw| parse_enum::<WasteReason>(raw, "reason"))
                .transpose()?;
            let limit = effective_limit(*limit, flags.limit, fallback);
            let logs = ctx.service.list_waste_logs(event, item, reason, limit).await?;
            output(&logs, flags.format)
        }
        HistoryCommands::Audit { event, item, limit } => {
            let limit = effective_limit(*limit, flags.limit, fallback);
            let logs = ctx.service.list_audit_logs(event, item, limit).await?;
            output(&logs, flags.format)
        }
    }
}
