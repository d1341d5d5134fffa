use crate::cli::GlobalFlags;
use crate::cli::subcommands::EventCommands;
use crate::commands::shared::limit::effective_limit;
use crate::context::AppContext;
use crate::output::output;

/// Handle `stk event`.
pub async fn handle(
    action: &EventCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        EventCommands::Create { name } => {
            let event = ctx.service.create_event(name).await?;
            output(&event, flags.format)
        }
        EventCommands::Get { id } => {
            let event = ctx.service.get_event(id).await?;
            output(&event, flags.format)
        }
        EventCommands::List => {
            let limit = effective_limit(None, flags.limit, ctx.config.general.default_limit);
            let events = ctx.service.list_events(limit).await?;
            output(&events, flags.format)
        }
    }
}
