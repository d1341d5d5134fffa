use crate::cli::GlobalFlags;
use crate::cli::root_commands::BatchesArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `stk batches`.
pub async fn handle(args: &BatchesArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let batches = ctx
        .service
        .list_batches(&args.target.event, &args.target.item, args.all)
        .await?;
    output(&batches, flags.format)
}
