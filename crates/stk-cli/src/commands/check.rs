use crate::cli::GlobalFlags;
use crate::cli::root_commands::CheckArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `stk check`. Fails when the item has drifted from its batches.
pub async fn handle(args: &CheckArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let check = ctx
        .service
        .check_ledger(&args.target.event, &args.target.item)
        .await?;
    output(&check, flags.format)?;
    if !check.consistent {
        anyhow::bail!(
            "item {} total {} does not match open batches {}",
            check.item_id,
            check.item_quantity,
            check.open_batch_sum
        );
    }
    Ok(())
}
