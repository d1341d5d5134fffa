use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Event { action } => commands::event::handle(&action, ctx, flags).await,
        Commands::Item { action } => commands::item::handle(&action, ctx, flags).await,
        Commands::Receive(args) => commands::ledger::receive(&args, ctx, flags).await,
        Commands::Consume(args) => commands::ledger::consume(&args, ctx, flags).await,
        Commands::Waste(args) => commands::ledger::waste(&args, ctx, flags).await,
        Commands::Audit(args) => commands::ledger::audit(&args, ctx, flags).await,
        Commands::Batches(args) => commands::batches::handle(&args, ctx, flags).await,
        Commands::History { action } => commands::history::handle(&action, ctx, flags).await,
        Commands::Check(args) => commands::check::handle(&args, ctx, flags).await,
    }
}
