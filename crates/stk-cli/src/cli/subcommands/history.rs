use clap::Subcommand;

/// History commands.
#[derive(Clone, Debug, Subcommand)]
pub enum HistoryCommands {
    /// Waste logs of an item, newest first.
    Waste {
        #[arg(long)]
        event: String,
        #[arg(long)]
        item: String,
        #[arg(long)]
        reason: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Audit logs of an item, newest first.
    Audit {
        #[arg(long)]
        event: String,
        #[arg(long)]
        item: String,
        #[arg(long)]
        limit: Option<u32>,
    },
}
