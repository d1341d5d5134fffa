use clap::{Args, Subcommand};

use crate::cli::subcommands::{EventCommands, HistoryCommands, ItemCommands};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Events that own inventory items.
    Event {
        #[command(subcommand)]
        action: EventCommands,
    },
    /// Inventory items.
    Item {
        #[command(subcommand)]
        action: ItemCommands,
    },
    /// Receive stock into a new batch.
    Receive(ReceiveArgs),
    /// Consume stock in FEFO order.
    Consume(ConsumeArgs),
    /// Write stock off as waste.
    Waste(WasteArgs),
    /// Record a physical count.
    Audit(AuditArgs),
    /// List an item's batches in FEFO order.
    Batches(BatchesArgs),
    /// Waste and audit history.
    History {
        #[command(subcommand)]
        action: HistoryCommands,
    },
    /// Compare an item's total with its open batches.
    Check(CheckArgs),
}

/// The item a ledger command acts on.
#[derive(Clone, Debug, Args)]
pub struct ItemTarget {
    /// Event the item belongs to.
    #[arg(long)]
    pub event: String,
    /// Item ID.
    #[arg(long)]
    pub item: String,
}

#[derive(Clone, Debug, Args)]
pub struct ReceiveArgs {
    #[command(flatten)]
    pub target: ItemTarget,
    #[arg(long)]
    pub quantity: i64,
    #[arg(long)]
    pub lot: Option<String>,
    /// Expiration date (YYYY-MM-DD).
    #[arg(long)]
    pub expires: Option<String>,
    /// Receipt time (RFC 3339). Defaults to now.
    #[arg(long)]
    pub received_at: Option<String>,
    /// Manufacture time (RFC 3339).
    #[arg(long)]
    pub manufactured_at: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct ConsumeArgs {
    #[command(flatten)]
    pub target: ItemTarget,
    #[arg(long)]
    pub quantity: i64,
}

#[derive(Clone, Debug, Args)]
pub struct WasteArgs {
    #[command(flatten)]
    pub target: ItemTarget,
    #[arg(long)]
    pub quantity: i64,
    /// spoilage, overproduction, damage, contamination, other
    #[arg(long)]
    pub reason: String,
    /// Waste from this batch instead of FEFO order.
    #[arg(long)]
    pub batch: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct AuditArgs {
    #[command(flatten)]
    pub target: ItemTarget,
    /// Counted quantity.
    #[arg(long)]
    pub actual: i64,
    /// Quantity the count was expected to find.
    #[arg(long)]
    pub expected: i64,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long)]
    pub session_context: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct BatchesArgs {
    #[command(flatten)]
    pub target: ItemTarget,
    /// Include closed batches.
    #[arg(long)]
    pub all: bool,
}

#[derive(Clone, Debug, Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub target: ItemTarget,
}
