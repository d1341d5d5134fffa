use clap::Subcommand;

/// Item commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ItemCommands {
    /// Create an item.
    Create {
        #[arg(long)]
        event: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        unit: String,
        /// Opening counter quantity.
        #[arg(long, default_value_t = 0)]
        quantity: i64,
        /// Unit price in minor currency units (cents).
        #[arg(long)]
        price: Option<i64>,
    },
    /// Get an item by ID.
    Get { id: String },
    /// List an event's items.
    List {
        #[arg(long)]
        event: String,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Update an item's name, unit, or price.
    Update {
        id: String,
        #[arg(long)]
        event: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        unit: Option<String>,
        #[arg(long, conflicts_with = "clear_price")]
        price: Option<i64>,
        #[arg(long)]
        clear_price: bool,
    },
}
