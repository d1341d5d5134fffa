use clap::Subcommand;

/// Event commands.
#[derive(Clone, Debug, Subcommand)]
pub enum EventCommands {
    /// Create an event.
    Create { name: String },
    /// Get an event by ID.
    Get { id: String },
    /// List events, newest first.
    List,
}
