use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `stk` binary.
#[derive(Debug, Parser)]
#[command(name = "stk", version, about = "Stockroom - event inventory and batch ledger")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Max results to return
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root path (defaults to auto-detect via .stockroom)
    #[arg(short, long, global = true)]
    pub project: Option<String>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            limit: self.limit,
            quiet: self.quiet,
            verbose: self.verbose,
            project: self.project.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::subcommands::{EventCommands, HistoryCommands, ItemCommands};
    use super::{Cli, Commands, GlobalFlags, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from([
            "stk", "--format", "raw", "--limit", "10", "--verbose", "event", "list",
        ])
        .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert_eq!(cli.limit, Some(10));
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Event {
                action: EventCommands::List
            }
        ));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["stk", "event", "get", "evt-1", "--quiet"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.quiet);
    }

    #[test]
    fn output_format_rejects_table() {
        let parsed = Cli::try_parse_from(["stk", "--format", "table", "event", "list"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn consume_requires_event_item_and_quantity() {
        let cli = Cli::try_parse_from([
            "stk", "consume", "--event", "evt-1", "--item", "itm-1", "--quantity", "4",
        ])
        .expect("cli should parse");
        let Commands::Consume(args) = cli.command else {
            panic!("expected consume");
        };
        assert_eq!(args.target.event, "evt-1");
        assert_eq!(args.target.item, "itm-1");
        assert_eq!(args.quantity, 4);

        assert!(Cli::try_parse_from(["stk", "consume", "--event", "evt-1", "--item", "itm-1"]).is_err());
    }

    #[test]
    fn waste_parses_optional_batch() {
        let cli = Cli::try_parse_from([
            "stk", "waste", "--event", "evt-1", "--item", "itm-1", "--quantity", "2", "--reason",
            "spoilage", "--batch", "bat-9",
        ])
        .expect("cli should parse");
        let Commands::Waste(args) = cli.command else {
            panic!("expected waste");
        };
        assert_eq!(args.reason, "spoilage");
        assert_eq!(args.batch.as_deref(), Some("bat-9"));
    }

    #[test]
    fn item_update_price_flags_conflict() {
        let parsed = Cli::try_parse_from([
            "stk", "item", "update", "itm-1", "--event", "evt-1", "--price", "100", "--clear-price",
        ]);
        assert!(parsed.is_err());

        let cli = Cli::try_parse_from([
            "stk", "item", "update", "itm-1", "--event", "evt-1", "--clear-price",
        ])
        .expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::Item {
                action: ItemCommands::Update {
                    clear_price: true,
                    ..
                }
            }
        ));
    }

    #[test]
    fn history_subcommands_parse() {
        let cli = Cli::try_parse_from([
            "stk", "history", "waste", "--event", "evt-1", "--item", "itm-1", "--reason", "damage",
        ])
        .expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::History {
                action: HistoryCommands::Waste { .. }
            }
        ));
    }

    #[test]
    fn global_flags_extraction_copies_values() {
        let cli = Cli::try_parse_from(["stk", "--project", "/tmp/demo", "event", "list"])
            .expect("cli should parse");
        let flags: GlobalFlags = cli.global_flags();
        assert_eq!(flags.project.as_deref(), Some("/tmp/demo"));
    }
}
