//! Command-line argument types.

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "potsettle",
    version,
    about = "Settle poker hands: side pots, payouts and the next hand's seating"
)]
pub struct PotsettleCli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a hand file, split the pot and pay the named winners
    Settle {
        #[arg(long)]
        input: String,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print the hand that follows a settled hand file
    Next {
        #[arg(long)]
        input: String,
    },
    /// Print the ledger after every action of a hand file
    Replay {
        #[arg(long)]
        input: String,
    },
    /// Check every record of a JSONL hand log (.jsonl or .jsonl.zst)
    Verify {
        #[arg(long)]
        input: Option<String>,
    },
    /// Show the resolved configuration and where each value came from
    Cfg,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
