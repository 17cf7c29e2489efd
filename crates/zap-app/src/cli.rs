use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// zap: pair and inspect WhatsApp instances from the terminal.
#[derive(Parser, Debug)]
#[command(name = "zap", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level override (a tracing filter directive, e.g. `zap=debug`).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Show a pairing QR code and wait until the instance connects.
    Connect {
        /// Instance to pair. Defaults to the selected instance.
        instance: Option<String>,

        /// Extra attempts after the first one ends without a connection.
        #[arg(long, default_value_t = 0)]
        retries: u32,
    },
    /// List the account's instances.
    Instances,
    /// Remember an instance as the default for `connect`.
    Select { id: String },
    /// Print the current status of an instance.
    Status { id: String },
}

pub fn parse() -> Args {
    Args::parse()
}
