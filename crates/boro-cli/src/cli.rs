//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::compose::ComposeArgs;
use crate::commands::lookup::LookupArgs;

/// Look up amateur-radio callsigns on QRZ and draft QSL emails.
#[derive(Parser, Debug)]
#[command(name = "boro")]
#[command(author, version = env!("BORO_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Configuration file (defaults to boro.yaml in the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Look up one or more callsigns
    Lookup(LookupArgs),

    /// Draft a QSL email to a callsign's address of record
    Compose(ComposeArgs),
}
