//! boro - look up callsigns on QRZ and draft QSL emails.
//!
//! A thin front end over `boro-qrz`: it reads the YAML configuration, logs
//! in once, and prints lookup results or a templated message draft.

mod cli;
mod commands;
mod config;
mod output;
mod template;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use commands::{compose, lookup};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    let config = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Lookup(args) => lookup::run(args, &config).await,
        Commands::Compose(args) => compose::run(args, &config).await,
    }
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // stdout carries command output; logs go to stderr.
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
