//! Subcommand implementations.

pub mod compose;
pub mod lookup;

use anyhow::{Context, Result};
use colored::Colorize;

use boro_qrz::QrzClient;

use crate::config::Configuration;

/// Log in with the configured credentials.
async fn connect(config: &Configuration) -> Result<QrzClient> {
    let credentials = config.qrz.credentials()?;

    eprintln!("{}", "Logging in to QRZ...".dimmed());

    QrzClient::new(credentials).await.context("Failed to login")
}
