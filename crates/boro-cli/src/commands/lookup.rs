//! Lookup command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;
use futures_util::future::join_all;

use boro_core::Callsign;

use crate::config::Configuration;
use crate::output;

#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Callsigns to look up
    #[arg(required = true)]
    pub callsigns: Vec<String>,

    /// Print one JSON object per line
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: LookupArgs, config: &Configuration) -> Result<()> {
    let callsigns = args
        .callsigns
        .iter()
        .map(|c| Callsign::new(c).with_context(|| format!("Invalid callsign '{c}'")))
        .collect::<Result<Vec<_>>>()?;

    let client = super::connect(config).await?;

    let lookups = callsigns.iter().map(|callsign| {
        let client = client.clone();
        async move { client.lookup(callsign).await }
    });
    let results = join_all(lookups).await;

    let mut failed = 0;
    for (i, (callsign, result)) in callsigns.iter().zip(results).enumerate() {
        match result {
            Ok(record) if args.json => output::json(&record)?,
            Ok(record) => {
                if i > 0 {
                    println!();
                }
                output::record(&record);
            }
            Err(err) => {
                failed += 1;
                output::error(&format!("{callsign}: {err}"));
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} lookups failed", callsigns.len());
    }

    Ok(())
}
