//! Compose command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;
use serde::Serialize;

use boro_core::{Callsign, LookupResult};

use crate::config::{Configuration, EmailConfig};
use crate::output;
use crate::template;

#[derive(Args, Debug)]
pub struct ComposeArgs {
    /// Callsign to write to
    pub callsign: String,

    /// Print the draft as JSON
    #[arg(long)]
    pub json: bool,
}

/// A rendered message, ready to paste into a mail client.
#[derive(Debug, Serialize)]
struct Draft {
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<String>,
    /// Recipient's name as the directory lists it
    #[serde(skip_serializing_if = "Option::is_none")]
    to_name: Option<String>,
    to: String,
    subject: String,
    body: String,
    profile: String,
}

pub async fn run(args: ComposeArgs, config: &Configuration) -> Result<()> {
    let callsign = Callsign::new(&args.callsign)
        .with_context(|| format!("Invalid callsign '{}'", args.callsign))?;

    // Bad templates fail before any request is made.
    let email = config.email()?;
    template::validate(&email.subject_template).context("Invalid subject template")?;
    template::validate(&email.body_template).context("Invalid body template")?;

    let client = super::connect(config).await?;
    let record = client
        .lookup(&callsign)
        .await
        .with_context(|| format!("Failed to look up {callsign}"))?;

    let draft = draft(&callsign, &record, email)?;

    if args.json {
        output::json(&draft)?;
    } else {
        output::success(&format!("Draft for {}", record.call));
        println!();
        if let Some(from) = &draft.from {
            output::field("From", from);
        }
        match &draft.to_name {
            Some(name) => output::field("To", &format!("{name} <{}>", draft.to)),
            None => output::field("To", &draft.to),
        }
        output::field("Subject", &draft.subject);
        output::field("Profile", &draft.profile);
        println!();
        println!("{}", draft.body);
    }

    Ok(())
}

fn draft(callsign: &Callsign, record: &LookupResult, email: &EmailConfig) -> Result<Draft> {
    if !record.call.eq_ignore_ascii_case(callsign.as_str()) {
        bail!("callsign changed to {}", record.call);
    }

    let to = record
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .with_context(|| format!("no email address for {}", record.call))?;

    Ok(Draft {
        from: email.user_id.clone().filter(|u| !u.trim().is_empty()),
        to_name: record.display_name(),
        to: to.to_string(),
        subject: template::render(&email.subject_template, record)?,
        body: template::render(&email.body_template, record)?,
        profile: output::profile_url(&record.call),
    })
}
