//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use boro_core::LookupResult;

const PROFILE_BASE: &str = "https://www.qrz.com/db/";

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a value as compact JSON.
pub fn json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    println!("{json}");
    Ok(())
}

/// Print every present field of a lookup record, in wire order.
pub fn record(record: &LookupResult) {
    println!("{}", record.call.bold());
    for name in &LookupResult::FIELD_NAMES[1..] {
        if let Some(value) = record.field(name) {
            field(name, value);
        }
    }
    field("profile", &profile_url(&record.call));
}

/// Public directory page for a callsign.
pub fn profile_url(call: &str) -> String {
    format!("{PROFILE_BASE}{call}")
}
