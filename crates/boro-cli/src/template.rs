//! `{{ name }}` placeholder substitution for message drafts.
//!
//! `callsign` expands to the record's call; every other name is a
//! [`LookupResult`] wire field. Absent fields expand to nothing. Names may
//! carry a leading `.` (`{{.callsign}}`), as in Go templates.

use anyhow::{Result, bail};

use boro_core::LookupResult;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Check that every placeholder in `template` is closed and known.
pub fn validate(template: &str) -> Result<()> {
    for name in placeholders(template)? {
        if !is_known(name) {
            bail!("unknown template field '{name}'");
        }
    }
    Ok(())
}

/// Render `template` against `record`.
pub fn render(template: &str, record: &LookupResult) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let (name, tail) = split_placeholder(&rest[start + OPEN.len()..])?;

        let value = match name {
            "callsign" => Some(record.call.as_str()),
            name if is_known(name) => record.field(name),
            name => bail!("unknown template field '{name}'"),
        };
        out.push_str(value.unwrap_or_default());
        rest = tail;
    }

    out.push_str(rest);
    Ok(out)
}

fn is_known(name: &str) -> bool {
    name == "callsign" || LookupResult::FIELD_NAMES.contains(&name)
}

/// Names of every placeholder, in order.
fn placeholders(template: &str) -> Result<Vec<&str>> {
    let mut names = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        let (name, tail) = split_placeholder(&rest[start + OPEN.len()..])?;
        names.push(name);
        rest = tail;
    }

    Ok(names)
}

/// Split `name }}tail` into the trimmed name and the tail.
fn split_placeholder(s: &str) -> Result<(&str, &str)> {
    let Some(end) = s.find(CLOSE) else {
        bail!("unterminated '{{{{' in template");
    };
    let name = s[..end].trim();
    let name = name.strip_prefix('.').unwrap_or(name);
    if name.is_empty() {
        bail!("empty placeholder in template");
    }
    Ok((name, &s[end + CLOSE.len()..]))
}
