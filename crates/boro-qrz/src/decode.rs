//! QRZ XML response decoding.
//!
//! Responses are small XML documents holding a `Session` element and, for
//! lookups, a `Callsign` element. The service may answer in a non-UTF-8
//! charset, so the body is transcoded according to its byte-order mark or
//! XML declaration before it is deserialized.
//!
//! The root element's name is not checked, and a bare `Callsign`/`Session`
//! fragment is accepted as if it were wrapped in `QRZDatabase`. Unknown
//! elements and attributes are skipped.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE};
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Deserialize;
use tracing::warn;

use boro_core::error::{DecodeError, SessionFault};
use boro_core::lookup::non_empty;
use boro_core::{LookupResult, SessionKey};

const ROOT: &str = "QRZDatabase";
const SESSION: &[u8] = b"Session";
const CALLSIGN: &[u8] = b"Callsign";

/// Contents of a `Session` element.
///
/// Every field is optional; blank elements decode as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SessionEnvelope {
    /// Session key.
    #[serde(rename = "Key", default, deserialize_with = "non_empty")]
    pub key: Option<String>,
    /// Number of lookups performed by this user in the current 24 hour period.
    #[serde(rename = "Count", default, deserialize_with = "non_empty")]
    pub count: Option<String>,
    /// Subscription expiry.
    #[serde(rename = "SubExp", default, deserialize_with = "non_empty")]
    pub sub_exp: Option<String>,
    /// Server time when the response was produced.
    #[serde(rename = "GMTime", default, deserialize_with = "non_empty")]
    pub gm_time: Option<String>,
    /// Informational notice for the user.
    #[serde(rename = "Message", default, deserialize_with = "non_empty")]
    pub message: Option<String>,
    /// Fault reported by the service.
    #[serde(rename = "Error", default, deserialize_with = "non_empty")]
    pub error: Option<String>,
}

/// Whether a session envelope still identifies a live session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// The service returned a session key.
    Active { key: SessionKey },
    /// No key was returned; the session is gone. Any fault is carried along.
    Absent { fault: Option<SessionFault> },
}

impl SessionEnvelope {
    /// Classify the envelope by key presence.
    pub fn status(&self) -> SessionStatus {
        match &self.key {
            Some(key) => SessionStatus::Active {
                key: SessionKey::new(key.clone()),
            },
            None => SessionStatus::Absent {
                fault: self.fault(),
            },
        }
    }

    /// Returns the service fault, if one was reported.
    pub fn fault(&self) -> Option<SessionFault> {
        self.error.as_deref().map(SessionFault::new)
    }
}

/// A lookup response: an optional record plus the session state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordEnvelope {
    /// The record, when the response held a `Callsign` element.
    pub record: Option<LookupResult>,
    /// Session state reported alongside the record.
    pub session: SessionEnvelope,
}

/// A decoded response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    /// Session information only (login responses, lookup faults).
    Session(SessionEnvelope),
    /// A callsign record with session information.
    Record(RecordEnvelope),
}

impl Envelope {
    /// Drop any record and keep the session part.
    pub fn into_session(self) -> SessionEnvelope {
        match self {
            Envelope::Session(session) => session,
            Envelope::Record(envelope) => envelope.session,
        }
    }

    /// View the envelope as a lookup response, with no record for
    /// session-only envelopes.
    pub fn into_record(self) -> RecordEnvelope {
        match self {
            Envelope::Session(session) => RecordEnvelope {
                record: None,
                session,
            },
            Envelope::Record(envelope) => envelope,
        }
    }
}

/// The `QRZDatabase` document element.
#[derive(Debug, Deserialize)]
struct QrzDatabase {
    #[serde(rename = "Callsign")]
    callsign: Option<LookupResult>,
    #[serde(rename = "Session", default)]
    session: SessionEnvelope,
}

/// Decode a raw response body.
///
/// # Errors
///
/// Returns an error when the body is empty, declares an unknown encoding,
/// is not well-formed XML, or holds a `Callsign` element without `call`.
pub fn decode(bytes: &[u8]) -> Result<Envelope, DecodeError> {
    let text = transcode(bytes)?;

    let database = match first_element(&text)? {
        (offset, true) => {
            let wrapped = format!("<{ROOT}>{}</{ROOT}>", &text[offset..]);
            quick_xml::de::from_str::<QrzDatabase>(&wrapped)
        }
        (_, false) => quick_xml::de::from_str::<QrzDatabase>(&text),
    }
    .map_err(malformed)?;

    match database.callsign {
        Some(record) if record.call.trim().is_empty() => {
            Err(DecodeError::MissingElement { element: "call" })
        }
        Some(mut record) => {
            record.call = record.call.trim().to_string();
            Ok(Envelope::Record(RecordEnvelope {
                record: Some(record),
                session: database.session,
            }))
        }
        None => Ok(Envelope::Session(database.session)),
    }
}

/// Find where the first element starts, and whether it is a bare
/// `Session`/`Callsign` fragment rather than a document element.
fn first_element(text: &str) -> Result<(usize, bool), DecodeError> {
    let mut reader = Reader::from_str(text);

    loop {
        let offset = usize::try_from(reader.buffer_position()).map_err(malformed)?;
        match reader.read_event().map_err(malformed)? {
            Event::Start(e) | Event::Empty(e) => {
                let name = e.local_name();
                let fragment = name.as_ref() == SESSION || name.as_ref() == CALLSIGN;
                return Ok((offset, fragment));
            }
            Event::Eof => return Err(DecodeError::Empty),
            _ => {}
        }
    }
}

/// Convert the body to UTF-8 according to its BOM or XML declaration.
fn transcode(bytes: &[u8]) -> Result<Cow<'_, str>, DecodeError> {
    let (encoding, body) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, &bytes[bom_len..]),
        None => (declared_encoding(bytes)?.unwrap_or(UTF_8), bytes),
    };

    let (text, had_errors) = encoding.decode_without_bom_handling(body);
    if had_errors {
        warn!(
            encoding = encoding.name(),
            "response contained malformed byte sequences"
        );
    }

    Ok(text)
}

/// Read the `encoding` pseudo-attribute from an XML declaration.
///
/// A declaration readable as ASCII cannot really be UTF-16, so a UTF-16
/// label without a BOM is treated as UTF-8.
fn declared_encoding(bytes: &[u8]) -> Result<Option<&'static Encoding>, DecodeError> {
    let Some(rest) = bytes.trim_ascii_start().strip_prefix(b"<?xml") else {
        return Ok(None);
    };

    let end = find(rest, b"?>").ok_or_else(|| DecodeError::Malformed {
        message: "unterminated XML declaration".to_string(),
    })?;
    let decl = &rest[..end];

    let Some(pos) = find(decl, b"encoding") else {
        return Ok(None);
    };

    let Some(value) = decl[pos + b"encoding".len()..]
        .trim_ascii_start()
        .strip_prefix(b"=")
        .map(<[u8]>::trim_ascii_start)
    else {
        return Err(DecodeError::Malformed {
            message: "encoding declaration without value".to_string(),
        });
    };

    let label = match value.first() {
        Some(&quote @ (b'"' | b'\'')) => {
            let inner = &value[1..];
            let close = inner
                .iter()
                .position(|&b| b == quote)
                .ok_or_else(|| DecodeError::Malformed {
                    message: "unterminated encoding declaration".to_string(),
                })?;
            &inner[..close]
        }
        _ => {
            return Err(DecodeError::Malformed {
                message: "encoding declaration must be quoted".to_string(),
            });
        }
    };

    let encoding =
        Encoding::for_label_no_replacement(label).ok_or_else(|| DecodeError::UnknownEncoding {
            label: String::from_utf8_lossy(label).into_owned(),
        })?;

    if encoding == UTF_16LE || encoding == UTF_16BE {
        return Ok(Some(UTF_8));
    }

    Ok(Some(encoding))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn malformed(err: impl std::fmt::Display) -> DecodeError {
    DecodeError::Malformed {
        message: err.to_string(),
    }
}
