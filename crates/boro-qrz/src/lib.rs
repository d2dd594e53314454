//! boro-qrz - Client for the QRZ XML callsign interface.
//!
//! [`QrzClient`] logs in on construction, keeps the session key, and renews
//! it transparently when the service reports it expired.

pub mod decode;
mod client;
mod session;
mod transport;

pub use client::QrzClient;
pub use decode::{Envelope, RecordEnvelope, SessionEnvelope, SessionStatus};
pub use session::SessionStore;
pub use transport::{DEFAULT_TIMEOUT, HttpTransport, Transport};
