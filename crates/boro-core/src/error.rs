//! Error types for boro.
//!
//! A single error type with explicit variants for network, HTTP status,
//! decoding, service-reported faults, authentication and input validation.

use thiserror::Error;

/// The unified error type for directory operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network failures (connection refused, DNS, TLS, timeout).
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    /// The service answered with a non-2xx HTTP status.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The service reported a fault inside an otherwise valid response.
    #[error("{0}")]
    Fault(#[from] SessionFault),

    /// Authentication failed or could not be re-established.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Caller supplied invalid input (callsign, endpoint URL).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

/// Network-level errors.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Connection could not be established.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Any other HTTP client failure (building the client, reading the body).
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// A non-2xx response from the directory service.
///
/// `url` never carries the query string, so credentials and session keys
/// stay out of diagnostics.
#[derive(Debug, Error)]
#[error("returned status code {status} from {url}")]
pub struct TransportError {
    /// HTTP status code.
    pub status: u16,
    /// Request URL without its query.
    pub url: String,
}

impl TransportError {
    /// Create a new transport error.
    pub fn new(status: u16, url: impl Into<String>) -> Self {
        Self {
            status,
            url: url.into(),
        }
    }
}

/// Response decoding errors.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The body was empty or held no elements.
    #[error("empty response")]
    Empty,

    /// The XML prolog declared an encoding we do not know.
    #[error("unsupported encoding '{label}'")]
    UnknownEncoding { label: String },

    /// The markup was not well formed.
    #[error("malformed XML: {message}")]
    Malformed { message: String },

    /// A required element was absent.
    #[error("missing element <{element}>")]
    MissingElement { element: &'static str },
}

/// A textual fault reported by the service.
///
/// Displayed verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SessionFault {
    /// The message from the service's `Error` element.
    pub message: String,
}

impl SessionFault {
    /// Create a new fault from a service message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The service rejected the credentials; the message is the service's.
    #[error("{0}")]
    Rejected(SessionFault),

    /// The session response carried neither a key nor a fault.
    #[error("no session key returned")]
    MissingKey,

    /// The session expired again right after re-authenticating.
    #[error("session expired")]
    SessionExpired,
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid callsign.
    #[error("invalid callsign '{value}': {reason}")]
    Callsign { value: String, reason: String },

    /// Invalid endpoint URL.
    #[error("invalid endpoint URL '{value}': {reason}")]
    EndpointUrl { value: String, reason: String },
}

impl Error {
    /// Returns the service fault carried by this error, if any.
    ///
    /// Both lookup faults and rejected logins carry one.
    pub fn fault(&self) -> Option<&SessionFault> {
        match self {
            Error::Fault(fault) | Error::Auth(AuthError::Rejected(fault)) => Some(fault),
            _ => None,
        }
    }
}
