//! boro-core - Core types for the callsign directory client.

pub mod credentials;
pub mod error;
pub mod lookup;
pub mod tokens;
pub mod types;

pub use credentials::Credentials;
pub use error::Error;
pub use lookup::LookupResult;
pub use tokens::SessionKey;
pub use types::{Callsign, EndpointUrl};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
