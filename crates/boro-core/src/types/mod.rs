//! Core directory types.
//!
//! These types enforce their invariants at construction time,
//! so invalid lookups never reach the network.

mod callsign;
mod endpoint_url;

pub use callsign::Callsign;
pub use endpoint_url::EndpointUrl;
