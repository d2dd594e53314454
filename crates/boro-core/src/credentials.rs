//! Directory login credentials.

use std::fmt;

use crate::types::EndpointUrl;

/// Credentials for the QRZ XML interface.
///
/// Holds the endpoint, the account username and password, and the agent
/// string identifying this program to the service. Immutable once built.
///
/// # Security
///
/// The password is never exposed in Debug output to prevent accidental logging.
///
/// # Example
///
/// ```
/// use boro_core::{Credentials, EndpointUrl};
///
/// let endpoint = EndpointUrl::new("https://xmldata.qrz.com/xml/current/").unwrap();
/// let creds = Credentials::new(endpoint, "N0CALL", "secret", "boro/0.1");
/// assert_eq!(creds.username(), "N0CALL");
/// ```
#[derive(Clone)]
pub struct Credentials {
    endpoint: EndpointUrl,
    username: String,
    password: String,
    agent: String,
}

impl Credentials {
    /// Create new credentials.
    ///
    /// Empty strings are not rejected here; the configuration layer validates
    /// them before a client is built.
    pub fn new(
        endpoint: EndpointUrl,
        username: impl Into<String>,
        password: impl Into<String>,
        agent: impl Into<String>,
    ) -> Self {
        Self {
            endpoint,
            username: username.into(),
            password: password.into(),
            agent: agent.into(),
        }
    }

    /// Returns the directory endpoint.
    pub fn endpoint(&self) -> &EndpointUrl {
        &self.endpoint
    }

    /// Returns the account username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password.
    ///
    /// # Security
    ///
    /// Use this only when constructing authentication requests.
    /// Never log or display this value.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Returns the client agent string.
    pub fn agent(&self) -> &str {
        &self.agent
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("agent", &self.agent)
            .finish()
    }
}
