//! HTTP transport for the QRZ XML interface.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderValue};
use tracing::{debug, instrument, trace};

use boro_core::error::{NetworkError, TransportError};
use boro_core::{EndpointUrl, Result};

/// Per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Sends one parameterized request to the directory and returns the raw body.
///
/// Implementations do not retry; retry policy lives in the client.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET with `params` as the query string.
    ///
    /// # Errors
    ///
    /// Returns a network error when the service is unreachable or times out,
    /// and a transport error for any status outside 200-299.
    async fn request(&self, params: &[(&str, &str)]) -> Result<Vec<u8>>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn request(&self, params: &[(&str, &str)]) -> Result<Vec<u8>> {
        (**self).request(params).await
    }
}

/// Production transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: EndpointUrl,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport for `endpoint`, identifying as `agent`.
    ///
    /// # Errors
    ///
    /// Returns a network error if the HTTP client cannot be built.
    pub fn new(endpoint: EndpointUrl, agent: &str) -> Result<Self> {
        Self::with_timeout(endpoint, agent, DEFAULT_TIMEOUT)
    }

    /// Like [`HttpTransport::new`], with a custom per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns a network error if the HTTP client cannot be built.
    pub fn with_timeout(endpoint: EndpointUrl, agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(agent)
            .timeout(timeout)
            .build()
            .map_err(|err| network_error(err, timeout))?;

        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip_all, fields(endpoint = %self.endpoint))]
    async fn request(&self, params: &[(&str, &str)]) -> Result<Vec<u8>> {
        debug!(
            params = ?params.iter().map(|(k, _)| *k).collect::<Vec<_>>(),
            "QRZ request"
        );

        let response = self
            .client
            .get(self.endpoint.as_url().clone())
            .query(params)
            .header(ACCEPT, HeaderValue::from_static("application/xml"))
            .send()
            .await
            .map_err(|err| network_error(err, self.timeout))?;

        let status = response.status();
        trace!(status = %status, "QRZ response");

        if !status.is_success() {
            let mut url = response.url().clone();
            url.set_query(None);
            return Err(TransportError::new(status.as_u16(), url.to_string()).into());
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| network_error(err, self.timeout))?;
        trace!(len = body.len(), "QRZ response body");

        Ok(body.to_vec())
    }
}

fn network_error(err: reqwest::Error, timeout: Duration) -> NetworkError {
    // The request URL carries credentials and the session key.
    let err = err.without_url();
    if err.is_timeout() {
        NetworkError::Timeout {
            duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    } else if err.is_connect() {
        NetworkError::Connection {
            message: err.to_string(),
        }
    } else {
        NetworkError::Http {
            message: err.to_string(),
        }
    }
}
