// src/transport.rs

//! HTTP transport for catalog requests
//!
//! The client only ever issues a single GET per request and needs the body
//! as text. Anything that can do that implements `Transport`; the default
//! is a blocking reqwest client.

use crate::error::{Error, Result};
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Default timeout for HTTP requests (30 seconds)
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetch the body of a URL as text
///
/// Failures of any kind are reported as `Error::TransportError`.
pub trait Transport {
    fn fetch(&self, url: &Url) -> Result<String>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn fetch(&self, url: &Url) -> Result<String> {
        (**self).fetch(url)
    }
}

/// Blocking reqwest transport. No retries.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport with the default timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(HTTP_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("omnitruck/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::TransportError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn fetch(&self, url: &Url) -> Result<String> {
        info!("Fetching {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| Error::TransportError(format!("Failed to fetch {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::TransportError(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let body = response
            .text()
            .map_err(|e| Error::TransportError(format!("Failed to read response: {}", e)))?;

        debug!("Received {} bytes from {}", body.len(), url);
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_transport() {
        assert!(HttpTransport::new().is_ok());
        assert!(HttpTransport::with_timeout(Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn test_unreachable_host_is_transport_error() {
        let transport = HttpTransport::with_timeout(Duration::from_secs(2)).unwrap();
        let url = Url::parse("http://[::]:0/chef/metadata").unwrap();
        assert!(matches!(
            transport.fetch(&url),
            Err(Error::TransportError(_))
        ));
    }
}
