// src/endpoint.rs

//! Omnitruck endpoint facade
//!
//! Ties the pieces together for one request:
//! 1. Filters (already validated and normalized)
//! 2. Endpoint URL: `<base>/<project>/<suffix>`, plus query parameters in
//!    single-package mode
//! 3. One GET through the configured `Transport`
//! 4. Metadata or catalog parsing, depending on the mode

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::filters::FilterSet;
use crate::metadata::Metadata;
use crate::query::{build_url, endpoint_url};
use crate::transport::{HTTP_TIMEOUT, HttpTransport, Transport};
use serde::Serialize;
use std::time::Duration;
use tracing::info;
use url::Url;

/// Default Omnitruck base URL
pub const DEFAULT_BASE_URL: &str = "https://www.getchef.com/chef";

/// Path suffix of the single-package endpoint
pub const DEFAULT_METADATA_SUFFIX: &str = "metadata";

/// Path suffix of the full catalog endpoint
pub const DEFAULT_CATALOG_SUFFIX: &str = "full_list";

/// Where and how to reach the API
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    base_url: Url,
    metadata_suffix: String,
    catalog_suffix: String,
    timeout: Duration,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            metadata_suffix: DEFAULT_METADATA_SUFFIX.to_string(),
            catalog_suffix: DEFAULT_CATALOG_SUFFIX.to_string(),
            timeout: HTTP_TIMEOUT,
        }
    }
}

impl EndpointConfig {
    /// Use a different API base URL; must be absolute http(s)
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        let url = Url::parse(base_url)?;
        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            return Err(Error::ValidationError(format!(
                "Base URL must be an absolute http(s) URL: {}",
                base_url
            )));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(Error::ValidationError(format!(
                "Base URL must not carry a query or fragment: {}",
                base_url
            )));
        }
        self.base_url = url;
        Ok(self)
    }

    pub fn with_metadata_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.metadata_suffix = suffix.into();
        self
    }

    pub fn with_catalog_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.catalog_suffix = suffix.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Result of `Endpoint::resolve`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Resolved {
    Package(Metadata),
    Catalog(Catalog),
}

/// Client for one Omnitruck API
pub struct Endpoint<T = HttpTransport> {
    config: EndpointConfig,
    transport: T,
}

impl Endpoint<HttpTransport> {
    /// Create an endpoint backed by the HTTP transport
    pub fn new(config: EndpointConfig) -> Result<Self> {
        let transport = HttpTransport::with_timeout(config.timeout)?;
        Ok(Self { config, transport })
    }
}

impl<T: Transport> Endpoint<T> {
    pub fn with_transport(config: EndpointConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The URL a request for these filters goes to
    pub fn request_url(&self, filters: &FilterSet) -> Result<Url> {
        let project = filters.project_path();
        if filters.is_single_package() {
            let endpoint = endpoint_url(&self.config.base_url, &project, &self.config.metadata_suffix)?;
            build_url(&endpoint, filters)
        } else {
            endpoint_url(&self.config.base_url, &project, &self.config.catalog_suffix)
        }
    }

    /// Fetch the unparsed response body
    pub fn fetch_raw(&self, filters: &FilterSet) -> Result<String> {
        let url = self.request_url(filters)?;
        self.transport.fetch(&url)
    }

    /// Resolve a single package when the filters name a platform,
    /// otherwise the whole catalog
    pub fn resolve(&self, filters: &FilterSet) -> Result<Resolved> {
        if filters.is_single_package() {
            Ok(Resolved::Package(self.metadata(filters)?))
        } else {
            Ok(Resolved::Catalog(self.catalog(filters)?))
        }
    }

    /// Resolve a single package; the filters must carry a platform triple
    pub fn metadata(&self, filters: &FilterSet) -> Result<Metadata> {
        if !filters.is_single_package() {
            return Err(Error::ValidationError(
                "platform, platform_version and machine_arch are required for a metadata query"
                    .to_string(),
            ));
        }

        let metadata = Metadata::parse(&self.fetch_raw(filters)?)?;
        info!(
            "Resolved {} {} (build {})",
            filters.project(),
            metadata.version(),
            metadata.build().unwrap_or("unknown")
        );
        Ok(metadata)
    }

    /// Fetch the full catalog for the filters' project
    pub fn catalog(&self, filters: &FilterSet) -> Result<Catalog> {
        let url = endpoint_url(
            &self.config.base_url,
            &filters.project_path(),
            &self.config.catalog_suffix,
        )?;
        let catalog = Catalog::parse(&self.transport.fetch(&url)?)?;
        info!("Listed {} packages for {}", catalog.len(), filters.project());
        Ok(catalog)
    }
}
