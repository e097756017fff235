// src/lib.rs

//! Omnitruck Catalog Client
//!
//! Resolves package builds from an Omnitruck-style distribution catalog
//! and decodes the metadata it returns.
//!
//! # Architecture
//!
//! - Filters: immutable, validated on construction
//! - Platform versions: normalized to the vocabulary the API expects
//! - Queries: a base endpoint plus six form-encoded parameters
//! - Responses: line-oriented metadata or a nested JSON catalog
//! - Transport: a single blocking GET behind the `Transport` trait

pub mod catalog;
pub mod endpoint;
mod error;
pub mod filters;
pub mod metadata;
pub mod package_url;
pub mod platform;
pub mod query;
pub mod transport;

pub use catalog::Catalog;
pub use endpoint::{Endpoint, EndpointConfig, Resolved};
pub use error::{Error, Result};
pub use filters::{FilterSet, FilterSetBuilder, Target};
pub use metadata::{Metadata, MetadataValue};
pub use package_url::PackageDescriptor;
pub use transport::{HttpTransport, Transport};
