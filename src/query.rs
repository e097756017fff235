// src/query.rs

//! Request URL construction
//!
//! Endpoints live at `<base>/<project>/<suffix>`, where the project name
//! uses hyphens instead of underscores. Single-package requests add six
//! form-encoded query parameters: `v`, `prerelease`, `nightlies`, `p`,
//! `pv` and `m`.

use crate::error::{Error, Result};
use crate::filters::FilterSet;
use tracing::debug;
use url::Url;

/// Resolve the endpoint URL for a project and mode suffix
///
/// The project becomes one path segment, so reserved characters in it are
/// percent-encoded. Any query or fragment on the base URL is dropped.
pub fn endpoint_url(base_url: &Url, project_path: &str, suffix: &str) -> Result<Url> {
    let mut url = base_url.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| {
            Error::ValidationError(format!("Base URL cannot carry a path: {}", base_url))
        })?
        .pop_if_empty()
        .push(project_path.trim_matches('/'))
        .extend(suffix.split('/').filter(|s| !s.is_empty()));
    Ok(url)
}

/// Append the single-package query parameters to an endpoint URL
///
/// Fails with `ValidationError` when the filters carry no platform triple.
pub fn build_url(endpoint: &Url, filters: &FilterSet) -> Result<Url> {
    let target = filters.target().ok_or_else(|| {
        Error::ValidationError(
            "platform, platform_version and machine_arch are required for a metadata query"
                .to_string(),
        )
    })?;

    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .clear()
        .append_pair("v", filters.version())
        .append_pair("prerelease", bool_param(filters.prerelease()))
        .append_pair("nightlies", bool_param(filters.nightlies()))
        .append_pair("p", &target.platform)
        .append_pair("pv", &target.platform_version)
        .append_pair("m", &target.machine_arch);

    debug!("Built query URL: {}", url);
    Ok(url)
}

fn bool_param(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}
