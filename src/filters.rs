// src/filters.rs

//! Request filters
//!
//! A `FilterSet` describes one request: which project, which package
//! version, and (optionally) which platform triple. With a platform triple
//! the request resolves a single package; without one it lists the catalog.
//!
//! Filters are built with `FilterSetBuilder` and are immutable afterwards.
//! The platform version is normalized once, at build time.

use crate::error::{Error, Result};
use crate::platform::normalize_platform_version;
use serde::Serialize;
use url::Url;

/// Package version requested when none is given
pub const DEFAULT_VERSION: &str = "latest";

/// Platform, platform version and machine architecture of a package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    pub platform: String,
    /// Already normalized (see `platform::normalize_platform_version`)
    pub platform_version: String,
    pub machine_arch: String,
}

/// Validated, immutable request filters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSet {
    project: String,
    version: String,
    prerelease: bool,
    nightlies: bool,
    target: Option<Target>,
}

impl FilterSet {
    /// Start building filters for a project
    pub fn builder(project: impl Into<String>) -> FilterSetBuilder {
        FilterSetBuilder::new(project)
    }

    /// Project name as supplied (e.g. "chef_dk")
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Project name as it appears in endpoint paths (e.g. "chef-dk")
    pub fn project_path(&self) -> String {
        self.project.replace('_', "-")
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn prerelease(&self) -> bool {
        self.prerelease
    }

    pub fn nightlies(&self) -> bool {
        self.nightlies
    }

    /// Platform triple, present only in single-package mode
    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    /// True when the filters resolve a single package rather than a catalog
    pub fn is_single_package(&self) -> bool {
        self.target.is_some()
    }

    /// Recover filters from a query URL built by `query::build_url`
    ///
    /// Values are taken as-is; the platform version in the URL is already
    /// normalized and is not normalized a second time.
    pub fn from_query_url(project: impl Into<String>, url: &Url) -> Result<Self> {
        let mut builder = FilterSetBuilder::new(project);
        let mut platform = None;
        let mut platform_version = None;
        let mut machine_arch = None;

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "v" => builder = builder.version(value.into_owned()),
                "prerelease" => builder = builder.prerelease(parse_bool("prerelease", &value)?),
                "nightlies" => builder = builder.nightlies(parse_bool("nightlies", &value)?),
                "p" => platform = Some(value.into_owned()),
                "pv" => platform_version = Some(value.into_owned()),
                "m" => machine_arch = Some(value.into_owned()),
                _ => {}
            }
        }

        let project = validate_project(builder.project)?;
        let version = validate_version(builder.version)?;
        let target = require_target(platform, platform_version, machine_arch)?;

        Ok(Self {
            project,
            version,
            prerelease: builder.prerelease,
            nightlies: builder.nightlies,
            target,
        })
    }
}

/// Builder for `FilterSet`
///
/// Defaults: version "latest", prerelease and nightlies off, no platform.
#[derive(Debug, Clone)]
pub struct FilterSetBuilder {
    project: String,
    version: String,
    prerelease: bool,
    nightlies: bool,
    platform: Option<String>,
    platform_version: Option<String>,
    machine_arch: Option<String>,
}

impl FilterSetBuilder {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            version: DEFAULT_VERSION.to_string(),
            prerelease: false,
            nightlies: false,
            platform: None,
            platform_version: None,
            machine_arch: None,
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn prerelease(mut self, prerelease: bool) -> Self {
        self.prerelease = prerelease;
        self
    }

    pub fn nightlies(mut self, nightlies: bool) -> Self {
        self.nightlies = nightlies;
        self
    }

    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    /// Raw platform version as reported by the host
    pub fn platform_version(mut self, platform_version: impl Into<String>) -> Self {
        self.platform_version = Some(platform_version.into());
        self
    }

    pub fn machine_arch(mut self, machine_arch: impl Into<String>) -> Self {
        self.machine_arch = Some(machine_arch.into());
        self
    }

    /// Set the whole platform triple at once
    pub fn target(
        self,
        platform: impl Into<String>,
        platform_version: impl Into<String>,
        machine_arch: impl Into<String>,
    ) -> Self {
        self.platform(platform)
            .platform_version(platform_version)
            .machine_arch(machine_arch)
    }

    /// Validate and normalize into an immutable `FilterSet`
    ///
    /// Platform, platform version and machine architecture must be given
    /// together or not at all.
    pub fn build(self) -> Result<FilterSet> {
        let project = validate_project(self.project)?;
        let version = validate_version(self.version)?;

        let target = match require_target(self.platform, self.platform_version, self.machine_arch)? {
            Some(raw) => {
                let platform_version =
                    normalize_platform_version(&raw.platform, &raw.platform_version)?;
                Some(Target {
                    platform_version,
                    ..raw
                })
            }
            None => None,
        };

        Ok(FilterSet {
            project,
            version,
            prerelease: self.prerelease,
            nightlies: self.nightlies,
            target,
        })
    }
}

fn validate_project(project: String) -> Result<String> {
    if project.is_empty() {
        return Err(Error::ValidationError(
            "Project name must not be empty".to_string(),
        ));
    }
    if project.contains(|c: char| c == '/' || c.is_whitespace()) {
        return Err(Error::ValidationError(format!(
            "Invalid project name '{}'",
            project
        )));
    }
    Ok(project)
}

fn validate_version(version: String) -> Result<String> {
    if version.trim().is_empty() {
        return Err(Error::ValidationError(
            "Package version must not be empty".to_string(),
        ));
    }
    Ok(version)
}

/// Enforce the all-or-nothing platform triple
fn require_target(
    platform: Option<String>,
    platform_version: Option<String>,
    machine_arch: Option<String>,
) -> Result<Option<Target>> {
    match (platform, platform_version, machine_arch) {
        (Some(platform), Some(platform_version), Some(machine_arch)) => Ok(Some(Target {
            platform,
            platform_version,
            machine_arch,
        })),
        (None, None, None) => Ok(None),
        (platform, platform_version, machine_arch) => {
            let missing: Vec<&str> = [
                ("platform", platform.is_none()),
                ("platform_version", platform_version.is_none()),
                ("machine_arch", machine_arch.is_none()),
            ]
            .iter()
            .filter(|(_, absent)| *absent)
            .map(|(name, _)| *name)
            .collect();
            Err(Error::ValidationError(format!(
                "Missing required filter(s): {}",
                missing.join(", ")
            )))
        }
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(Error::ValidationError(format!(
            "Expected true or false for {}, got '{}'",
            name, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let filters = FilterSet::builder("chef").build().unwrap();
        assert_eq!(filters.project(), "chef");
        assert_eq!(filters.version(), "latest");
        assert!(!filters.prerelease());
        assert!(!filters.nightlies());
        assert!(filters.target().is_none());
        assert!(!filters.is_single_package());
    }

    #[test]
    fn test_full_target_is_normalized() {
        let filters = FilterSet::builder("chef_dk")
            .version("0.3.0")
            .prerelease(true)
            .target("mac_os_x", "10.9.5", "x86_64")
            .build()
            .unwrap();

        let target = filters.target().unwrap();
        assert_eq!(target.platform, "mac_os_x");
        assert_eq!(target.platform_version, "10.9");
        assert_eq!(target.machine_arch, "x86_64");
        assert!(filters.prerelease());
        assert!(filters.is_single_package());
    }

    #[test]
    fn test_project_path_uses_hyphens() {
        let filters = FilterSet::builder("chef_container").build().unwrap();
        assert_eq!(filters.project_path(), "chef-container");
    }

    #[test]
    fn test_partial_target_is_rejected() {
        let result = FilterSet::builder("chef")
            .platform("ubuntu")
            .platform_version("14.04")
            .build();
        match result {
            Err(Error::ValidationError(msg)) => assert!(msg.contains("machine_arch")),
            other => panic!("expected validation error, got {:?}", other),
        }

        let result = FilterSet::builder("chef").machine_arch("x86_64").build();
        assert!(matches!(result, Err(Error::ValidationError(_))));
    }

    #[test]
    fn test_unmapped_windows_version_is_rejected() {
        let result = FilterSet::builder("chef")
            .target("windows", "9.9", "x86_64")
            .build();
        assert!(matches!(result, Err(Error::ValidationError(_))));
    }

    #[test]
    fn test_invalid_project_is_rejected() {
        assert!(matches!(
            FilterSet::builder("").build(),
            Err(Error::ValidationError(_))
        ));
        assert!(matches!(
            FilterSet::builder("chef/dk").build(),
            Err(Error::ValidationError(_))
        ));
    }

    #[test]
    fn test_from_query_url() {
        let url = Url::parse(
            "https://example.com/chef/metadata?v=12.1.0&prerelease=true&nightlies=false&p=el&pv=6&m=x86_64",
        )
        .unwrap();
        let filters = FilterSet::from_query_url("chef", &url).unwrap();

        assert_eq!(filters.version(), "12.1.0");
        assert!(filters.prerelease());
        assert!(!filters.nightlies());
        let target = filters.target().unwrap();
        assert_eq!(target.platform, "el");
        assert_eq!(target.platform_version, "6");
        assert_eq!(target.machine_arch, "x86_64");
    }

    #[test]
    fn test_from_query_url_rejects_bad_bool() {
        let url = Url::parse("https://example.com/chef/metadata?prerelease=yes").unwrap();
        assert!(matches!(
            FilterSet::from_query_url("chef", &url),
            Err(Error::ValidationError(_))
        ));
    }

    #[test]
    fn test_empty_version_is_rejected_both_ways() {
        assert!(matches!(
            FilterSet::builder("chef").version(" ").build(),
            Err(Error::ValidationError(_))
        ));

        let url = Url::parse("https://example.com/chef/metadata?v=&p=el&pv=6&m=x86_64").unwrap();
        assert!(matches!(
            FilterSet::from_query_url("chef", &url),
            Err(Error::ValidationError(_))
        ));
    }
}
