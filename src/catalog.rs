// src/catalog.rs

//! Full package catalog parsing
//!
//! A catalog response is a JSON object nested four levels deep:
//! platform -> platform version -> machine architecture -> package version,
//! with the package download URL at each leaf.
//!
//! ```json
//! {"el": {"6": {"x86_64": {"12.1.0-1": "/el/6/x86_64/chef-12.1.0-1.el6.x86_64.rpm"}}}}
//! ```

use crate::error::{Error, Result};
use crate::package_url::{PackageDescriptor, decompose};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// package version -> download URL
pub type PackageVersions = BTreeMap<String, String>;
/// machine architecture -> package versions
pub type Architectures = BTreeMap<String, PackageVersions>;
/// platform version -> architectures
pub type PlatformVersions = BTreeMap<String, Architectures>;

/// Parsed package catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    platforms: BTreeMap<String, PlatformVersions>,
}

/// One flattened catalog leaf
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry<'a> {
    pub platform: &'a str,
    pub platform_version: &'a str,
    pub machine_arch: &'a str,
    pub version: &'a str,
    pub url: &'a str,
}

impl Catalog {
    /// Parse a catalog response
    pub fn parse(raw: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(raw)
            .map_err(|e| Error::ParseError(format!("Invalid catalog document: {}", e)))?;
        debug!(
            "Parsed catalog with {} platforms and {} packages",
            catalog.platforms.len(),
            catalog.len()
        );
        Ok(catalog)
    }

    pub fn platforms(&self) -> impl Iterator<Item = &str> {
        self.platforms.keys().map(String::as_str)
    }

    pub fn platform_versions(&self, platform: &str) -> Result<impl Iterator<Item = &str>> {
        Ok(self.platform(platform)?.keys().map(String::as_str))
    }

    pub fn architectures(
        &self,
        platform: &str,
        platform_version: &str,
    ) -> Result<impl Iterator<Item = &str>> {
        Ok(self
            .architecture_map(platform, platform_version)?
            .keys()
            .map(String::as_str))
    }

    pub fn package_versions(
        &self,
        platform: &str,
        platform_version: &str,
        machine_arch: &str,
    ) -> Result<impl Iterator<Item = &str>> {
        Ok(self
            .package_map(platform, platform_version, machine_arch)?
            .keys()
            .map(String::as_str))
    }

    /// Download URL for one package
    ///
    /// Fails with `NotFoundError` naming the first missing level.
    pub fn get(
        &self,
        platform: &str,
        platform_version: &str,
        machine_arch: &str,
        version: &str,
    ) -> Result<&str> {
        self.package_map(platform, platform_version, machine_arch)?
            .get(version)
            .map(String::as_str)
            .ok_or_else(|| {
                Error::NotFoundError(format!(
                    "No package version '{}' for {} {} {}",
                    version, platform, platform_version, machine_arch
                ))
            })
    }

    /// Like `get`, but absent keys at any level give `None`
    pub fn find(
        &self,
        platform: &str,
        platform_version: &str,
        machine_arch: &str,
        version: &str,
    ) -> Option<&str> {
        self.platforms
            .get(platform)?
            .get(platform_version)?
            .get(machine_arch)?
            .get(version)
            .map(String::as_str)
    }

    /// Filename, version and build of one package
    pub fn descriptor(
        &self,
        platform: &str,
        platform_version: &str,
        machine_arch: &str,
        version: &str,
    ) -> Result<PackageDescriptor> {
        decompose(self.get(platform, platform_version, machine_arch, version)?)
    }

    /// Every leaf of the catalog, in key order
    pub fn packages(&self) -> Vec<CatalogEntry<'_>> {
        let mut entries = Vec::new();
        for (platform, versions) in &self.platforms {
            for (platform_version, arches) in versions {
                for (machine_arch, packages) in arches {
                    for (version, url) in packages {
                        entries.push(CatalogEntry {
                            platform,
                            platform_version,
                            machine_arch,
                            version,
                            url,
                        });
                    }
                }
            }
        }
        entries
    }

    /// Number of packages in the catalog
    pub fn len(&self) -> usize {
        self.platforms
            .values()
            .flat_map(|versions| versions.values())
            .flat_map(|arches| arches.values())
            .map(|packages| packages.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn platform(&self, platform: &str) -> Result<&PlatformVersions> {
        self.platforms
            .get(platform)
            .ok_or_else(|| Error::NotFoundError(format!("No platform '{}' in catalog", platform)))
    }

    fn architecture_map(&self, platform: &str, platform_version: &str) -> Result<&Architectures> {
        self.platform(platform)?
            .get(platform_version)
            .ok_or_else(|| {
                Error::NotFoundError(format!(
                    "No platform version '{}' for {}",
                    platform_version, platform
                ))
            })
    }

    fn package_map(
        &self,
        platform: &str,
        platform_version: &str,
        machine_arch: &str,
    ) -> Result<&PackageVersions> {
        self.architecture_map(platform, platform_version)?
            .get(machine_arch)
            .ok_or_else(|| {
                Error::NotFoundError(format!(
                    "No architecture '{}' for {} {}",
                    machine_arch, platform, platform_version
                ))
            })
    }
}
