// src/package_url.rs

//! Package download URL decomposition
//!
//! Package filenames follow `<name>-<version>-<build>.<ext>`, sometimes with
//! `_`-separated qualifiers (`chefdk_0.4.0-1_amd64.deb`). The version and
//! build are read positionally from the filename.

use crate::error::{Error, Result};
use serde::Serialize;

/// Filename, version and build derived from a package URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageDescriptor {
    pub filename: String,
    /// Empty when the `-` token carries no version text
    pub version: String,
    /// Empty when the `-` token carries no build text
    pub build: String,
}

/// Decompose a package download URL
///
/// Fails with `ParseError` when the URL is empty, not valid percent-encoded
/// UTF-8, or its filename has fewer than two `-`-separated tokens.
pub fn decompose(url: &str) -> Result<PackageDescriptor> {
    let decoded = urlencoding::decode(url)
        .map_err(|e| Error::ParseError(format!("Invalid package URL '{}': {}", url, e)))?;

    let filename = split_fields(&decoded, '/')
        .pop()
        .ok_or_else(|| Error::ParseError(format!("No filename in package URL '{}'", url)))?
        .to_string();

    let tokens = split_fields(&filename, '-');
    if tokens.len() < 2 {
        return Err(Error::ParseError(format!(
            "Package filename '{}' does not look like <name>-<version>-<build>",
            filename
        )));
    }

    let version = split_fields(tokens[tokens.len() - 2], '_')
        .pop()
        .unwrap_or("")
        .to_string();

    let build = split_fields(tokens[tokens.len() - 1], '.')
        .first()
        .and_then(|head| split_fields(head, '_').first().copied())
        .unwrap_or("")
        .to_string();

    Ok(PackageDescriptor {
        filename,
        version,
        build,
    })
}

/// Split on `sep`, dropping trailing empty fields
fn split_fields(s: &str, sep: char) -> Vec<&str> {
    let mut fields: Vec<&str> = s.split(sep).collect();
    while fields.last().is_some_and(|f| f.is_empty()) {
        fields.pop();
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decompose_rpm_url() {
        let pkg = decompose("https://x/el/6/i686/chef-10.12.0-1.el6.i686.rpm").unwrap();
        assert_eq!(pkg.filename, "chef-10.12.0-1.el6.i686.rpm");
        assert_eq!(pkg.version, "10.12.0");
        assert_eq!(pkg.build, "1");
    }

    #[test]
    fn test_decompose_deb_with_qualifiers() {
        let pkg = decompose(
            "https://opscode-omnibus-packages.s3.amazonaws.com/ubuntu/12.04/x86_64/chefdk_0.4.0-1_amd64.deb",
        )
        .unwrap();
        assert_eq!(pkg.filename, "chefdk_0.4.0-1_amd64.deb");
        assert_eq!(pkg.version, "0.4.0");
        assert_eq!(pkg.build, "1");
    }

    #[test]
    fn test_decompose_percent_encoded_url() {
        let pkg = decompose("https://x/mac_os_x/10.9/x86_64/chef-12.1.0%2B20150310-1.dmg").unwrap();
        assert_eq!(pkg.filename, "chef-12.1.0+20150310-1.dmg");
        assert_eq!(pkg.version, "12.1.0+20150310");
        assert_eq!(pkg.build, "1");
    }

    #[test]
    fn test_decompose_multi_dash_name() {
        let pkg = decompose("https://x/windows/2008r2/x86_64/chef-client-12.1.0-1.msi").unwrap();
        assert_eq!(pkg.version, "12.1.0");
        assert_eq!(pkg.build, "1");
    }

    #[test]
    fn test_decompose_relative_path() {
        let pkg = decompose("/el/6/i686/chef-10.12.0-1.el6.i686.rpm").unwrap();
        assert_eq!(pkg.filename, "chef-10.12.0-1.el6.i686.rpm");
    }

    #[test]
    fn test_decompose_degraded_fields() {
        let pkg = decompose("https://x/chef_-.rpm").unwrap();
        assert_eq!(pkg.filename, "chef_-.rpm");
        assert_eq!(pkg.version, "chef");
        assert_eq!(pkg.build, "");
    }

    #[test]
    fn test_decompose_rejects_malformed_filename() {
        assert!(matches!(
            decompose("https://x/el/6/chef.rpm"),
            Err(Error::ParseError(_))
        ));
        assert!(matches!(decompose(""), Err(Error::ParseError(_))));
    }
}
