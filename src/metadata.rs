// src/metadata.rs

//! Single-package metadata parsing
//!
//! A metadata response is one record per line, `<key> <value>`:
//!
//! ```text
//! sha1 0b3f6c0e...
//! sha256 4f5a6f7d...
//! url https://example.com/el/6/x86_64/chef-12.1.0-1.el6.x86_64.rpm
//! version 12.1.0
//! ```
//!
//! Keys are open-ended. When a `url` record is seen, the filename, version
//! and build decomposed from it are merged into the map at that point, so
//! they replace any earlier record with the same key (last wins).

use crate::error::{Error, Result};
use crate::filters::DEFAULT_VERSION;
use crate::package_url::decompose;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::debug;

/// A metadata value: `true`/`false` become booleans, everything else is text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataValue {
    Bool(bool),
    Text(String),
}

impl MetadataValue {
    fn from_token(token: &str) -> Self {
        match token {
            "true" => MetadataValue::Bool(true),
            "false" => MetadataValue::Bool(false),
            other => MetadataValue::Text(other.to_string()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(s) => Some(s),
            MetadataValue::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MetadataValue::Bool(b) => Some(*b),
            MetadataValue::Text(_) => None,
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Bool(b) => write!(f, "{}", b),
            MetadataValue::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for MetadataValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            MetadataValue::Bool(b) => serializer.serialize_bool(*b),
            MetadataValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// Parsed metadata for one resolved package
///
/// Entries keep the position of the first occurrence of each key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: Vec<(String, MetadataValue)>,
}

impl Metadata {
    /// Parse a metadata response
    ///
    /// Empty lines are skipped. Any other line must hold exactly two
    /// whitespace-separated tokens, otherwise the whole parse fails.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut metadata = Metadata::default();

        for (index, line) in raw.lines().enumerate() {
            if line.is_empty() {
                continue;
            }

            let tokens: Vec<&str> = line.split_whitespace().collect();
            let [key, value] = tokens.as_slice() else {
                return Err(Error::ParseError(format!(
                    "Line {}: expected '<key> <value>', found {} token(s): '{}'",
                    index + 1,
                    tokens.len(),
                    line
                )));
            };

            let key = key.to_lowercase();
            metadata.insert(&key, MetadataValue::from_token(value));

            if key == "url" {
                let package = decompose(value)?;
                metadata.insert("filename", MetadataValue::Text(package.filename));
                metadata.insert("version", MetadataValue::Text(package.version));
                metadata.insert("build", MetadataValue::Text(package.build));
            }
        }

        debug!("Parsed {} metadata fields", metadata.len());
        Ok(metadata)
    }

    fn insert(&mut self, key: &str, value: MetadataValue) {
        match self.entries.iter().position(|(k, _)| k == key) {
            Some(pos) => self.entries[pos].1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Text value of a field, `NotFoundError` if absent or not text
    pub fn text(&self, key: &str) -> Result<&str> {
        self.get(key)
            .and_then(MetadataValue::as_str)
            .ok_or_else(|| Error::NotFoundError(format!("Metadata has no '{}' field", key)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetadataValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Package version, "latest" when the response has none
    pub fn version(&self) -> &str {
        self.text("version").unwrap_or(DEFAULT_VERSION)
    }

    pub fn build(&self) -> Result<&str> {
        self.text("build")
    }

    pub fn filename(&self) -> Result<&str> {
        self.text("filename")
    }

    pub fn url(&self) -> Result<&str> {
        self.text("url")
    }

    pub fn sha1(&self) -> Result<&str> {
        self.text("sha1")
    }

    pub fn sha256(&self) -> Result<&str> {
        self.text("sha256")
    }

    pub fn platform(&self) -> Result<&str> {
        self.text("platform")
    }

    pub fn platform_version(&self) -> Result<&str> {
        self.text("platform_version")
    }

    pub fn machine_arch(&self) -> Result<&str> {
        self.text("machine_arch")
    }

    pub fn prerelease(&self) -> bool {
        self.flag("prerelease")
    }

    pub fn nightlies(&self) -> bool {
        self.flag("nightlies")
    }

    fn flag(&self, key: &str) -> bool {
        self.get(key)
            .and_then(MetadataValue::as_bool)
            .unwrap_or(false)
    }

    /// Check a downloaded package against the `sha256` field
    pub fn verify_sha256(&self, path: &Path) -> Result<()> {
        use sha2::{Digest, Sha256};

        let expected = self.sha256()?;
        debug!("Verifying checksum for {}", path.display());

        let mut file = File::open(path)?;
        let mut hasher = Sha256::new();
        io::copy(&mut file, &mut hasher)?;
        let actual = format!("{:x}", hasher.finalize());

        if !actual.eq_ignore_ascii_case(expected) {
            return Err(Error::ValidationError(format!(
                "Checksum mismatch for {}: expected {}, got {}",
                path.display(),
                expected,
                actual
            )));
        }

        debug!("Checksum verified: {}", expected);
        Ok(())
    }
}

impl Serialize for Metadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const RESPONSE: &str = "sha1 0b3f6c0e\n\
        sha256 4f5a6f7d\n\
        url https://opscode-omnibus-packages.s3.amazonaws.com/el/6/x86_64/chef-12.1.0-1.el6.x86_64.rpm\n\
        version 12.1.0\n";

    #[test]
    fn test_parse_response() {
        let metadata = Metadata::parse(RESPONSE).unwrap();

        assert_eq!(metadata.sha1().unwrap(), "0b3f6c0e");
        assert_eq!(metadata.sha256().unwrap(), "4f5a6f7d");
        assert_eq!(metadata.version(), "12.1.0");
        assert_eq!(metadata.build().unwrap(), "1");
        assert_eq!(metadata.filename().unwrap(), "chef-12.1.0-1.el6.x86_64.rpm");
        assert!(metadata.url().unwrap().ends_with(".rpm"));
    }

    #[test]
    fn test_booleans_are_coerced() {
        let raw = "version 12.1.0\nprerelease false\nurl https://x/chef-12.1.0-2.el6.rpm\n";
        let metadata = Metadata::parse(raw).unwrap();

        assert_eq!(metadata.get("prerelease"), Some(&MetadataValue::Bool(false)));
        assert!(!metadata.prerelease());
        assert_eq!(metadata.version(), "12.1.0");
        assert_eq!(metadata.filename().unwrap(), "chef-12.1.0-2.el6.rpm");
        assert_eq!(metadata.build().unwrap(), "2");
    }

    #[test]
    fn test_url_fields_override_earlier_keys() {
        let raw = "version 1.0.0\nbuild 9\nurl https://x/chef-12.1.0-2.el6.rpm\n";
        let metadata = Metadata::parse(raw).unwrap();
        assert_eq!(metadata.version(), "12.1.0");
        assert_eq!(metadata.build().unwrap(), "2");

        // A later explicit record wins over the url-derived value
        let raw = "url https://x/chef-12.1.0-2.el6.rpm\nversion 1.0.0\n";
        let metadata = Metadata::parse(raw).unwrap();
        assert_eq!(metadata.version(), "1.0.0");
    }

    #[test]
    fn test_keys_are_lowercased_and_ordered() {
        let metadata = Metadata::parse("SHA1 abc\nmd5 def\n").unwrap();
        let keys: Vec<&str> = metadata.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["sha1", "md5"]);
    }

    #[test]
    fn test_malformed_lines_are_rejected() {
        assert!(matches!(
            Metadata::parse("version 12.1.0 extra\n"),
            Err(Error::ParseError(_))
        ));
        assert!(matches!(
            Metadata::parse("version\n"),
            Err(Error::ParseError(_))
        ));
        assert!(matches!(
            Metadata::parse("version 12.1.0\n   \n"),
            Err(Error::ParseError(_))
        ));
    }

    #[test]
    fn test_bad_url_fails_whole_parse() {
        let result = Metadata::parse("sha1 abc\nurl https://x/chef.rpm\n");
        assert!(matches!(result, Err(Error::ParseError(_))));
    }

    #[test]
    fn test_defaults_and_missing_fields() {
        let metadata = Metadata::parse("").unwrap();
        assert!(metadata.is_empty());
        assert_eq!(metadata.version(), "latest");
        assert!(!metadata.prerelease());
        assert!(!metadata.nightlies());
        assert!(matches!(metadata.build(), Err(Error::NotFoundError(_))));
        assert!(matches!(metadata.platform(), Err(Error::NotFoundError(_))));
    }

    #[test]
    fn test_serialize_to_json() {
        let metadata = Metadata::parse("nightlies true\nsha1 abc\n").unwrap();
        let json = serde_json::to_string(&metadata).unwrap();
        assert_eq!(json, r#"{"nightlies":true,"sha1":"abc"}"#);
    }

    #[test]
    fn test_verify_sha256() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"hello").unwrap();

        let good = Metadata::parse(
            "sha256 2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824\n",
        )
        .unwrap();
        assert!(good.verify_sha256(file.path()).is_ok());

        let bad = Metadata::parse("sha256 0000\n").unwrap();
        assert!(matches!(
            bad.verify_sha256(file.path()),
            Err(Error::ValidationError(_))
        ));

        let missing = Metadata::parse("sha1 abc\n").unwrap();
        assert!(matches!(
            missing.verify_sha256(file.path()),
            Err(Error::NotFoundError(_))
        ));
    }
}
