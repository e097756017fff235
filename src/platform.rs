// src/platform.rs

//! Platform version normalization
//!
//! Omnitruck indexes most platforms by the version string the host reports,
//! but two platforms use a different vocabulary:
//! - `mac_os_x`: only `<major>.<minor>` is significant ("10.9.5" -> "10.9")
//! - `windows`: kernel versions map to server release names ("6.1" -> "2008r2")

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Platform name for Apple macOS hosts
pub const MAC_OS_X: &str = "mac_os_x";

/// Platform name for Microsoft Windows hosts
pub const WINDOWS: &str = "windows";

static MAJOR_MINOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+\.[0-9]+").unwrap());

/// Windows kernel version to release name.
///
/// Client and server releases share kernel versions; the server name wins.
const WINDOWS_RELEASES: &[(&str, &str)] = &[
    ("6.3", "2012r2"),
    ("6.2", "2012"),
    ("6.1", "2008r2"),
    ("6.0", "2008"),
    ("5.2", "2003r2"),
    ("5.1", "xp"),
    ("5.0", "2000"),
];

/// Normalize a raw platform version into the form the API expects
///
/// Platforms other than `mac_os_x` and `windows` pass through unchanged.
/// A Windows version whose `<major>.<minor>` has no release name is a
/// `ValidationError`.
pub fn normalize_platform_version(platform: &str, raw_version: &str) -> Result<String> {
    let normalized = match platform {
        MAC_OS_X => major_minor(raw_version).to_string(),
        WINDOWS => windows_release(raw_version)
            .ok_or_else(|| {
                Error::ValidationError(format!(
                    "No Windows release known for platform version '{}'",
                    raw_version
                ))
            })?
            .to_string(),
        _ => raw_version.to_string(),
    };

    if normalized != raw_version {
        debug!(
            "Normalized {} version '{}' to '{}'",
            platform, raw_version, normalized
        );
    }
    Ok(normalized)
}

/// Leading `<major>.<minor>` of a version string, or "" if there is none
pub fn major_minor(version: &str) -> &str {
    MAJOR_MINOR
        .find(version)
        .map(|m| m.as_str())
        .unwrap_or("")
}

/// Release name for a Windows kernel version, if one is known
pub fn windows_release(version: &str) -> Option<&'static str> {
    let prefix = major_minor(version);
    WINDOWS_RELEASES
        .iter()
        .find(|(kernel, _)| *kernel == prefix)
        .map(|(_, release)| *release)
}
