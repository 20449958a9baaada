//! Semantic version parsing and ordering for release identifiers.

use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::str::FromStr;

static VERSION_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^v?(\d+)\.(\d+)\.(\d+)").expect("static version pattern"));

/// Error returned for release identifiers that are not `vMAJOR.MINOR.PATCH`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version format: {0}")]
pub struct VersionError(pub String);

/// A parsed `vMAJOR.MINOR.PATCH` release identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let captures = VERSION_PATTERN.captures(value).ok_or_else(|| VersionError(value.to_string()))?;
        let component = |index: usize| {
            captures
                .get(index)
                .expect("captured component")
                .as_str()
                .parse::<u64>()
                .map_err(|_| VersionError(value.to_string()))
        };
        Ok(Version {
            major: component(1)?,
            minor: component(2)?,
            patch: component(3)?,
        })
    }
}

/// Compare two release identifiers numerically.
pub fn compare_versions(left: &str, right: &str) -> Result<Ordering, VersionError> {
    let left: Version = left.parse()?;
    let right: Version = right.parse()?;
    Ok(left.cmp(&right))
}
