//! Selecting rules by the release that introduced them.
//!
//! A requirement is either a semver requirement (`">=0.5.0, <0.7.0"`) or a
//! bare version, which means "introduced in that release or later".

use semver::{Version, VersionReq};
use std::fmt;

/// Errors parsing version selectors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// Invalid version requirement (e.g., ">=bad")
    InvalidRequirement { value: String, source: String },
}

impl fmt::Display for VersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionError::InvalidRequirement { value, source } => {
                write!(f, "invalid version requirement '{}': {}", value, source)
            }
        }
    }
}

impl std::error::Error for VersionError {}

/// Parse a `--since` selector. Empty input selects everything.
///
/// # Examples
///
/// ```
/// use aw_fix::config::version::{matches_requirement, parse_requirement};
/// use semver::Version;
///
/// let req = parse_requirement("0.5.0").unwrap();
/// assert!(matches_requirement(&Version::new(0, 6, 0), req.as_ref()));
/// assert!(!matches_requirement(&Version::new(0, 4, 0), req.as_ref()));
///
/// // No requirement means "every rule"
/// assert!(matches_requirement(&Version::new(0, 1, 0), None));
/// ```
pub fn parse_requirement(input: &str) -> Result<Option<VersionReq>, VersionError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    if let Ok(version) = Version::parse(input) {
        let req = VersionReq::parse(&format!(">={version}")).map_err(|e| {
            VersionError::InvalidRequirement {
                value: input.to_string(),
                source: e.to_string(),
            }
        })?;
        return Ok(Some(req));
    }

    VersionReq::parse(input)
        .map(Some)
        .map_err(|e| VersionError::InvalidRequirement {
            value: input.to_string(),
            source: e.to_string(),
        })
}

/// Check a rule's release against an optional requirement.
pub fn matches_requirement(introduced_in: &Version, requirement: Option<&VersionReq>) -> bool {
    requirement.map_or(true, |req| req.matches(introduced_in))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selects(version: (u64, u64, u64), input: &str) -> bool {
        let req = parse_requirement(input).unwrap();
        matches_requirement(&Version::new(version.0, version.1, version.2), req.as_ref())
    }

    #[test]
    fn test_empty_requirement() {
        assert_eq!(parse_requirement("").unwrap(), None);
        assert_eq!(parse_requirement("   ").unwrap(), None);
        assert!(selects((0, 1, 0), ""));
    }

    #[test]
    fn test_bare_version_means_at_least() {
        assert!(selects((0, 5, 0), "0.5.0"));
        assert!(selects((0, 7, 0), "0.5.0"));
        assert!(!selects((0, 4, 0), "0.5.0"));
    }

    #[test]
    fn test_compound_requirement() {
        let req = ">=0.2.0, <0.5.0";
        assert!(selects((0, 2, 0), req));
        assert!(selects((0, 4, 0), req));
        assert!(!selects((0, 5, 0), req));
        assert!(!selects((0, 1, 0), req));
    }

    #[test]
    fn test_invalid_requirement() {
        let result = parse_requirement(">=bad-version");
        assert!(matches!(
            result.unwrap_err(),
            VersionError::InvalidRequirement { .. }
        ));
    }
}
