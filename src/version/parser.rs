//! Version string parsing with Composer-compatible stability rules.

use super::Stability;
use crate::error::{Result, VersionError};
use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

static MODIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)[._-]?(?:(stable|beta|b|rc|alpha|a|patch|pl|p)((?:[.-]?\d+)*)?)?([.-]?dev)?(?:\+.*)?$",
    )
    .expect("stability modifier regex is valid")
});

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^v?(\d+)(?:\.(\d+))?(?:\.(\d+))?(?:\.(\d+))?(?:[._-]?(stable|beta|b|rc|alpha|a|patch|pl|p)(?:[.-]?(\d+))?)?(?:[.-]?(dev))?$",
    )
    .expect("version regex is valid")
});

/// A platform version with up to four numeric components.
///
/// Ordered by components, then stability, then stability number, so
/// `6.4.0.0-RC1 < 6.4.0.0-RC2 < 6.4.0.0`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReleaseVersion {
    parts: [u64; 4],
    stability: Stability,
    stability_number: Option<u64>,
}

impl ReleaseVersion {
    /// Numeric components (missing ones are zero)
    pub fn parts(&self) -> [u64; 4] {
        self.parts
    }

    /// Stability of this version
    pub fn stability(&self) -> Stability {
        self.stability
    }

    /// Number following the stability modifier (`2` in `RC2`)
    pub fn stability_number(&self) -> Option<u64> {
        self.stability_number
    }

    /// Whether this is a stable release
    pub fn is_stable(&self) -> bool {
        self.stability == Stability::Stable
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.parts;
        write!(f, "{a}.{b}.{c}.{d}")?;
        if self.stability != Stability::Stable {
            write!(f, "-{}", self.stability)?;
            if let Some(n) = self.stability_number {
                write!(f, "{n}")?;
            }
        }
        Ok(())
    }
}

impl Serialize for ReleaseVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parser for release tags and version constraints
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionParser;

impl VersionParser {
    /// Create a parser
    pub fn new() -> Self {
        Self
    }

    /// Derive the stability of an arbitrary version string.
    ///
    /// Never fails: strings without a recognisable modifier are stable.
    pub fn parse_stability(&self, version: &str) -> Stability {
        let version = version.split('#').next().unwrap_or_default();
        let lower = version.to_lowercase();

        if lower.starts_with("dev-") || lower.ends_with("-dev") {
            return Stability::Dev;
        }

        let Some(caps) = MODIFIER_RE.captures(&lower) else {
            return Stability::Stable;
        };

        if caps.get(3).is_some_and(|m| !m.as_str().is_empty()) {
            return Stability::Dev;
        }

        match caps.get(1).map(|m| m.as_str()) {
            Some("beta" | "b") => Stability::Beta,
            Some("alpha" | "a") => Stability::Alpha,
            Some("rc") => Stability::Rc,
            _ => Stability::Stable,
        }
    }

    /// Parse a tag such as `v6.4.20.0` or `6.5.0.0-rc1`
    pub fn parse(&self, version: &str) -> Result<ReleaseVersion> {
        let trimmed = version.trim();
        let caps = VERSION_RE.captures(trimmed).ok_or_else(|| VersionError::InvalidVersion {
            version: version.to_string(),
            reason: "expected up to four numeric components and an optional stability suffix"
                .to_string(),
        })?;

        let mut parts = [0u64; 4];
        for (i, part) in parts.iter_mut().enumerate() {
            if let Some(m) = caps.get(i + 1) {
                *part = m.as_str().parse().map_err(|e| VersionError::InvalidVersion {
                    version: version.to_string(),
                    reason: format!("component '{}' is not a number: {}", m.as_str(), e),
                })?;
            }
        }

        let modifier = caps.get(5).map(|m| m.as_str().to_ascii_lowercase());
        let mut stability = match modifier.as_deref() {
            Some("beta" | "b") => Stability::Beta,
            Some("alpha" | "a") => Stability::Alpha,
            Some("rc") => Stability::Rc,
            _ => Stability::Stable,
        };
        let mut stability_number = match caps.get(6) {
            Some(m) if stability != Stability::Stable => {
                Some(m.as_str().parse().map_err(|e| VersionError::InvalidVersion {
                    version: version.to_string(),
                    reason: format!("stability number '{}' is not a number: {}", m.as_str(), e),
                })?)
            }
            _ => None,
        };

        if caps.get(7).is_some() {
            stability = Stability::Dev;
            stability_number = None;
        }

        Ok(ReleaseVersion {
            parts,
            stability,
            stability_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stability_table() {
        let parser = VersionParser::new();
        let cases = [
            ("1.2.3", Stability::Stable),
            ("1.2.3-rc1", Stability::Rc),
            ("rc1", Stability::Rc),
            ("v6.4.0.0-RC2", Stability::Rc),
            ("1.0.0-beta.2", Stability::Beta),
            ("1.0.0b1", Stability::Beta),
            ("2.0.0-alpha", Stability::Alpha),
            ("dev-master", Stability::Dev),
            ("1.0.x-dev", Stability::Dev),
            ("1.0.0-beta-dev", Stability::Dev),
            ("1.0.0-p1", Stability::Stable),
            ("1.0.0#abcdef", Stability::Stable),
            ("", Stability::Stable),
        ];
        for (input, expected) in cases {
            assert_eq!(parser.parse_stability(input), expected, "input: {input}");
        }
    }

    #[test]
    fn test_parse_pads_components() {
        let version = VersionParser::new().parse("v6.4").unwrap();
        assert_eq!(version.parts(), [6, 4, 0, 0]);
        assert!(version.is_stable());
        assert_eq!(version.to_string(), "6.4.0.0");
    }

    #[test]
    fn test_parse_release_candidate() {
        let version = VersionParser::new().parse("6.5.0.0-rc1").unwrap();
        assert_eq!(version.stability(), Stability::Rc);
        assert_eq!(version.stability_number(), Some(1));
        assert_eq!(version.to_string(), "6.5.0.0-RC1");
    }

    #[test]
    fn test_ordering() {
        let parser = VersionParser::new();
        let rc1 = parser.parse("6.4.0.0-RC1").unwrap();
        let rc2 = parser.parse("6.4.0.0-RC2").unwrap();
        let stable = parser.parse("6.4.0.0").unwrap();
        let next = parser.parse("6.4.0.1").unwrap();
        assert!(rc1 < rc2);
        assert!(rc2 < stable);
        assert!(stable < next);
        assert!(parser.parse("6.4.20.0").unwrap() > parser.parse("6.4.3.0").unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(VersionParser::new().parse("release-6").is_err());
        assert!(VersionParser::new().parse("").is_err());
    }
}
