//! Release stability levels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maturity of a release, ordered from least to most stable
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stability {
    /// Development snapshot
    Dev,
    /// Alpha pre-release
    Alpha,
    /// Beta pre-release
    Beta,
    /// Release candidate
    #[serde(rename = "RC")]
    Rc,
    /// Stable release
    Stable,
}

/// Stability name that could not be recognised
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown stability '{0}'")]
pub struct UnknownStability(pub String);

impl Stability {
    /// Canonical label as used in version strings (`RC`, `beta`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            Stability::Dev => "dev",
            Stability::Alpha => "alpha",
            Stability::Beta => "beta",
            Stability::Rc => "RC",
            Stability::Stable => "stable",
        }
    }
}

impl fmt::Display for Stability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stability {
    type Err = UnknownStability;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stable" => Ok(Stability::Stable),
            "rc" => Ok(Stability::Rc),
            "beta" => Ok(Stability::Beta),
            "alpha" => Ok(Stability::Alpha),
            "dev" => Ok(Stability::Dev),
            _ => Err(UnknownStability(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(Stability::Dev < Stability::Alpha);
        assert!(Stability::Beta < Stability::Rc);
        assert!(Stability::Rc < Stability::Stable);
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("RC".parse::<Stability>(), Ok(Stability::Rc));
        assert_eq!("Beta".parse::<Stability>(), Ok(Stability::Beta));
        assert!("nightly".parse::<Stability>().is_err());
    }

    #[test]
    fn test_serde_labels() {
        assert_eq!(serde_json::to_string(&Stability::Rc).unwrap(), "\"RC\"");
        assert_eq!(serde_json::to_string(&Stability::Beta).unwrap(), "\"beta\"");
    }
}
