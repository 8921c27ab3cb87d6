//! Schema dialects of the compose document format.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported schema revision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dialect {
    /// Flat service map, no `version` key
    V1,
    /// `version: "2.x"` with `services`, `volumes`, `networks`
    V2,
    /// `version: "3.x"`
    V3,
}

impl Dialect {
    /// All dialects, oldest first
    pub const ALL: [Dialect; 3] = [Self::V1, Self::V2, Self::V3];

    /// Parse a `version` literal such as `"2"`, `"2.1"` or `"3.8"`
    ///
    /// # Errors
    ///
    /// Returns error if the major version is not 1, 2 or 3
    pub fn from_version(version: &str) -> CoreResult<Self> {
        let major = version.trim().split('.').next().unwrap_or_default();
        match major {
            "1" => Ok(Self::V1),
            "2" => Ok(Self::V2),
            "3" => Ok(Self::V3),
            _ => Err(CoreError::InvalidDialect {
                input: version.to_string(),
            }),
        }
    }

    /// Version literal written when no original literal is known
    #[must_use]
    pub const fn default_version(&self) -> Option<&'static str> {
        match self {
            Self::V1 => None,
            Self::V2 => Some("2"),
            Self::V3 => Some("3"),
        }
    }

    /// Whether documents are wrapped in a `services` section
    #[must_use]
    pub const fn has_sections(&self) -> bool {
        !matches!(self, Self::V1)
    }

    /// Short name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
            Self::V3 => "v3",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lowered = trimmed.to_ascii_lowercase();
        match lowered.strip_prefix('v') {
            Some(rest) if !rest.is_empty() => Self::from_version(rest),
            _ => Self::from_version(trimmed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_from_version() {
        assert_eq!(Dialect::from_version("1").unwrap(), Dialect::V1);
        assert_eq!(Dialect::from_version("2").unwrap(), Dialect::V2);
        assert_eq!(Dialect::from_version("2.4").unwrap(), Dialect::V2);
        assert_eq!(Dialect::from_version("3.8").unwrap(), Dialect::V3);
        assert!(Dialect::from_version("4").is_err());
        assert!(Dialect::from_version("").is_err());
    }

    #[test]
    fn test_dialect_from_str() {
        assert_eq!("v1".parse::<Dialect>().unwrap(), Dialect::V1);
        assert_eq!("V3".parse::<Dialect>().unwrap(), Dialect::V3);
        assert_eq!("2.1".parse::<Dialect>().unwrap(), Dialect::V2);
        assert!("v".parse::<Dialect>().is_err());
        assert!("vx".parse::<Dialect>().is_err());
    }

    #[test]
    fn test_dialect_defaults() {
        assert_eq!(Dialect::V1.default_version(), None);
        assert_eq!(Dialect::V2.default_version(), Some("2"));
        assert!(!Dialect::V1.has_sections());
        assert!(Dialect::V3.has_sections());
    }

    #[test]
    fn test_dialect_display() {
        for dialect in Dialect::ALL {
            assert_eq!(dialect.to_string().parse::<Dialect>().unwrap(), dialect);
        }
    }
}
