//! Service volume mounts: `[source:]target[:mode]`.

use crate::error::{CoreError, CoreResult};
use crate::literal::split_components;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Volume mounted into a service container
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceVolume {
    /// Host path or named volume
    pub source: Option<String>,
    /// Path inside the container
    pub target: String,
    /// Access mode, e.g. `ro` or `rw`
    pub access_mode: Option<String>,
}

impl ServiceVolume {
    /// Create an anonymous volume at `target`
    #[must_use]
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            source: None,
            target: target.into(),
            access_mode: None,
        }
    }

    /// Set the source
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the access mode
    #[must_use]
    pub fn with_access_mode(mut self, mode: impl Into<String>) -> Self {
        self.access_mode = Some(mode.into());
        self
    }

    /// Parse a volume literal
    ///
    /// # Errors
    ///
    /// Returns error on more than three components or an empty component
    pub fn parse(s: &str) -> CoreResult<Self> {
        let tokens = split_components(s, 3).map_err(|reason| CoreError::InvalidVolume {
            input: s.to_string(),
            reason,
        })?;

        let volume = match tokens.as_slice() {
            [target] => Self::new(*target),
            [source, target, mode] => Self::new(*target)
                .with_source(*source)
                .with_access_mode(*mode),
            [source, target] => Self::new(*target).with_source(*source),
            _ => {
                return Err(CoreError::InvalidVolume {
                    input: s.to_string(),
                    reason: "empty literal".to_string(),
                })
            }
        };

        Ok(volume)
    }

    /// Whether the source is a path on the host rather than a named volume
    #[must_use]
    pub fn is_host_mapping(&self) -> bool {
        self.source
            .as_deref()
            .is_some_and(|s| s.starts_with('/') || s.starts_with('.') || s.starts_with('~'))
    }

    /// The `target[:mode]` part of the literal
    #[must_use]
    pub fn target_literal(&self) -> String {
        match &self.access_mode {
            Some(mode) => format!("{}:{}", self.target, mode),
            None => self.target.clone(),
        }
    }
}

impl fmt::Display for ServiceVolume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "{}:", source)?;
        }
        write!(f, "{}", self.target_literal())
    }
}

impl FromStr for ServiceVolume {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_target_only() {
        let volume = ServiceVolume::parse("/var/lib/mysql").unwrap();
        assert_eq!(volume.target, "/var/lib/mysql");
        assert!(volume.source.is_none());
        assert!(volume.access_mode.is_none());
    }

    #[test]
    fn test_volume_source_target() {
        let volume = ServiceVolume::parse("./app:/app").unwrap();
        assert_eq!(volume.source.as_deref(), Some("./app"));
        assert_eq!(volume.target, "/app");
    }

    #[test]
    fn test_volume_access_mode() {
        let volume = ServiceVolume::parse("~/cfg:/etc/cfg:ro").unwrap();
        assert_eq!(volume.source.as_deref(), Some("~/cfg"));
        assert_eq!(volume.target, "/etc/cfg");
        assert_eq!(volume.access_mode.as_deref(), Some("ro"));
    }

    #[test]
    fn test_volume_display_is_inverse() {
        for literal in ["/data", "data:/data", "./app:/app", "~/cfg:/etc/cfg:ro"] {
            assert_eq!(ServiceVolume::parse(literal).unwrap().to_string(), literal);
        }
    }

    #[test]
    fn test_volume_host_mapping() {
        assert!(ServiceVolume::parse("./app:/app").unwrap().is_host_mapping());
        assert!(ServiceVolume::parse("/srv:/srv").unwrap().is_host_mapping());
        assert!(ServiceVolume::parse("~/x:/x").unwrap().is_host_mapping());
        assert!(!ServiceVolume::parse("data:/data").unwrap().is_host_mapping());
        assert!(!ServiceVolume::parse("/data").unwrap().is_host_mapping());
    }

    #[test]
    fn test_volume_errors() {
        assert!(ServiceVolume::parse("").is_err());
        assert!(ServiceVolume::parse("a:b:c:d").is_err());
        assert!(ServiceVolume::parse("a::ro").is_err());
    }

    #[test]
    fn test_volume_target_literal() {
        let volume = ServiceVolume::new("/etc").with_source("./etc").with_access_mode("ro");
        assert_eq!(volume.target_literal(), "/etc:ro");
        assert_eq!(volume.to_string(), "./etc:/etc:ro");
    }
}
