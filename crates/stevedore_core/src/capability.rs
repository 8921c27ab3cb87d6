//! Deployment capabilities a policy can grant.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// A capability grants permission to use one family of service features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Publish container ports on the host
    PortMapping,
    /// Mount host paths into containers
    VolumeMapping,
    /// Build images from a local context
    Build,
    /// Pin a fixed container name
    ContainerName,
    /// Run privileged containers and custom network IPAM
    Privileged,
    /// Reference volumes managed outside the document
    ExternalVolume,
}

impl Capability {
    /// All capabilities, in declaration order
    pub const ALL: [Capability; 6] = [
        Self::PortMapping,
        Self::VolumeMapping,
        Self::Build,
        Self::ContainerName,
        Self::Privileged,
        Self::ExternalVolume,
    ];

    /// Get a string representation of the capability
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::PortMapping => "port_mapping",
            Self::VolumeMapping => "volume_mapping",
            Self::Build => "build",
            Self::ContainerName => "container_name",
            Self::Privileged => "privileged",
            Self::ExternalVolume => "external_volume",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Capability {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|cap| cap.name() == normalized)
            .ok_or_else(|| CoreError::InvalidCapability {
                name: s.to_string(),
            })
    }
}

/// A set of granted capabilities
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    /// Granted capabilities
    pub capabilities: BTreeSet<Capability>,
}

impl CapabilitySet {
    /// Create a new empty capability set
    #[must_use]
    pub fn new() -> Self {
        Self {
            capabilities: BTreeSet::new(),
        }
    }

    /// Create a set holding every capability
    #[must_use]
    pub fn all() -> Self {
        Self {
            capabilities: Capability::ALL.into_iter().collect(),
        }
    }

    /// Grant a capability
    pub fn grant(&mut self, capability: Capability) {
        self.capabilities.insert(capability);
    }

    /// Revoke a capability
    pub fn revoke(&mut self, capability: Capability) {
        self.capabilities.remove(&capability);
    }

    /// Check if a capability is granted
    #[must_use]
    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Get the number of capabilities
    #[must_use]
    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    /// Check if empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    /// Iterate over capabilities
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.capabilities.iter().copied()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self {
            capabilities: iter.into_iter().collect(),
        }
    }
}
