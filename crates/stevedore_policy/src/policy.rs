//! The policy value consumed by diagnostics.

use crate::decision::PolicyDecision;
use stevedore_core::{Capability, CapabilitySet, CoreError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Policy result type
pub type PolicyResult<T> = Result<T, PolicyError>;

/// Policy error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// No preset with this name
    #[error("Unknown policy preset: {name}")]
    UnknownPreset {
        /// Requested preset name
        name: String,
    },
    /// A capability is both allowed and denied
    #[error("Capability {capability} is both allowed and denied")]
    Conflict {
        /// Capability listed on both sides
        capability: Capability,
    },
    /// Malformed policy configuration
    #[error("Invalid policy configuration: {reason}")]
    InvalidConfig {
        /// Decoder message
        reason: String,
    },
    /// Core value error
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<serde_json::Error> for PolicyError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidConfig {
            reason: err.to_string(),
        }
    }
}

/// Capability descriptor of a deployment target
///
/// Policies are plain values. Fields are only set through the constructors
/// and the consuming builders, so an attached policy cannot change, and a
/// shared reference can be read from any number of diagnostics passes at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    name: String,
    capabilities: CapabilitySet,
}

impl Policy {
    /// Create a policy from a set of grants
    #[must_use]
    pub fn new(name: impl Into<String>, capabilities: CapabilitySet) -> Self {
        Self {
            name: name.into(),
            capabilities,
        }
    }

    /// Policy granting nothing
    #[must_use]
    pub fn restrictive(name: impl Into<String>) -> Self {
        Self::new(name, CapabilitySet::new())
    }

    /// Policy granting everything
    #[must_use]
    pub fn permissive(name: impl Into<String>) -> Self {
        Self::new(name, CapabilitySet::all())
    }

    /// Copy under another name
    #[must_use]
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Policy name, usually the preset it was built from
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Granted capabilities
    #[must_use]
    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    /// Copy with one more grant
    #[must_use]
    pub fn with_grant(mut self, capability: Capability) -> Self {
        self.capabilities.grant(capability);
        self
    }

    /// Copy with one grant removed
    #[must_use]
    pub fn with_revoke(mut self, capability: Capability) -> Self {
        self.capabilities.revoke(capability);
        self
    }

    /// Check if a capability is granted
    #[must_use]
    pub fn allows(&self, capability: Capability) -> bool {
        self.capabilities.has(capability)
    }

    /// Decide on a capability, with a reason suitable for messages
    #[must_use]
    pub fn check(&self, capability: Capability) -> PolicyDecision {
        PolicyDecision::new(self, capability, self.allows(capability))
    }

    /// Whether host port publishing is allowed
    #[must_use]
    pub fn port_mapping_allowed(&self) -> bool {
        self.allows(Capability::PortMapping)
    }

    /// Whether host path volumes are allowed
    #[must_use]
    pub fn volume_mapping_allowed(&self) -> bool {
        self.allows(Capability::VolumeMapping)
    }

    /// Whether `build` is allowed
    #[must_use]
    pub fn build_allowed(&self) -> bool {
        self.allows(Capability::Build)
    }

    /// Whether `container_name` is allowed
    #[must_use]
    pub fn container_name_allowed(&self) -> bool {
        self.allows(Capability::ContainerName)
    }

    /// Whether privileged mode is allowed
    #[must_use]
    pub fn privileged_allowed(&self) -> bool {
        self.allows(Capability::Privileged)
    }

    /// Whether external global volumes are allowed
    #[must_use]
    pub fn external_volume_allowed(&self) -> bool {
        self.allows(Capability::ExternalVolume)
    }

    /// Capabilities this policy denies, in declaration order
    #[must_use]
    pub fn denied(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|c| !self.allows(*c))
            .collect()
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::permissive("default")
    }
}
