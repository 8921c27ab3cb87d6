//! Policy decisions.

use crate::policy::Policy;
use serde::{Deserialize, Serialize};
use stevedore_core::Capability;

/// Policy decision result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDecision {
    /// Capability that was checked
    pub capability: Capability,
    /// Whether the capability is granted
    pub allowed: bool,
    /// Name of the deciding policy
    pub policy: String,
    /// Human-readable reason
    pub reason: String,
}

impl PolicyDecision {
    pub(crate) fn new(policy: &Policy, capability: Capability, allowed: bool) -> Self {
        let reason = if allowed {
            format!("'{}' is granted by policy '{}'", capability, policy.name())
        } else {
            format!("'{}' is not allowed by policy '{}'", capability, policy.name())
        };
        Self {
            capability,
            allowed,
            policy: policy.name().to_string(),
            reason,
        }
    }

    /// Whether the capability was denied
    #[must_use]
    pub fn is_denied(&self) -> bool {
        !self.allowed
    }
}
