//! Policy configuration files.
//!
//! A configuration starts from a named preset and adjusts individual grants:
//!
//! ```json
//! { "preset": "shared", "allow": ["port_mapping"], "deny": [] }
//! ```

use crate::policy::{Policy, PolicyError, PolicyResult};
use crate::preset::Preset;
use serde::{Deserialize, Serialize};
use std::io::Read;
use stevedore_core::Capability;

/// Serializable policy configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    /// Resulting policy name; defaults to the preset name
    #[serde(default)]
    pub name: Option<String>,
    /// Base preset; `shared` when absent
    #[serde(default)]
    pub preset: Option<Preset>,
    /// Capabilities granted on top of the preset
    #[serde(default)]
    pub allow: Vec<Capability>,
    /// Capabilities revoked from the preset
    #[serde(default)]
    pub deny: Vec<Capability>,
}

impl PolicyConfig {
    /// Configuration that only names a preset
    #[must_use]
    pub fn from_preset(preset: Preset) -> Self {
        Self {
            preset: Some(preset),
            ..Self::default()
        }
    }

    /// Parse a JSON configuration
    ///
    /// # Errors
    ///
    /// Returns error if the JSON is malformed or has unknown fields
    pub fn from_json_str(source: &str) -> PolicyResult<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Parse a JSON configuration from a reader
    ///
    /// # Errors
    ///
    /// Returns error if reading fails or the JSON is malformed
    pub fn from_reader<R: Read>(reader: R) -> PolicyResult<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Resolve into a policy
    ///
    /// # Errors
    ///
    /// Returns error if a capability is both allowed and denied
    pub fn resolve(&self) -> PolicyResult<Policy> {
        if let Some(capability) = self.allow.iter().find(|c| self.deny.contains(c)) {
            return Err(PolicyError::Conflict {
                capability: *capability,
            });
        }

        let preset = self.preset.unwrap_or(Preset::Shared);
        let mut policy = preset.policy().clone();
        if let Some(name) = &self.name {
            policy = policy.renamed(name.as_str());
        }
        let policy = self.allow.iter().fold(policy, |p, c| p.with_grant(*c));
        Ok(self.deny.iter().fold(policy, |p, c| p.with_revoke(*c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_is_shared() {
        let policy = PolicyConfig::default().resolve().unwrap();
        assert_eq!(policy.name(), "shared");
        assert!(policy.denied().len() == Capability::ALL.len());
    }

    #[test]
    fn test_config_from_json() {
        let config = PolicyConfig::from_json_str(
            r#"{ "name": "staging", "preset": "shared", "allow": ["port_mapping", "build"] }"#,
        )
        .unwrap();
        let policy = config.resolve().unwrap();
        assert_eq!(policy.name(), "staging");
        assert!(policy.port_mapping_allowed());
        assert!(policy.build_allowed());
        assert!(!policy.privileged_allowed());
    }

    #[test]
    fn test_config_deny_on_pro() {
        let config = PolicyConfig {
            deny: vec![Capability::Privileged],
            ..PolicyConfig::from_preset(Preset::Pro)
        };
        let policy = config.resolve().unwrap();
        assert!(!policy.privileged_allowed());
        assert!(policy.build_allowed());
    }

    #[test]
    fn test_config_conflict() {
        let config = PolicyConfig {
            allow: vec![Capability::Build],
            deny: vec![Capability::Build],
            ..PolicyConfig::default()
        };
        assert_eq!(
            config.resolve().unwrap_err(),
            PolicyError::Conflict {
                capability: Capability::Build
            }
        );
    }

    #[test]
    fn test_config_unknown_field() {
        let err = PolicyConfig::from_json_str(r#"{ "preset": "pro", "gpu": true }"#).unwrap_err();
        assert!(matches!(err, PolicyError::InvalidConfig { .. }));
    }

    #[test]
    fn test_config_unknown_preset() {
        assert!(PolicyConfig::from_json_str(r#"{ "preset": "gold" }"#).is_err());
    }

    #[test]
    fn test_config_from_reader() {
        let bytes = br#"{ "preset": "pro" }"#;
        let config = PolicyConfig::from_reader(&bytes[..]).unwrap();
        assert_eq!(config.preset, Some(Preset::Pro));
    }
}
