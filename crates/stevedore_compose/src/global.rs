//! Global volumes and networks.

use crate::error::{FieldError, ModelResult, Scope};
use crate::service::validate_name;
use serde_json::{Map, Value};

/// Opaque driver configuration of a global volume or network
///
/// Allowed keys are kept verbatim in declaration order; rejected keys are
/// kept apart so they are reported but never emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigBag {
    entries: Map<String, Value>,
    rejected: Vec<FieldError>,
}

impl ConfigBag {
    /// Create an empty bag
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allowed entries in declaration order
    #[must_use]
    pub fn entries(&self) -> &Map<String, Value> {
        &self.entries
    }

    /// Get an entry
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Insert or replace an entry
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.insert(key.into(), value)
    }

    /// Remove an entry
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    /// Record a rejected entry
    pub fn reject(&mut self, error: FieldError) {
        self.rejected.push(error);
    }

    /// Rejected entries
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.rejected
    }

    /// Check if there are no allowed entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `external` marks the resource as managed elsewhere
    ///
    /// `external: true` and `external: {name: ...}` both count.
    #[must_use]
    pub fn is_external(&self) -> bool {
        match self.entries.get("external") {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::Object(_)) => true,
            _ => false,
        }
    }
}

/// A volume declared in the top-level `volumes` section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalVolume {
    name: String,
    /// Driver configuration
    pub config: ConfigBag,
}

impl GlobalVolume {
    /// Create a volume with an empty configuration
    ///
    /// # Errors
    ///
    /// Returns error if the name is invalid
    pub fn new(name: impl Into<String>) -> ModelResult<Self> {
        let name = name.into();
        validate_name(Scope::Volume, &name)?;
        Ok(Self {
            name,
            config: ConfigBag::new(),
        })
    }

    /// Volume name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the volume is managed outside the document
    #[must_use]
    pub fn is_external(&self) -> bool {
        self.config.is_external()
    }
}

/// A network declared in the top-level `networks` section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    name: String,
    /// Driver configuration
    pub config: ConfigBag,
}

impl Network {
    /// Create a network with an empty configuration
    ///
    /// # Errors
    ///
    /// Returns error if the name is invalid
    pub fn new(name: impl Into<String>) -> ModelResult<Self> {
        let name = name.into();
        validate_name(Scope::Network, &name)?;
        Ok(Self {
            name,
            config: ConfigBag::new(),
        })
    }

    /// Network name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the network is managed outside the document
    #[must_use]
    pub fn is_external(&self) -> bool {
        self.config.is_external()
    }

    /// Whether the network declares its own IP address management
    #[must_use]
    pub fn has_custom_ipam(&self) -> bool {
        self.config.get("ipam").is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use serde_json::json;

    #[test]
    fn test_volume_external() {
        let mut volume = GlobalVolume::new("data").unwrap();
        assert!(!volume.is_external());

        volume.config.set("external", json!(true));
        assert!(volume.is_external());

        volume.config.set("external", json!({"name": "shared-data"}));
        assert!(volume.is_external());

        volume.config.set("external", json!(false));
        assert!(!volume.is_external());
    }

    #[test]
    fn test_network_ipam() {
        let mut network = Network::new("back").unwrap();
        assert!(!network.has_custom_ipam());
        network.config.set("driver", json!("bridge"));
        network
            .config
            .set("ipam", json!({"config": [{"subnet": "172.28.0.0/16"}]}));
        assert!(network.has_custom_ipam());

        network.config.remove("ipam");
        assert!(!network.has_custom_ipam());
        assert_eq!(network.config.entries().len(), 1);
    }

    #[test]
    fn test_invalid_names() {
        assert!(matches!(
            GlobalVolume::new("my data"),
            Err(ModelError::InvalidName {
                scope: Scope::Volume,
                ..
            })
        ));
        assert!(Network::new("").is_err());
    }

    #[test]
    fn test_bag_rejects() {
        let mut bag = ConfigBag::new();
        bag.reject(FieldError::unsupported(Scope::Volume, "data", "labels", json!({})));
        assert!(bag.is_empty());
        assert_eq!(bag.errors().len(), 1);
    }
}
