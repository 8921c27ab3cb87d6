//! Diagnostic types and their wire projection.

use crate::remedy::Remedy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use stevedore_compose::{FieldError, Scope};

/// Kind of a policy or hygiene warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    /// A port publishes a host port
    PortMappingDenied,
    /// A volume mounts a host path
    VolumeMappingDenied,
    /// A service builds from a local context
    BuildDenied,
    /// A service pins its container name
    ContainerNameDenied,
    /// A service runs privileged, or a network declares its own IPAM
    PrivilegedDenied,
    /// A global volume is managed outside the document
    ExternalGlobalVolumeDenied,
    /// An image has no tag
    ImageMissingTag,
    /// An image has no owner
    ImageMissingOwner,
}

impl WarningKind {
    /// All kinds
    pub const ALL: [WarningKind; 8] = [
        Self::PortMappingDenied,
        Self::VolumeMappingDenied,
        Self::BuildDenied,
        Self::ContainerNameDenied,
        Self::PrivilegedDenied,
        Self::ExternalGlobalVolumeDenied,
        Self::ImageMissingTag,
        Self::ImageMissingOwner,
    ];

    /// Wire name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::PortMappingDenied => "port-mapping-denied",
            Self::VolumeMappingDenied => "volume-mapping-denied",
            Self::BuildDenied => "build-denied",
            Self::ContainerNameDenied => "container-name-denied",
            Self::PrivilegedDenied => "privileged-denied",
            Self::ExternalGlobalVolumeDenied => "external-global-volume-denied",
            Self::ImageMissingTag => "image-missing-tag",
            Self::ImageMissingOwner => "image-missing-owner",
        }
    }

    /// How a warning of this kind may be remediated
    #[must_use]
    pub const fn fix_mode(&self) -> FixMode {
        match self {
            Self::BuildDenied | Self::ContainerNameDenied | Self::PrivilegedDenied => {
                FixMode::Auto
            }
            Self::PortMappingDenied | Self::ImageMissingTag | Self::ImageMissingOwner => {
                FixMode::Assisted
            }
            Self::VolumeMappingDenied | Self::ExternalGlobalVolumeDenied => FixMode::Manual,
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Remediation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixMode {
    /// Applied by every fix run
    Auto,
    /// Applied only when fixes are not restricted to automatic ones
    Assisted,
    /// Never applied; needs a human
    Manual,
}

/// Where a diagnostic points
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    /// Scope of the owner
    pub scope: Scope,
    /// Service, volume or network name
    pub owner: String,
    /// Field or configuration key
    pub field: String,
    /// Position inside a list field
    pub index: Option<usize>,
}

impl Location {
    /// A field of a service
    #[must_use]
    pub fn service(owner: &str, field: &str) -> Self {
        Self {
            scope: Scope::Service,
            owner: owner.to_string(),
            field: field.to_string(),
            index: None,
        }
    }

    /// A key of a global volume
    #[must_use]
    pub fn volume(owner: &str, field: &str) -> Self {
        Self {
            scope: Scope::Volume,
            ..Self::service(owner, field)
        }
    }

    /// A key of a network
    #[must_use]
    pub fn network(owner: &str, field: &str) -> Self {
        Self {
            scope: Scope::Network,
            ..Self::service(owner, field)
        }
    }

    /// Point at a list item
    #[must_use]
    pub fn at(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Dotted path, e.g. `services.web.ports[1]`
    #[must_use]
    pub fn path(&self) -> String {
        let section = match self.scope {
            Scope::Document => return self.field.clone(),
            Scope::Service => "services",
            Scope::Volume => "volumes",
            Scope::Network => "networks",
        };
        match self.index {
            Some(index) => format!("{}.{}.{}[{}]", section, self.owner, self.field, index),
            None => format!("{}.{}.{}", section, self.owner, self.field),
        }
    }
}

/// A policy violation or hygiene problem
///
/// Never fatal. Carries the remediation the fix engine would apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// Warning kind
    pub kind: WarningKind,
    /// Offending component
    pub location: Location,
    /// Offending value as it would be written
    pub actual: Value,
    /// Suggested replacement, if there is one
    pub suggestion: Option<Value>,
    /// Human-readable explanation
    pub message: String,
    /// Registered remediation
    pub remedy: Remedy,
}

impl Warning {
    /// Remediation mode of the warning's kind
    #[must_use]
    pub fn fix_mode(&self) -> FixMode {
        self.kind.fix_mode()
    }

    /// Whether every fix run applies the remedy
    #[must_use]
    pub fn auto_fix(&self) -> bool {
        self.fix_mode() == FixMode::Auto
    }

    /// Whether only a human can resolve the warning
    #[must_use]
    pub fn requires_manual_fix(&self) -> bool {
        self.fix_mode() == FixMode::Manual
    }

    /// Wire form
    #[must_use]
    pub fn to_wire(&self) -> WireWarning {
        WireWarning {
            name: self.kind.name().to_string(),
            actual: self.actual.clone(),
            suggestion: self.suggestion.clone().unwrap_or(Value::Null),
            message: self.message.clone(),
            auto_fix: self.auto_fix(),
            require_manually_fix: self.requires_manual_fix(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.location.path(), self.message)
    }
}

/// Result of a diagnostics pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Non-fatal problem found against the policy
    Warning(Warning),
    /// Field rejected at parse time
    Error(FieldError),
}

impl Diagnostic {
    /// Whether this is a parse-time error
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// The warning, if this is one
    #[must_use]
    pub fn as_warning(&self) -> Option<&Warning> {
        match self {
            Self::Warning(warning) => Some(warning),
            Self::Error(_) => None,
        }
    }

    /// Whether every fix run resolves this diagnostic
    #[must_use]
    pub fn auto_fix(&self) -> bool {
        self.as_warning().is_some_and(Warning::auto_fix)
    }

    /// Whether only a human can resolve this diagnostic
    ///
    /// Always true for errors.
    #[must_use]
    pub fn requires_manual_fix(&self) -> bool {
        match self {
            Self::Warning(warning) => warning.requires_manual_fix(),
            Self::Error(_) => true,
        }
    }

    /// Human-readable explanation
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Warning(warning) => &warning.message,
            Self::Error(error) => &error.message,
        }
    }

    /// Dotted location
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Warning(warning) => warning.location.path(),
            Self::Error(error) => error.path(),
        }
    }

    /// Wire form
    #[must_use]
    pub fn to_wire(&self) -> WireDiagnostic {
        match self {
            Self::Warning(warning) => WireDiagnostic::Warning(warning.to_wire()),
            Self::Error(error) => WireDiagnostic::Error(WireError {
                field_name: error.field_name.clone(),
                field_data: error.field_data.clone(),
                message: error.message.clone(),
                require_manually_fix: true,
            }),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning(warning) => warning.fmt(f),
            Self::Error(error) => write!(f, "[error] {}: {}", error.path(), error.message),
        }
    }
}

/// Wire form of a warning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireWarning {
    /// Warning kind name
    pub name: String,
    /// Offending value
    pub actual: Value,
    /// Suggested replacement, `null` when there is none
    pub suggestion: Value,
    /// Explanation
    pub message: String,
    /// Applied by every fix run
    pub auto_fix: bool,
    /// Needs a human
    pub require_manually_fix: bool,
}

/// Wire form of a parse-time error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireError {
    /// Offending field name
    pub field_name: String,
    /// Raw value
    pub field_data: Value,
    /// Explanation
    pub message: String,
    /// Always true
    pub require_manually_fix: bool,
}

/// Wire form of any diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireDiagnostic {
    /// A warning
    Warning(WireWarning),
    /// An error
    Error(WireError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn warning() -> Warning {
        Warning {
            kind: WarningKind::PortMappingDenied,
            location: Location::service("web", "ports").at(0),
            actual: json!("80:80"),
            suggestion: Some(json!("80")),
            message: "Port mapping is not allowed".to_string(),
            remedy: Remedy::StripPortSource,
        }
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(WarningKind::ExternalGlobalVolumeDenied.name(), "external-global-volume-denied");
        for kind in WarningKind::ALL {
            let wire = serde_json::to_value(kind).unwrap();
            assert_eq!(wire, json!(kind.name()));
        }
    }

    #[test]
    fn test_fix_modes() {
        assert_eq!(WarningKind::BuildDenied.fix_mode(), FixMode::Auto);
        assert_eq!(WarningKind::PortMappingDenied.fix_mode(), FixMode::Assisted);
        assert_eq!(WarningKind::VolumeMappingDenied.fix_mode(), FixMode::Manual);
    }

    #[test]
    fn test_location_path() {
        assert_eq!(Location::service("web", "ports").at(2).path(), "services.web.ports[2]");
        assert_eq!(Location::network("back", "ipam").path(), "networks.back.ipam");
    }

    #[test]
    fn test_warning_wire_shape() {
        let wire = serde_json::to_value(Diagnostic::Warning(warning()).to_wire()).unwrap();
        assert_eq!(
            wire,
            json!({
                "name": "port-mapping-denied",
                "actual": "80:80",
                "suggestion": "80",
                "message": "Port mapping is not allowed",
                "autoFix": false,
                "requireManuallyFix": false
            })
        );
    }

    #[test]
    fn test_error_wire_shape() {
        let error = FieldError::unsupported(Scope::Service, "web", "gpus", json!("all"));
        let diagnostic = Diagnostic::Error(error);
        assert!(diagnostic.requires_manual_fix());
        assert!(!diagnostic.auto_fix());
        let wire = serde_json::to_value(diagnostic.to_wire()).unwrap();
        assert_eq!(
            wire,
            json!({
                "fieldName": "gpus",
                "fieldData": "all",
                "message": "Unsupported field 'gpus' in service 'web'",
                "requireManuallyFix": true
            })
        );
    }

    #[test]
    fn test_display() {
        let text = Diagnostic::Warning(warning()).to_string();
        assert_eq!(text, "[port-mapping-denied] services.web.ports[0]: Port mapping is not allowed");
    }
}
