//! Diagnostics engine: document and policy in, ordered diagnostics out.
//!
//! Each component of the model knows how to diagnose itself through
//! [`Diagnosable`]. The walk follows the document's section order, then
//! declaration order, then list order, so identical inputs always produce
//! identical output.

use crate::diagnostic::{Diagnostic, Location, Warning, WarningKind};
use crate::remedy::Remedy;
use serde_json::Value;
use stevedore_compose::{
    ComposeDocument, Field, FieldKind, FieldValue, GlobalVolume, Network, Node, PortList, Scope,
    Service, VolumeList,
};
use stevedore_core::image::DEFAULT_TAG;
use stevedore_core::{Capability, Image};
use stevedore_policy::Policy;

/// A component that can report its own diagnostics
pub trait Diagnosable {
    /// Append diagnostics for `self`, located at `at`, to `out`
    fn diagnose_into(&self, policy: &Policy, at: &Location, out: &mut Vec<Diagnostic>);
}

fn warn(
    out: &mut Vec<Diagnostic>,
    kind: WarningKind,
    location: Location,
    actual: Value,
    suggestion: Option<Value>,
    message: String,
    remedy: Remedy,
) {
    out.push(Diagnostic::Warning(Warning {
        kind,
        location,
        actual,
        suggestion,
        message,
        remedy,
    }));
}

fn denial(policy: &Policy, capability: Capability) -> Option<String> {
    let decision = policy.check(capability);
    decision.is_denied().then_some(decision.reason)
}

impl Diagnosable for Image {
    fn diagnose_into(&self, _: &Policy, at: &Location, out: &mut Vec<Diagnostic>) {
        if !self.has_tag() {
            let suggested = self.tagged_or_latest();
            warn(
                out,
                WarningKind::ImageMissingTag,
                at.clone(),
                Value::String(self.to_string()),
                Some(Value::String(suggested.to_string())),
                format!("Image '{}' has no tag; use '{}'", self, suggested),
                Remedy::AddImageTag,
            );
        }
        if !self.has_owner() {
            let suggested = self.owned_or_library();
            warn(
                out,
                WarningKind::ImageMissingOwner,
                at.clone(),
                Value::String(self.to_string()),
                Some(Value::String(suggested.to_string())),
                format!("Image '{}' has no owner; use '{}'", self, suggested),
                Remedy::AddImageOwner,
            );
        }
    }
}

impl Diagnosable for PortList {
    fn diagnose_into(&self, policy: &Policy, at: &Location, out: &mut Vec<Diagnostic>) {
        let Some(reason) = denial(policy, Capability::PortMapping) else {
            return;
        };
        for (index, port) in self.iter().enumerate() {
            if !port.is_mapped() {
                continue;
            }
            let suggested = port.unmapped();
            warn(
                out,
                WarningKind::PortMappingDenied,
                at.clone().at(index),
                Value::String(port.to_string()),
                Some(Value::String(suggested.to_string())),
                format!("Port '{}' publishes a host port: {}", port, reason),
                Remedy::StripPortSource,
            );
        }
    }
}

impl Diagnosable for VolumeList {
    fn diagnose_into(&self, policy: &Policy, at: &Location, out: &mut Vec<Diagnostic>) {
        let Some(reason) = denial(policy, Capability::VolumeMapping) else {
            return;
        };
        for (index, volume) in self.iter().enumerate() {
            if !volume.is_host_mapping() {
                continue;
            }
            warn(
                out,
                WarningKind::VolumeMappingDenied,
                at.clone().at(index),
                Value::String(volume.to_string()),
                Some(Value::String(volume.target.clone())),
                format!("Volume '{}' mounts a host path: {}", volume, reason),
                Remedy::Manual,
            );
        }
    }
}

impl Diagnosable for Field {
    fn diagnose_into(&self, policy: &Policy, at: &Location, out: &mut Vec<Diagnostic>) {
        match &self.value {
            FieldValue::Invalid(error) => {
                out.push(Diagnostic::Error(error.clone()));
                return;
            }
            FieldValue::Image(image) => return image.diagnose_into(policy, at, out),
            FieldValue::Ports(ports) => return ports.diagnose_into(policy, at, out),
            FieldValue::Volumes(volumes) => return volumes.diagnose_into(policy, at, out),
            _ => {}
        }

        let Some(capability) = self.kind.gate() else {
            return;
        };
        let Some(reason) = denial(policy, capability) else {
            return;
        };
        let actual = self.value.to_value().unwrap_or(Value::Null);

        let (kind, suggestion, remedy) = match self.kind {
            FieldKind::Build => {
                let image = Image::new(at.owner.as_str()).with_tag(DEFAULT_TAG);
                (
                    WarningKind::BuildDenied,
                    Some(Value::String(image.to_string())),
                    Remedy::BuildToImage(image),
                )
            }
            FieldKind::Context => (WarningKind::BuildDenied, None, Remedy::DropField),
            FieldKind::ContainerName => (WarningKind::ContainerNameDenied, None, Remedy::DropField),
            FieldKind::Privileged => (WarningKind::PrivilegedDenied, None, Remedy::DropField),
            _ => return,
        };

        warn(
            out,
            kind,
            at.clone(),
            actual,
            suggestion,
            format!("Field '{}' in service '{}': {}", self.name, at.owner, reason),
            remedy,
        );
    }
}

impl Diagnosable for Service {
    fn diagnose_into(&self, policy: &Policy, _: &Location, out: &mut Vec<Diagnostic>) {
        for field in self.fields() {
            let at = Location::service(self.name(), &field.name);
            field.diagnose_into(policy, &at, out);
        }
    }
}

impl Diagnosable for GlobalVolume {
    fn diagnose_into(&self, policy: &Policy, _: &Location, out: &mut Vec<Diagnostic>) {
        if self.is_external() {
            if let Some(reason) = denial(policy, Capability::ExternalVolume) {
                warn(
                    out,
                    WarningKind::ExternalGlobalVolumeDenied,
                    Location::volume(self.name(), "external"),
                    self.config.get("external").cloned().unwrap_or(Value::Null),
                    None,
                    format!(
                        "Volume '{}' is managed outside the document; provision a managed volume instead: {}",
                        self.name(),
                        reason
                    ),
                    Remedy::Manual,
                );
            }
        }
        out.extend(self.config.errors().iter().cloned().map(Diagnostic::Error));
    }
}

impl Diagnosable for Network {
    fn diagnose_into(&self, policy: &Policy, _: &Location, out: &mut Vec<Diagnostic>) {
        if let Some(ipam) = self.config.get("ipam") {
            if let Some(reason) = denial(policy, Capability::Privileged) {
                warn(
                    out,
                    WarningKind::PrivilegedDenied,
                    Location::network(self.name(), "ipam"),
                    ipam.clone(),
                    None,
                    format!("Network '{}' declares custom IPAM: {}", self.name(), reason),
                    Remedy::DropField,
                );
            }
        }
        out.extend(self.config.errors().iter().cloned().map(Diagnostic::Error));
    }
}

impl Diagnosable for ComposeDocument {
    fn diagnose_into(&self, policy: &Policy, _: &Location, out: &mut Vec<Diagnostic>) {
        for node in self.walk() {
            match node {
                Node::Rejected(error) => out.push(Diagnostic::Error(error.clone())),
                Node::Service(service) => {
                    let at = Location::service(service.name(), "");
                    service.diagnose_into(policy, &at, out);
                }
                Node::Volume(volume) => {
                    let at = Location::volume(volume.name(), "");
                    volume.diagnose_into(policy, &at, out);
                }
                Node::Network(network) => {
                    let at = Location::network(network.name(), "");
                    network.diagnose_into(policy, &at, out);
                }
            }
        }
    }
}

/// Diagnose a document against a policy
///
/// Pure: the document is only read, and two calls with the same inputs
/// return identical lists.
#[must_use]
pub fn diagnose(doc: &ComposeDocument, policy: &Policy) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    let root = Location {
        scope: Scope::Document,
        owner: String::new(),
        field: String::new(),
        index: None,
    };
    doc.diagnose_into(policy, &root, &mut out);
    out
}
