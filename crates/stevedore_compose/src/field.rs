//! Service fields: the closed set of field kinds and their values.

use crate::error::FieldError;
use crate::list::{PortList, VolumeList};
use serde_json::{Map, Value};
use stevedore_core::{Capability, Image};

/// Kind of a service field
///
/// Every field name maps to exactly one kind. Names without a typed model are
/// [`FieldKind::Other`] and travel as opaque passthrough values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// `image`
    Image,
    /// `ports`
    Ports,
    /// `volumes`
    Volumes,
    /// `build`
    Build,
    /// `container_name`
    ContainerName,
    /// `context`
    Context,
    /// `privileged`
    Privileged,
    /// Any other allowed field
    Other,
}

impl FieldKind {
    /// Kinds with a dedicated interpreter, in dispatch-table order
    pub const DISPATCHED: [FieldKind; 7] = [
        Self::Image,
        Self::Ports,
        Self::Volumes,
        Self::Build,
        Self::ContainerName,
        Self::Context,
        Self::Privileged,
    ];

    /// Kind for a field name
    #[must_use]
    pub fn of(name: &str) -> Self {
        Self::DISPATCHED
            .into_iter()
            .find(|kind| kind.field_name() == Some(name))
            .unwrap_or(Self::Other)
    }

    /// Canonical field name of a dispatched kind
    #[must_use]
    pub const fn field_name(&self) -> Option<&'static str> {
        match self {
            Self::Image => Some("image"),
            Self::Ports => Some("ports"),
            Self::Volumes => Some("volumes"),
            Self::Build => Some("build"),
            Self::ContainerName => Some("container_name"),
            Self::Context => Some("context"),
            Self::Privileged => Some("privileged"),
            Self::Other => None,
        }
    }

    /// Capability that gates the whole field, if any
    ///
    /// Ports and volumes are gated per item, not per field.
    #[must_use]
    pub const fn gate(&self) -> Option<Capability> {
        match self {
            Self::Build | Self::Context => Some(Capability::Build),
            Self::ContainerName => Some(Capability::ContainerName),
            Self::Privileged => Some(Capability::Privileged),
            _ => None,
        }
    }
}

/// Build configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Build {
    /// `build: ./dir`
    Path(String),
    /// `build: {context: ./dir, dockerfile: ..., args: ...}`
    Detailed(Map<String, Value>),
}

impl Build {
    /// Build context directory
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::Path(path) => Some(path),
            Self::Detailed(map) => map.get("context").and_then(Value::as_str),
        }
    }

    /// Raw tree form
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Path(path) => Value::String(path.clone()),
            Self::Detailed(map) => Value::Object(map.clone()),
        }
    }
}

/// Value stored for a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Parsed image reference
    Image(Image),
    /// Parsed port list
    Ports(PortList),
    /// Parsed volume list
    Volumes(VolumeList),
    /// Parsed build configuration
    Build(Build),
    /// Container name
    ContainerName(String),
    /// Build context
    Context(String),
    /// Privileged flag
    Privileged(bool),
    /// Value kept verbatim
    Opaque(Value),
    /// Value the dialect rejected; never used after parsing
    Invalid(FieldError),
}

impl FieldValue {
    /// Raw tree form, `None` for rejected values
    ///
    /// Lists are rendered in the sequence encoding; translators that honor
    /// the mapping encoding do so before falling back to this.
    #[must_use]
    pub fn to_value(&self) -> Option<Value> {
        let value = match self {
            Self::Image(image) => Value::String(image.to_string()),
            Self::Ports(list) => {
                Value::Array(list.iter().map(|p| Value::String(p.to_string())).collect())
            }
            Self::Volumes(list) => {
                Value::Array(list.iter().map(|v| Value::String(v.to_string())).collect())
            }
            Self::Build(build) => build.to_value(),
            Self::ContainerName(name) | Self::Context(name) => Value::String(name.clone()),
            Self::Privileged(flag) => Value::Bool(*flag),
            Self::Opaque(raw) => raw.clone(),
            Self::Invalid(_) => return None,
        };
        Some(value)
    }
}

/// A named field of a service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field name as written
    pub name: String,
    /// Field kind
    pub kind: FieldKind,
    /// Stored value
    pub value: FieldValue,
}

impl Field {
    /// Create a field, deriving the kind from the name
    #[must_use]
    pub fn new(name: impl Into<String>, value: FieldValue) -> Self {
        let name = name.into();
        Self {
            kind: FieldKind::of(&name),
            name,
            value,
        }
    }

    /// `image` field
    #[must_use]
    pub fn image(image: Image) -> Self {
        Self::new("image", FieldValue::Image(image))
    }

    /// `ports` field
    #[must_use]
    pub fn ports(ports: PortList) -> Self {
        Self::new("ports", FieldValue::Ports(ports))
    }

    /// `volumes` field
    #[must_use]
    pub fn volumes(volumes: VolumeList) -> Self {
        Self::new("volumes", FieldValue::Volumes(volumes))
    }

    /// `build` field
    #[must_use]
    pub fn build(build: Build) -> Self {
        Self::new("build", FieldValue::Build(build))
    }

    /// `container_name` field
    #[must_use]
    pub fn container_name(name: impl Into<String>) -> Self {
        Self::new("container_name", FieldValue::ContainerName(name.into()))
    }

    /// `privileged` field
    #[must_use]
    pub fn privileged(flag: bool) -> Self {
        Self::new("privileged", FieldValue::Privileged(flag))
    }

    /// Field kept verbatim
    #[must_use]
    pub fn opaque(name: impl Into<String>, raw: Value) -> Self {
        Self::new(name, FieldValue::Opaque(raw))
    }

    /// Field the dialect rejected
    #[must_use]
    pub fn invalid(error: FieldError) -> Self {
        Self::new(error.field_name.clone(), FieldValue::Invalid(error))
    }

    /// The retained error, if the field was rejected
    #[must_use]
    pub fn error(&self) -> Option<&FieldError> {
        match &self.value {
            FieldValue::Invalid(err) => Some(err),
            _ => None,
        }
    }

    /// Whether the field was rejected
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        self.error().is_some()
    }
}
