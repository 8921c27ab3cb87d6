//! Service definitions.

use crate::error::{FieldError, ModelError, ModelResult, Scope};
use crate::field::{Build, Field, FieldKind, FieldValue};
use crate::list::{PortList, VolumeList};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use stevedore_core::Image;

static NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._-]+$").expect("name pattern is a valid regex")
});

/// Check a service, volume or network name
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    NAME_PATTERN.is_match(name)
}

pub(crate) fn validate_name(scope: Scope, name: &str) -> ModelResult<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(ModelError::InvalidName {
            scope,
            name: name.to_string(),
        })
    }
}

/// A named service with its fields in declaration order
#[derive(Debug, Clone)]
pub struct Service {
    name: String,
    fields: IndexMap<String, Field>,
}

impl Service {
    /// Create an empty service
    ///
    /// # Errors
    ///
    /// Returns error if the name is empty or contains characters outside
    /// `[A-Za-z0-9._-]`
    pub fn new(name: impl Into<String>) -> ModelResult<Self> {
        let name = name.into();
        validate_name(Scope::Service, &name)?;
        Ok(Self {
            name,
            fields: IndexMap::new(),
        })
    }

    /// Service name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    /// Field names in declaration order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Number of fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the service has no fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Get a field by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Get a mutable field by name
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.get_mut(name)
    }

    /// Whether a field is present
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Insert or replace a field
    ///
    /// A replaced field keeps its position; a new field is appended.
    pub fn set(&mut self, field: Field) -> Option<Field> {
        self.fields.insert(field.name.clone(), field)
    }

    /// Replace the field `name` with `field`, keeping the position
    ///
    /// Appends when `name` is absent. Returns the removed field.
    pub fn replace(&mut self, name: &str, field: Field) -> Option<Field> {
        if field.name != name {
            self.fields.shift_remove(&field.name);
        }
        match self.fields.get_index_of(name) {
            Some(index) => {
                let removed = self.fields.shift_remove_index(index).map(|(_, f)| f);
                self.fields.shift_insert(index, field.name.clone(), field);
                removed
            }
            None => {
                self.set(field);
                None
            }
        }
    }

    /// Remove a field, keeping the order of the rest
    pub fn remove(&mut self, name: &str) -> Option<Field> {
        self.fields.shift_remove(name)
    }

    /// Typed image, if present and parsed
    #[must_use]
    pub fn image(&self) -> Option<&Image> {
        match self.get("image").map(|f| &f.value) {
            Some(FieldValue::Image(image)) => Some(image),
            _ => None,
        }
    }

    /// Mutable typed image
    pub fn image_mut(&mut self) -> Option<&mut Image> {
        match self.get_mut("image").map(|f| &mut f.value) {
            Some(FieldValue::Image(image)) => Some(image),
            _ => None,
        }
    }

    /// Typed ports, if present and parsed
    #[must_use]
    pub fn ports(&self) -> Option<&PortList> {
        match self.get("ports").map(|f| &f.value) {
            Some(FieldValue::Ports(ports)) => Some(ports),
            _ => None,
        }
    }

    /// Mutable typed ports
    pub fn ports_mut(&mut self) -> Option<&mut PortList> {
        match self.get_mut("ports").map(|f| &mut f.value) {
            Some(FieldValue::Ports(ports)) => Some(ports),
            _ => None,
        }
    }

    /// Typed volumes, if present and parsed
    #[must_use]
    pub fn volumes(&self) -> Option<&VolumeList> {
        match self.get("volumes").map(|f| &f.value) {
            Some(FieldValue::Volumes(volumes)) => Some(volumes),
            _ => None,
        }
    }

    /// Typed build configuration, if present and parsed
    #[must_use]
    pub fn build(&self) -> Option<&Build> {
        match self.get("build").map(|f| &f.value) {
            Some(FieldValue::Build(build)) => Some(build),
            _ => None,
        }
    }

    /// Container name, if present and parsed
    #[must_use]
    pub fn container_name(&self) -> Option<&str> {
        match self.get("container_name").map(|f| &f.value) {
            Some(FieldValue::ContainerName(name)) => Some(name),
            _ => None,
        }
    }

    /// Privileged flag, if present and parsed
    #[must_use]
    pub fn privileged(&self) -> Option<bool> {
        match self.get("privileged").map(|f| &f.value) {
            Some(FieldValue::Privileged(flag)) => Some(*flag),
            _ => None,
        }
    }

    /// Set the image
    pub fn set_image(&mut self, image: Image) -> Option<Field> {
        self.set(Field::image(image))
    }

    /// Set the ports
    pub fn set_ports(&mut self, ports: PortList) -> Option<Field> {
        self.set(Field::ports(ports))
    }

    /// Set the volumes
    pub fn set_volumes(&mut self, volumes: VolumeList) -> Option<Field> {
        self.set(Field::volumes(volumes))
    }

    /// First field of a kind
    #[must_use]
    pub fn field_of_kind(&self, kind: FieldKind) -> Option<&Field> {
        self.fields.values().find(|f| f.kind == kind)
    }

    /// Errors retained on rejected fields, in declaration order
    pub fn errors(&self) -> impl Iterator<Item = &FieldError> {
        self.fields.values().filter_map(Field::error)
    }

    /// Whether any field was rejected
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }
}

impl PartialEq for Service {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.fields.iter().eq(other.fields.iter())
    }
}

impl Eq for Service {}
