//! Model errors and retained field errors.

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Model result type
pub type ModelResult<T> = Result<T, ModelError>;

/// Invalid construction input
///
/// These never occur for a document built from a valid canonical model; they
/// guard the programmatic building API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Name does not match `^[A-Za-z0-9._-]+$`
    #[error("Invalid {scope} name: '{name}'")]
    InvalidName {
        /// Kind of entry being named
        scope: Scope,
        /// Rejected name
        name: String,
    },
    /// No entry with this name
    #[error("{scope} not found: {name}")]
    NotFound {
        /// Kind of entry looked up
        scope: Scope,
        /// Missing name
        name: String,
    },
}

/// Where a field lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Top level of the document
    Document,
    /// A service definition
    Service,
    /// A global volume definition
    Volume,
    /// A network definition
    Network,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Document => "document",
            Self::Service => "service",
            Self::Volume => "volume",
            Self::Network => "network",
        })
    }
}

/// Category of a rejected field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldErrorKind {
    /// The value violates the field's grammar or shape
    Structural,
    /// The dialect does not know the field name
    Unsupported,
}

/// A field the dialect rejected, kept verbatim for reporting
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FieldError {
    /// Error category
    pub kind: FieldErrorKind,
    /// Scope of the owner
    pub scope: Scope,
    /// Owner name (service, volume or network); empty at document scope
    pub owner: String,
    /// Offending field name
    pub field_name: String,
    /// Raw value as decoded
    pub field_data: Value,
    /// Human-readable explanation
    pub message: String,
}

impl FieldError {
    /// A value that violates its grammar
    #[must_use]
    pub fn structural(
        scope: Scope,
        owner: impl Into<String>,
        field_name: impl Into<String>,
        field_data: Value,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind: FieldErrorKind::Structural,
            scope,
            owner: owner.into(),
            field_name: field_name.into(),
            field_data,
            message: message.into(),
        }
    }

    /// A field name outside the dialect allow-list
    #[must_use]
    pub fn unsupported(
        scope: Scope,
        owner: impl Into<String>,
        field_name: impl Into<String>,
        field_data: Value,
    ) -> Self {
        let owner = owner.into();
        let field_name = field_name.into();
        let message = if owner.is_empty() {
            format!("Unsupported top-level field '{}'", field_name)
        } else {
            format!(
                "Unsupported field '{}' in {} '{}'",
                field_name, scope, owner
            )
        };
        Self {
            kind: FieldErrorKind::Unsupported,
            scope,
            owner,
            field_name,
            field_data,
            message,
        }
    }

    /// Dotted location, e.g. `services.web.ports`
    #[must_use]
    pub fn path(&self) -> String {
        let section = match self.scope {
            Scope::Document => return self.field_name.clone(),
            Scope::Service => "services",
            Scope::Volume => "volumes",
            Scope::Network => "networks",
        };
        if self.field_name.is_empty() {
            format!("{}.{}", section, self.owner)
        } else {
            format!("{}.{}.{}", section, self.owner, self.field_name)
        }
    }

    /// Whether the field name is unknown to the dialect
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        self.kind == FieldErrorKind::Unsupported
    }
}
