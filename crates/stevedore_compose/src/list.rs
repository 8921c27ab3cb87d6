//! Port and volume lists that remember their physical encoding.

use stevedore_core::{CoreResult, Port, ServiceVolume};
use std::collections::HashSet;

/// How a list was written in the source tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ListEncoding {
    /// `["8080:80", "443"]`
    #[default]
    Sequence,
    /// `{"8080": "80"}`, keyed by source
    Mapping,
}

/// Item that can be keyed by its source in the mapping encoding
pub trait MappedItem: Sized + Clone {
    /// Source component, the mapping key
    fn source(&self) -> Option<&str>;

    /// Literal without the source, the mapping value
    fn value_literal(&self) -> String;

    /// Full literal, the sequence entry
    fn literal(&self) -> String;

    /// Parse a full literal
    ///
    /// # Errors
    ///
    /// Returns error if the literal violates the item grammar
    fn parse_literal(literal: &str) -> CoreResult<Self>;
}

impl MappedItem for Port {
    fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn value_literal(&self) -> String {
        self.target_literal()
    }

    fn literal(&self) -> String {
        self.to_string()
    }

    fn parse_literal(literal: &str) -> CoreResult<Self> {
        Port::parse(literal)
    }
}

impl MappedItem for ServiceVolume {
    fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn value_literal(&self) -> String {
        self.target_literal()
    }

    fn literal(&self) -> String {
        self.to_string()
    }

    fn parse_literal(literal: &str) -> CoreResult<Self> {
        ServiceVolume::parse(literal)
    }
}

/// Ordered list of typed items plus the encoding it was read from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedList<T> {
    /// Items in declaration order
    pub items: Vec<T>,
    /// Original encoding
    pub encoding: ListEncoding,
}

/// Ports of a service
pub type PortList = EncodedList<Port>;

/// Volumes of a service
pub type VolumeList = EncodedList<ServiceVolume>;

impl<T: MappedItem> EncodedList<T> {
    /// Create a list written as a sequence
    #[must_use]
    pub fn sequence(items: Vec<T>) -> Self {
        Self {
            items,
            encoding: ListEncoding::Sequence,
        }
    }

    /// Create a list written as a source-keyed map
    #[must_use]
    pub fn mapping(items: Vec<T>) -> Self {
        Self {
            items,
            encoding: ListEncoding::Mapping,
        }
    }

    /// Whether every item has a distinct source
    #[must_use]
    pub fn can_encode_as_mapping(&self) -> bool {
        let mut seen = HashSet::new();
        self.items
            .iter()
            .all(|item| item.source().is_some_and(|s| seen.insert(s)))
    }

    /// Encoding a translator should write
    ///
    /// Falls back to the sequence encoding when a fix has made the list
    /// impossible to key by source.
    #[must_use]
    pub fn effective_encoding(&self) -> ListEncoding {
        match self.encoding {
            ListEncoding::Mapping if self.can_encode_as_mapping() => ListEncoding::Mapping,
            _ => ListEncoding::Sequence,
        }
    }

    /// Number of items
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over items
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}
