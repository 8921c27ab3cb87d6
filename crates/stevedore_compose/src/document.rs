//! The canonical compose document.

use crate::error::{FieldError, ModelError, ModelResult, Scope};
use crate::global::{GlobalVolume, Network};
use crate::service::Service;
use indexmap::IndexMap;
use serde_json::Value;
use stevedore_core::Dialect;
use stevedore_policy::Policy;

/// Top-level section of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// `version`
    Version,
    /// `services`
    Services,
    /// `volumes`
    Volumes,
    /// `networks`
    Networks,
}

impl Section {
    /// Walk order when nothing was recorded
    pub const DEFAULT_ORDER: [Section; 4] = [
        Self::Version,
        Self::Services,
        Self::Volumes,
        Self::Networks,
    ];

    /// Key of the section
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Version => "version",
            Self::Services => "services",
            Self::Volumes => "volumes",
            Self::Networks => "networks",
        }
    }

    /// Section for a top-level key
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::DEFAULT_ORDER.into_iter().find(|s| s.key() == key)
    }
}

/// Source layout kept for faithful re-serialization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentLayout {
    /// Dialect the document was parsed from
    pub dialect: Option<Dialect>,
    /// Original `version` value, string or number
    pub version: Option<Value>,
    /// Top-level sections in source order
    pub sections: Vec<Section>,
}

impl DocumentLayout {
    /// Layout of a document parsed from `dialect`
    #[must_use]
    pub fn parsed(dialect: Dialect) -> Self {
        Self {
            dialect: Some(dialect),
            ..Self::default()
        }
    }

    /// Record a section once, in encounter order
    pub fn record(&mut self, section: Section) {
        if !self.sections.contains(&section) {
            self.sections.push(section);
        }
    }

    /// Whether the section appeared in the source
    #[must_use]
    pub fn has(&self, section: Section) -> bool {
        self.sections.contains(&section)
    }

    /// Recorded sections followed by the missing ones in default order
    #[must_use]
    pub fn section_order(&self) -> Vec<Section> {
        let mut order = self.sections.clone();
        for section in Section::DEFAULT_ORDER {
            if !order.contains(&section) {
                order.push(section);
            }
        }
        order
    }
}

/// Where a rejected entry sat in the source walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// Between top-level sections, before the n-th walked section
    Top(usize),
    /// Inside a section, before its n-th retained entry
    Entry(Section, usize),
}

/// One step of the document walk
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    /// Entry rejected before it could become part of the model
    Rejected(&'a FieldError),
    /// A service
    Service(&'a Service),
    /// A global volume
    Volume(&'a GlobalVolume),
    /// A network
    Network(&'a Network),
}

impl<'a> Node<'a> {
    /// Errors retained by this node, in declaration order
    pub fn errors(&self) -> Box<dyn Iterator<Item = &'a FieldError> + 'a> {
        match *self {
            Self::Rejected(error) => Box::new(std::iter::once(error)),
            Self::Service(service) => Box::new(service.errors()),
            Self::Volume(volume) => Box::new(volume.config.errors().iter()),
            Self::Network(network) => Box::new(network.config.errors().iter()),
        }
    }
}

/// Canonical, dialect-independent compose document
///
/// Owns its services, volumes and networks. Structural equality compares those
/// three collections in order and ignores the layout and attached policy.
#[derive(Debug, Clone)]
pub struct ComposeDocument {
    services: IndexMap<String, Service>,
    volumes: IndexMap<String, GlobalVolume>,
    networks: IndexMap<String, Network>,
    rejected: Vec<(Anchor, FieldError)>,
    policy: Policy,
    layout: DocumentLayout,
}

impl ComposeDocument {
    /// Create an empty document governed by `policy`
    #[must_use]
    pub fn new(policy: Policy) -> Self {
        Self {
            services: IndexMap::new(),
            volumes: IndexMap::new(),
            networks: IndexMap::new(),
            rejected: Vec::new(),
            policy,
            layout: DocumentLayout::default(),
        }
    }

    /// Attached policy
    #[must_use]
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Attach a different policy
    pub fn attach_policy(&mut self, policy: Policy) {
        self.policy = policy;
    }

    /// Source layout
    #[must_use]
    pub fn layout(&self) -> &DocumentLayout {
        &self.layout
    }

    /// Mutable source layout
    pub fn layout_mut(&mut self) -> &mut DocumentLayout {
        &mut self.layout
    }

    /// Services in declaration order
    pub fn services(&self) -> impl Iterator<Item = &Service> {
        self.services.values()
    }

    /// Get a service
    #[must_use]
    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.get(name)
    }

    /// Get a mutable service
    pub fn service_mut(&mut self, name: &str) -> Option<&mut Service> {
        self.services.get_mut(name)
    }

    /// Get a mutable service or fail
    ///
    /// # Errors
    ///
    /// Returns error if there is no such service
    pub fn require_service_mut(&mut self, name: &str) -> ModelResult<&mut Service> {
        self.services.get_mut(name).ok_or_else(|| ModelError::NotFound {
            scope: Scope::Service,
            name: name.to_string(),
        })
    }

    /// Add or replace a service; a replaced service keeps its position
    pub fn add_service(&mut self, service: Service) -> Option<Service> {
        self.services.insert(service.name().to_string(), service)
    }

    /// Remove a service
    pub fn remove_service(&mut self, name: &str) -> Option<Service> {
        self.services.shift_remove(name)
    }

    /// Service names in declaration order
    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    /// Global volumes in declaration order
    pub fn volumes(&self) -> impl Iterator<Item = &GlobalVolume> {
        self.volumes.values()
    }

    /// Get a global volume
    #[must_use]
    pub fn volume(&self, name: &str) -> Option<&GlobalVolume> {
        self.volumes.get(name)
    }

    /// Get a mutable global volume
    pub fn volume_mut(&mut self, name: &str) -> Option<&mut GlobalVolume> {
        self.volumes.get_mut(name)
    }

    /// Add or replace a global volume
    pub fn add_volume(&mut self, volume: GlobalVolume) -> Option<GlobalVolume> {
        self.volumes.insert(volume.name().to_string(), volume)
    }

    /// Remove a global volume
    pub fn remove_volume(&mut self, name: &str) -> Option<GlobalVolume> {
        self.volumes.shift_remove(name)
    }

    /// Networks in declaration order
    pub fn networks(&self) -> impl Iterator<Item = &Network> {
        self.networks.values()
    }

    /// Get a network
    #[must_use]
    pub fn network(&self, name: &str) -> Option<&Network> {
        self.networks.get(name)
    }

    /// Get a mutable network
    pub fn network_mut(&mut self, name: &str) -> Option<&mut Network> {
        self.networks.get_mut(name)
    }

    /// Add or replace a network
    pub fn add_network(&mut self, network: Network) -> Option<Network> {
        self.networks.insert(network.name().to_string(), network)
    }

    /// Remove a network
    pub fn remove_network(&mut self, name: &str) -> Option<Network> {
        self.networks.shift_remove(name)
    }

    /// Record a top-level problem at the current point of the section walk
    pub fn reject(&mut self, error: FieldError) {
        let anchor = Anchor::Top(self.layout.sections.len());
        self.rejected.push((anchor, error));
    }

    /// Record an entry of `section` that could not be kept, at the current
    /// point of that section's walk
    pub fn reject_in(&mut self, section: Section, error: FieldError) {
        let index = match section {
            Section::Version => 0,
            Section::Services => self.services.len(),
            Section::Volumes => self.volumes.len(),
            Section::Networks => self.networks.len(),
        };
        self.rejected.push((Anchor::Entry(section, index), error));
    }

    /// Rejected entries with their anchors, in recording order
    pub fn rejected(&self) -> impl Iterator<Item = (Anchor, &FieldError)> {
        self.rejected.iter().map(|(anchor, error)| (*anchor, error))
    }

    /// Sections in layout order, each entry preceded by the rejected entries
    /// declared before it
    #[must_use]
    pub fn walk(&self) -> Vec<Node<'_>> {
        let order = self.layout.section_order();
        let mut nodes = Vec::new();
        for (position, section) in order.iter().copied().enumerate() {
            self.push_rejected(&mut nodes, |anchor| anchor == Anchor::Top(position));
            match section {
                Section::Version => self.walk_entries(&mut nodes, section, std::iter::empty()),
                Section::Services => {
                    let entries = self.services.values().map(Node::Service);
                    self.walk_entries(&mut nodes, section, entries);
                }
                Section::Volumes => {
                    let entries = self.volumes.values().map(Node::Volume);
                    self.walk_entries(&mut nodes, section, entries);
                }
                Section::Networks => {
                    let entries = self.networks.values().map(Node::Network);
                    self.walk_entries(&mut nodes, section, entries);
                }
            }
        }
        self.push_rejected(
            &mut nodes,
            |anchor| matches!(anchor, Anchor::Top(position) if position >= order.len()),
        );
        nodes
    }

    fn walk_entries<'a>(
        &'a self,
        nodes: &mut Vec<Node<'a>>,
        section: Section,
        entries: impl ExactSizeIterator<Item = Node<'a>>,
    ) {
        let len = entries.len();
        for (index, node) in entries.enumerate() {
            self.push_rejected(nodes, |anchor| anchor == Anchor::Entry(section, index));
            nodes.push(node);
        }
        // entries removed after parsing leave their rejections at the tail
        self.push_rejected(nodes, |anchor| {
            matches!(anchor, Anchor::Entry(s, index) if s == section && index >= len)
        });
    }

    fn push_rejected<'a>(&'a self, nodes: &mut Vec<Node<'a>>, at: impl Fn(Anchor) -> bool) {
        nodes.extend(
            self.rejected
                .iter()
                .filter(|(anchor, _)| at(*anchor))
                .map(|(_, error)| Node::Rejected(error)),
        );
    }

    /// Every retained error, in walk order
    #[must_use]
    pub fn errors(&self) -> Vec<&FieldError> {
        self.walk().iter().flat_map(Node::errors).collect()
    }

    /// Whether there are no services, volumes or networks
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty() && self.volumes.is_empty() && self.networks.is_empty()
    }
}

impl Default for ComposeDocument {
    fn default() -> Self {
        Self::new(Policy::default())
    }
}

impl PartialEq for ComposeDocument {
    fn eq(&self, other: &Self) -> bool {
        self.services.iter().eq(other.services.iter())
            && self.volumes.iter().eq(other.volumes.iter())
            && self.networks.iter().eq(other.networks.iter())
    }
}

impl Eq for ComposeDocument {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use serde_json::json;
    use stevedore_core::Image;

    fn doc() -> ComposeDocument {
        let mut doc = ComposeDocument::new(Policy::restrictive("shared"));
        let mut web = Service::new("web").unwrap();
        web.set_image(Image::parse("nginx:1.25").unwrap());
        doc.add_service(web);
        doc.add_service(Service::new("db").unwrap());
        doc.add_volume(GlobalVolume::new("data").unwrap());
        doc.add_network(Network::new("front").unwrap());
        doc
    }

    #[test]
    fn test_document_order() {
        let doc = doc();
        let names: Vec<_> = doc.service_names().collect();
        assert_eq!(names, vec!["web", "db"]);
    }

    #[test]
    fn test_document_replace_service_keeps_position() {
        let mut doc = doc();
        let mut web = Service::new("web").unwrap();
        web.set(Field::opaque("restart", json!("always")));
        let old = doc.add_service(web);
        assert!(old.is_some());
        let names: Vec<_> = doc.service_names().collect();
        assert_eq!(names, vec!["web", "db"]);
        assert!(doc.service("web").unwrap().image().is_none());
    }

    #[test]
    fn test_document_equality_ignores_layout_and_policy() {
        let a = doc();
        let mut b = doc();
        b.attach_policy(Policy::permissive("pro"));
        b.layout_mut().record(Section::Networks);
        b.layout_mut().version = Some(json!("3.8"));
        assert_eq!(a, b);

        b.remove_network("front");
        assert_ne!(a, b);
    }

    #[test]
    fn test_layout_section_order() {
        let mut layout = DocumentLayout::parsed(Dialect::V2);
        layout.record(Section::Services);
        layout.record(Section::Version);
        layout.record(Section::Services);
        assert_eq!(
            layout.section_order(),
            vec![
                Section::Services,
                Section::Version,
                Section::Volumes,
                Section::Networks
            ]
        );
        assert!(layout.has(Section::Version));
        assert!(!layout.has(Section::Volumes));
    }

    #[test]
    fn test_section_keys() {
        for section in Section::DEFAULT_ORDER {
            assert_eq!(Section::from_key(section.key()), Some(section));
        }
        assert_eq!(Section::from_key("secrets"), None);
    }

    #[test]
    fn test_require_service_mut() {
        let mut doc = doc();
        assert!(doc.require_service_mut("web").is_ok());
        assert_eq!(
            doc.require_service_mut("cache").unwrap_err(),
            ModelError::NotFound {
                scope: Scope::Service,
                name: "cache".to_string()
            }
        );
    }

    #[test]
    fn test_document_errors_walk_order() {
        let mut doc = ComposeDocument::new(Policy::restrictive("shared"));
        doc.layout_mut().record(Section::Services);
        doc.reject(FieldError::unsupported(Scope::Document, "", "secrets", json!({})));

        let mut web = Service::new("web").unwrap();
        let err = FieldError::structural(Scope::Service, "web", "image", json!(1), "bad image");
        web.set(Field::invalid(err));
        doc.add_service(web);
        doc.reject_in(
            Section::Services,
            FieldError::structural(Scope::Document, "", "my app", json!({}), "bad name"),
        );
        doc.add_service(Service::new("db").unwrap());

        let errors = doc.errors();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].owner, "web");
        assert_eq!(errors[1].field_name, "my app");
        assert_eq!(errors[2].field_name, "secrets");
    }

    #[test]
    fn test_walk_interleaves_rejected_entries() {
        let mut doc = ComposeDocument::new(Policy::restrictive("shared"));
        doc.reject_in(
            Section::Volumes,
            FieldError::structural(Scope::Volume, "bad", "", json!(1), "not a map"),
        );
        doc.add_volume(GlobalVolume::new("data").unwrap());
        doc.add_service(Service::new("web").unwrap());

        let walk: Vec<String> = doc
            .walk()
            .iter()
            .map(|node| match node {
                Node::Rejected(e) => format!("rejected:{}", e.owner),
                Node::Service(s) => format!("service:{}", s.name()),
                Node::Volume(v) => format!("volume:{}", v.name()),
                Node::Network(n) => format!("network:{}", n.name()),
            })
            .collect();
        assert_eq!(walk, vec!["service:web", "rejected:bad", "volume:data"]);
    }

    #[test]
    fn test_walk_keeps_rejections_of_removed_entries() {
        let mut doc = doc();
        doc.reject_in(
            Section::Services,
            FieldError::structural(Scope::Document, "", "my app", json!({}), "bad name"),
        );
        doc.remove_service("db");
        doc.remove_service("web");
        let errors = doc.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field_name, "my app");
    }
}
