//! Dialect parsers: raw decoded tree to canonical document.
//!
//! One generic walk serves every dialect. The dialect only contributes its
//! [`DialectTable`]; field interpretation goes through a [`HandlerTable`].
//! The walk visits every field once and keeps going after a problem, so a
//! failure reports everything that is wrong with the tree.

mod handlers;
mod list;

pub use handlers::{Handler, HandlerContext, HandlerTable};

use crate::detect::detect;
use crate::table::DialectTable;
use serde_json::{Map, Value};
use stevedore_compose::{
    ComposeDocument, ConfigBag, DocumentLayout, Field, FieldError, FieldKind, GlobalVolume,
    Network, Scope, Section, Service,
};
use stevedore_core::literal::{scalar_literal, type_name};
use stevedore_core::Dialect;
use stevedore_policy::Policy;
use thiserror::Error;
use tracing::{debug, warn};

/// A tree that parsed with errors
///
/// Keeps the partially-built document, with every rejected field retained in
/// place, and the complete error list in walk order.
#[derive(Debug, Clone, Error)]
#[error("compose document has {} invalid field(s)", errors.len())]
pub struct ParseFailure {
    /// Partially-built document
    pub document: ComposeDocument,
    /// Every error, in walk order
    pub errors: Vec<FieldError>,
}

/// Parse result type
pub type ParseResult = Result<ComposeDocument, ParseFailure>;

/// Parser for one dialect under one policy
#[derive(Debug, Clone)]
pub struct Parser<'p> {
    table: &'static DialectTable,
    handlers: HandlerTable,
    policy: &'p Policy,
}

impl<'p> Parser<'p> {
    /// Create a parser with the standard handlers
    #[must_use]
    pub fn new(dialect: Dialect, policy: &'p Policy) -> Self {
        Self {
            table: DialectTable::of(dialect),
            handlers: HandlerTable::standard(),
            policy,
        }
    }

    /// Use a different handler table
    #[must_use]
    pub fn with_handlers(mut self, handlers: HandlerTable) -> Self {
        self.handlers = handlers;
        self
    }

    /// Dialect being parsed
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.table.dialect
    }

    /// Parse a raw tree
    ///
    /// # Errors
    ///
    /// Returns [`ParseFailure`] if any field was rejected. The failure still
    /// carries the document built from everything else.
    pub fn parse(&self, raw: &Value) -> ParseResult {
        let mut doc = ComposeDocument::new(self.policy.clone());
        *doc.layout_mut() = DocumentLayout::parsed(self.dialect());

        match raw {
            Value::Object(root) if self.table.has_sections() => self.parse_sections(root, &mut doc),
            Value::Object(root) => self.parse_flat(root, &mut doc),
            other => doc.reject(FieldError::structural(
                Scope::Document,
                "",
                "",
                other.clone(),
                format!("document root must be a map, found {}", type_name(other)),
            )),
        }

        finish(doc)
    }

    fn parse_sections(&self, root: &Map<String, Value>, doc: &mut ComposeDocument) {
        for (key, value) in root {
            let Some(section) = Section::from_key(key) else {
                doc.reject(FieldError::unsupported(Scope::Document, "", key, value.clone()));
                continue;
            };
            doc.layout_mut().record(section);

            match section {
                Section::Version => self.parse_version(value, doc),
                Section::Services => match value {
                    Value::Object(services) => self.parse_services(services, doc),
                    other => reject_section(doc, section, other),
                },
                Section::Volumes | Section::Networks => match value {
                    Value::Object(entries) => self.parse_globals(section, entries, doc),
                    Value::Null => {}
                    other => reject_section(doc, section, other),
                },
            }
        }
    }

    /// V1: a scalar `version` key is the version, every other key a service
    fn parse_flat(&self, root: &Map<String, Value>, doc: &mut ComposeDocument) {
        let version = root.get(Section::Version.key()).filter(|v| !v.is_object());
        if let Some(version) = version {
            doc.layout_mut().record(Section::Version);
            self.parse_version(version, doc);
        }
        let services = root
            .iter()
            .filter(|(key, _)| version.is_none() || key.as_str() != Section::Version.key());
        self.parse_services(services, doc);
    }

    fn parse_version(&self, value: &Value, doc: &mut ComposeDocument) {
        doc.layout_mut().version = Some(value.clone());
        let matches = scalar_literal(value)
            .and_then(|literal| Dialect::from_version(&literal).ok())
            .is_some_and(|dialect| dialect == self.dialect());
        if !matches {
            let error = FieldError::structural(
                Scope::Document,
                "",
                Section::Version.key(),
                value.clone(),
                format!("version {} does not belong to dialect {}", value, self.dialect()),
            );
            doc.reject_in(Section::Version, error);
        }
    }

    fn parse_services<'t>(
        &self,
        services: impl IntoIterator<Item = (&'t String, &'t Value)>,
        doc: &mut ComposeDocument,
    ) {
        for (name, raw) in services {
            let mut service = match Service::new(name.as_str()) {
                Ok(service) => service,
                Err(e) => {
                    let error = FieldError::structural(
                        Scope::Document,
                        "",
                        name,
                        raw.clone(),
                        e.to_string(),
                    );
                    doc.reject_in(Section::Services, error);
                    continue;
                }
            };

            match raw {
                Value::Object(fields) => {
                    for (field_name, value) in fields {
                        service.set(self.interpret(name, field_name, value));
                    }
                }
                Value::Null => {}
                other => {
                    let error = FieldError::structural(
                        Scope::Service,
                        name,
                        "",
                        other.clone(),
                        format!("service must be a map, found {}", type_name(other)),
                    );
                    doc.reject_in(Section::Services, error);
                    continue;
                }
            }

            debug!(service = %name, fields = service.len(), "parsed service");
            doc.add_service(service);
        }
    }

    /// Interpret one service field
    ///
    /// Dispatched kinds go to their handler unless the policy denies the
    /// capability gating the field, in which case the raw value is kept as
    /// is. Everything else is checked against the allow-list.
    fn interpret(&self, service: &str, name: &str, raw: &Value) -> Field {
        let kind = FieldKind::of(name);

        if let Some(handler) = self.handlers.get(kind) {
            if kind.gate().is_some_and(|cap| !self.policy.allows(cap)) {
                return Field::opaque(name, raw.clone());
            }
            let ctx = HandlerContext {
                table: self.table,
                service,
            };
            return match handler(&ctx, raw) {
                Ok(value) => Field::new(name, value),
                Err(message) => Field::invalid(FieldError::structural(
                    Scope::Service,
                    service,
                    name,
                    raw.clone(),
                    message,
                )),
            };
        }

        if self.table.allows(Scope::Service, name) {
            Field::opaque(name, raw.clone())
        } else {
            Field::invalid(FieldError::unsupported(
                Scope::Service,
                service,
                name,
                raw.clone(),
            ))
        }
    }

    fn parse_globals(
        &self,
        section: Section,
        entries: &Map<String, Value>,
        doc: &mut ComposeDocument,
    ) {
        let scope = match section {
            Section::Volumes => Scope::Volume,
            _ => Scope::Network,
        };

        for (name, raw) in entries {
            let config = match raw {
                Value::Object(config) => Some(config),
                Value::Null => None,
                other => {
                    let error = FieldError::structural(
                        scope,
                        name,
                        "",
                        other.clone(),
                        format!("{} must be a map, found {}", scope, type_name(other)),
                    );
                    doc.reject_in(section, error);
                    continue;
                }
            };

            let mut bag = ConfigBag::new();
            for (key, value) in config.into_iter().flatten() {
                if self.table.allows(scope, key) {
                    bag.set(key.as_str(), value.clone());
                } else {
                    bag.reject(FieldError::unsupported(scope, name, key, value.clone()));
                }
            }

            let added = match scope {
                Scope::Volume => GlobalVolume::new(name.as_str()).map(|mut volume| {
                    volume.config = bag;
                    doc.add_volume(volume);
                }),
                _ => Network::new(name.as_str()).map(|mut network| {
                    network.config = bag;
                    doc.add_network(network);
                }),
            };
            if let Err(e) = added {
                let error = FieldError::structural(
                    Scope::Document,
                    "",
                    name,
                    raw.clone(),
                    e.to_string(),
                );
                doc.reject_in(section, error);
            }
        }
    }
}

fn reject_section(doc: &mut ComposeDocument, section: Section, raw: &Value) {
    let error = FieldError::structural(
        Scope::Document,
        "",
        section.key(),
        raw.clone(),
        format!("'{}' must be a map, found {}", section.key(), type_name(raw)),
    );
    doc.reject_in(section, error);
}

fn finish(doc: ComposeDocument) -> ParseResult {
    let errors: Vec<FieldError> = doc.errors().into_iter().cloned().collect();
    if errors.is_empty() {
        return Ok(doc);
    }
    for error in &errors {
        warn!(path = %error.path(), "{}", error.message);
    }
    Err(ParseFailure {
        document: doc,
        errors,
    })
}

/// Parse a raw tree as `dialect` under `policy`
///
/// # Errors
///
/// Returns [`ParseFailure`] if any field was rejected
pub fn parse(raw: &Value, dialect: Dialect, policy: &Policy) -> ParseResult {
    Parser::new(dialect, policy).parse(raw)
}

/// Detect the dialect of a raw tree, then parse it
///
/// # Errors
///
/// Returns [`ParseFailure`] if the dialect cannot be detected or any field
/// was rejected
pub fn parse_detected(raw: &Value, policy: &Policy) -> ParseResult {
    match detect(raw) {
        Ok(dialect) => parse(raw, dialect, policy),
        Err(error) => {
            let mut doc = ComposeDocument::new(policy.clone());
            doc.reject(error);
            finish(doc)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stevedore_compose::{Build, FieldErrorKind, FieldValue, ListEncoding};

    fn pro() -> Policy {
        Policy::permissive("pro")
    }

    #[test]
    fn test_parse_v3_document() {
        let raw = json!({
            "version": "3.8",
            "services": {
                "web": {
                    "image": "nginx:1.25",
                    "ports": ["8080:80"],
                    "restart": "always",
                    "environment": {"A": "1"}
                }
            },
            "volumes": {"data": null},
            "networks": {"front": {"driver": "bridge"}}
        });
        let doc = parse(&raw, Dialect::V3, &pro()).unwrap();
        let web = doc.service("web").unwrap();
        let names: Vec<_> = web.field_names().collect();
        assert_eq!(names, vec!["image", "ports", "restart", "environment"]);
        assert_eq!(web.get("environment").unwrap().value, FieldValue::Opaque(json!({"A": "1"})));
        assert!(doc.volume("data").unwrap().config.is_empty());
        assert_eq!(doc.network("front").unwrap().config.get("driver"), Some(&json!("bridge")));
        assert_eq!(doc.layout().version, Some(json!("3.8")));
        assert_eq!(doc.layout().dialect, Some(Dialect::V3));
    }

    #[test]
    fn test_parse_v1_flat() {
        let raw = json!({
            "web": {"image": "nginx", "net": "host"},
            "db": {"image": "postgres:16"}
        });
        let doc = parse(&raw, Dialect::V1, &pro()).unwrap();
        let names: Vec<_> = doc.service_names().collect();
        assert_eq!(names, vec!["web", "db"]);
        assert_eq!(doc.service("web").unwrap().get("net").unwrap().kind, FieldKind::Other);
    }

    #[test]
    fn test_parse_collects_all_errors() {
        let raw = json!({
            "version": "3",
            "services": {
                "web": {"image": "a:b:c:d", "gpus": "all", "restart": "always"},
                "db": {"ports": "5432", "image": "postgres"}
            },
            "secrets": {}
        });
        let failure = parse(&raw, Dialect::V3, &pro()).unwrap_err();
        let paths: Vec<_> = failure.errors.iter().map(FieldError::path).collect();
        assert_eq!(
            paths,
            vec!["services.web.image", "services.web.gpus", "services.db.ports", "secrets"]
        );
        assert_eq!(failure.errors[1].kind, FieldErrorKind::Unsupported);

        let web = failure.document.service("web").unwrap();
        assert!(web.get("image").unwrap().is_invalid());
        assert!(web.get("restart").is_some());
        assert!(failure.document.service("db").unwrap().image().is_some());
    }

    #[test]
    fn test_dispatched_fields_bypass_allow_list() {
        // `context` is on no service allow-list but is still interpreted
        let raw = json!({"services": {"web": {"context": "./web"}}, "version": "2"});
        let doc = parse(&raw, Dialect::V2, &pro()).unwrap();
        assert_eq!(
            doc.service("web").unwrap().get("context").unwrap().value,
            FieldValue::Context("./web".into())
        );
    }

    #[test]
    fn test_denied_capability_kept_opaque() {
        let shared = Policy::restrictive("shared");
        let raw = json!({"services": {"web": {
            "build": {"no_context": true},
            "privileged": "yes",
            "container_name": "a"
        }}});
        let doc = parse(&raw, Dialect::V3, &shared).unwrap();
        let web = doc.service("web").unwrap();
        let build = web.get("build").unwrap();
        assert_eq!(build.kind, FieldKind::Build);
        assert_eq!(build.value, FieldValue::Opaque(json!({"no_context": true})));
        assert_eq!(web.get("privileged").unwrap().kind, FieldKind::Privileged);
        assert!(web.build().is_none());

        let failure = parse(&raw, Dialect::V3, &pro()).unwrap_err();
        assert_eq!(failure.errors.len(), 3);
    }

    #[test]
    fn test_build_map_by_dialect() {
        let v2 = json!({"version": "2", "services": {"web": {"build": {"context": "."}}}});
        let doc = parse(&v2, Dialect::V2, &pro()).unwrap();
        assert!(matches!(doc.service("web").unwrap().build(), Some(Build::Detailed(_))));

        let v1 = json!({"web": {"build": {"context": "."}}});
        assert!(parse(&v1, Dialect::V1, &pro()).is_err());
    }

    #[test]
    fn test_map_encoding_remembered() {
        let raw = json!({"services": {"web": {"ports": {"8080": "80"}}}});
        let doc = parse(&raw, Dialect::V3, &pro()).unwrap();
        let ports = doc.service("web").unwrap().ports().unwrap();
        assert_eq!(ports.encoding, ListEncoding::Mapping);
    }

    #[test]
    fn test_invalid_service_name_skipped() {
        let raw = json!({"services": {"my app": {"image": "nginx"}, "web": {"image": "nginx"}}});
        let failure = parse(&raw, Dialect::V3, &pro()).unwrap_err();
        assert_eq!(failure.errors.len(), 1);
        assert_eq!(failure.errors[0].field_name, "my app");
        assert_eq!(failure.errors[0].message, "Invalid service name: 'my app'");
        let names: Vec<_> = failure.document.service_names().collect();
        assert_eq!(names, vec!["web"]);
    }

    #[test]
    fn test_rejected_entries_keep_declaration_order() {
        let raw = json!({
            "version": "3",
            "services": {
                "web": {"image": "acme/web:1", "gpus": "all"},
                "my app": {"image": "nginx"},
                "db": {"image": "postgres", "ports": "5432"}
            },
            "networks": {"front": 1, "back": {"labels": {}}}
        });
        let failure = parse(&raw, Dialect::V3, &pro()).unwrap_err();
        let paths: Vec<_> = failure.errors.iter().map(FieldError::path).collect();
        assert_eq!(
            paths,
            vec![
                "services.web.gpus",
                "my app",
                "services.db.ports",
                "networks.front",
                "networks.back.labels"
            ]
        );
        let errors: Vec<_> = failure.document.errors().into_iter().cloned().collect();
        assert_eq!(errors, failure.errors);
    }

    #[test]
    fn test_v1_version_key() {
        let raw = json!({"version": "1", "web": {"image": "nginx"}});
        let doc = parse(&raw, Dialect::V1, &pro()).unwrap();
        let names: Vec<_> = doc.service_names().collect();
        assert_eq!(names, vec!["web"]);
        assert_eq!(doc.layout().version, Some(json!("1")));

        let numeric = parse_detected(&json!({"version": 1, "web": {}}), &pro()).unwrap();
        assert_eq!(numeric.layout().dialect, Some(Dialect::V1));

        let failure = parse(&json!({"version": "2", "web": {}}), Dialect::V1, &pro()).unwrap_err();
        assert_eq!(failure.errors.len(), 1);
        assert_eq!(failure.errors[0].field_name, "version");
        assert!(failure.document.service("web").is_some());
    }

    #[test]
    fn test_global_unsupported_field() {
        let raw = json!({
            "version": "3",
            "services": {},
            "volumes": {"data": {"driver": "local", "labels": {}}}
        });
        let failure = parse(&raw, Dialect::V3, &pro()).unwrap_err();
        assert_eq!(failure.errors[0].path(), "volumes.data.labels");
        let data = failure.document.volume("data").unwrap();
        assert_eq!(data.config.entries().len(), 1);
    }

    #[test]
    fn test_version_mismatch() {
        let raw = json!({"version": "2.4", "services": {}});
        let failure = parse(&raw, Dialect::V3, &pro()).unwrap_err();
        assert_eq!(failure.errors[0].field_name, "version");
        assert!(parse(&raw, Dialect::V2, &pro()).is_ok());
    }

    #[test]
    fn test_non_map_root() {
        let failure = parse(&json!(["web"]), Dialect::V1, &pro()).unwrap_err();
        assert_eq!(failure.errors.len(), 1);
        assert!(failure.document.is_empty());
    }

    #[test]
    fn test_parse_detected() {
        let raw = json!({"version": "2.1", "services": {"web": {"image": "nginx"}}});
        let doc = parse_detected(&raw, &pro()).unwrap();
        assert_eq!(doc.layout().dialect, Some(Dialect::V2));

        let failure = parse_detected(&json!({"version": "9"}), &pro()).unwrap_err();
        assert_eq!(failure.errors[0].field_name, "version");
    }

    #[test]
    fn test_parse_is_deterministic() {
        let raw = json!({"services": {"web": {"image": "nginx", "ports": ["80:80", 443]}}});
        let a = parse(&raw, Dialect::V3, &pro()).unwrap();
        let b = parse(&raw, Dialect::V3, &pro()).unwrap();
        assert_eq!(a, b);
    }
}
