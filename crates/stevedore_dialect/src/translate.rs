//! Dialect translators: canonical document to raw tree.

use serde_json::{Map, Value};
use stevedore_compose::{
    ComposeDocument, ConfigBag, EncodedList, FieldValue, ListEncoding, MappedItem, Section,
    Service,
};
use stevedore_core::Dialect;
use tracing::warn;

/// Writes documents in one dialect
///
/// Output is not re-checked against the target dialect's allow-list.
#[derive(Debug, Clone, Copy)]
pub struct Translator {
    dialect: Dialect,
}

impl Translator {
    /// Create a translator targeting `dialect`
    #[must_use]
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// Target dialect
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Render a document as a raw tree
    #[must_use]
    pub fn translate(&self, doc: &ComposeDocument) -> Value {
        if !self.dialect.has_sections() {
            return self.translate_flat(doc);
        }

        let layout = doc.layout();
        let mut root = Map::new();
        for section in layout.section_order() {
            match section {
                Section::Version => {
                    root.insert(section.key().to_string(), self.version(doc));
                }
                Section::Services => {
                    root.insert(section.key().to_string(), Value::Object(render_services(doc)));
                }
                Section::Volumes => {
                    if doc.volumes().next().is_some() || layout.has(section) {
                        let volumes = doc
                            .volumes()
                            .map(|v| (v.name().to_string(), render_bag(&v.config)))
                            .collect();
                        root.insert(section.key().to_string(), Value::Object(volumes));
                    }
                }
                Section::Networks => {
                    if doc.networks().next().is_some() || layout.has(section) {
                        let networks = doc
                            .networks()
                            .map(|n| (n.name().to_string(), render_bag(&n.config)))
                            .collect();
                        root.insert(section.key().to_string(), Value::Object(networks));
                    }
                }
            }
        }
        Value::Object(root)
    }

    fn translate_flat(&self, doc: &ComposeDocument) -> Value {
        let volumes = doc.volumes().count();
        let networks = doc.networks().count();
        if volumes > 0 || networks > 0 {
            warn!(
                dialect = %self.dialect,
                volumes,
                networks,
                "global volumes and networks cannot be expressed, omitting"
            );
        }
        let layout = doc.layout();
        let mut root = Map::new();
        if let (Some(version), Some(dialect)) = (&layout.version, layout.dialect) {
            if dialect == self.dialect {
                root.insert(Section::Version.key().to_string(), version.clone());
            }
        }
        root.extend(render_services(doc));
        Value::Object(root)
    }

    /// The original literal when writing back to the source dialect
    fn version(&self, doc: &ComposeDocument) -> Value {
        let layout = doc.layout();
        match (&layout.version, layout.dialect) {
            (Some(original), Some(dialect)) if dialect == self.dialect => original.clone(),
            _ => self
                .dialect
                .default_version()
                .map_or(Value::Null, |v| Value::String(v.to_string())),
        }
    }
}

fn render_services(doc: &ComposeDocument) -> Map<String, Value> {
    doc.services()
        .map(|s| (s.name().to_string(), render_service(s)))
        .collect()
}

fn render_service(service: &Service) -> Value {
    let mut fields = Map::new();
    for field in service.fields() {
        let value = match &field.value {
            FieldValue::Ports(list) => Some(render_list(list)),
            FieldValue::Volumes(list) => Some(render_list(list)),
            other => other.to_value(),
        };
        if let Some(value) = value {
            fields.insert(field.name.clone(), value);
        }
    }
    Value::Object(fields)
}

fn render_list<T: MappedItem>(list: &EncodedList<T>) -> Value {
    match list.effective_encoding() {
        ListEncoding::Mapping => Value::Object(
            list.iter()
                .filter_map(|item| {
                    let source = item.source()?;
                    Some((source.to_string(), Value::String(item.value_literal())))
                })
                .collect(),
        ),
        ListEncoding::Sequence => {
            Value::Array(list.iter().map(|item| Value::String(item.literal())).collect())
        }
    }
}

fn render_bag(bag: &ConfigBag) -> Value {
    Value::Object(bag.entries().clone())
}

/// Render `doc` in `dialect`
#[must_use]
pub fn translate(doc: &ComposeDocument, dialect: Dialect) -> Value {
    Translator::new(dialect).translate(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;
    use serde_json::json;
    use stevedore_compose::{Field, FieldError, Scope};
    use stevedore_core::Port;
    use stevedore_policy::Policy;

    fn pro() -> Policy {
        Policy::permissive("pro")
    }

    #[test]
    fn test_translate_keeps_version_literal() {
        let raw = json!({"version": "3.8", "services": {"web": {"image": "nginx"}}});
        let doc = parse(&raw, Dialect::V3, &pro()).unwrap();
        assert_eq!(translate(&doc, Dialect::V3), raw);
        assert_eq!(translate(&doc, Dialect::V2)["version"], json!("2"));
    }

    #[test]
    fn test_translate_to_v1_drops_globals() {
        let raw = json!({
            "services": {"web": {"image": "nginx"}},
            "volumes": {"data": {}}
        });
        let doc = parse(&raw, Dialect::V3, &pro()).unwrap();
        assert_eq!(translate(&doc, Dialect::V1), json!({"web": {"image": "nginx"}}));
    }

    #[test]
    fn test_translate_from_v1_adds_version() {
        let raw = json!({"web": {"image": "nginx", "ports": [8080]}});
        let doc = parse(&raw, Dialect::V1, &pro()).unwrap();
        assert_eq!(
            translate(&doc, Dialect::V3),
            json!({"version": "3", "services": {"web": {"image": "nginx", "ports": ["8080"]}}})
        );
    }

    #[test]
    fn test_translate_v1_keeps_version_key() {
        let raw = json!({"version": 1, "web": {"image": "nginx"}});
        let doc = parse(&raw, Dialect::V1, &pro()).unwrap();
        assert_eq!(translate(&doc, Dialect::V1), raw);
        assert_eq!(translate(&doc, Dialect::V2)["version"], json!("2"));
    }

    #[test]
    fn test_translate_keeps_section_order() {
        let raw = json!({
            "networks": {"front": {"driver": "bridge"}},
            "services": {"web": {"image": "nginx"}},
            "version": "2"
        });
        let doc = parse(&raw, Dialect::V2, &pro()).unwrap();
        let out = translate(&doc, Dialect::V2);
        let keys: Vec<_> = out.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["networks", "services", "version"]);
    }

    #[test]
    fn test_translate_map_encoding() {
        let raw = json!({"services": {"web": {"ports": {"8080": "80", "9000": "90/udp"}}}});
        let mut doc = parse(&raw, Dialect::V3, &pro()).unwrap();
        assert_eq!(translate(&doc, Dialect::V3)["services"]["web"]["ports"], json!({"8080": "80", "9000": "90/udp"}));

        doc.service_mut("web").unwrap().ports_mut().unwrap().items[0] = Port::new("80");
        assert_eq!(
            translate(&doc, Dialect::V3)["services"]["web"]["ports"],
            json!(["80", "9000:90/udp"])
        );
    }

    #[test]
    fn test_translate_skips_invalid_fields() {
        let mut doc = ComposeDocument::new(pro());
        let mut web = Service::new("web").unwrap();
        web.set(Field::opaque("restart", json!("always")));
        web.set(Field::invalid(FieldError::unsupported(Scope::Service, "web", "gpus", json!("all"))));
        doc.add_service(web);
        assert_eq!(
            translate(&doc, Dialect::V3),
            json!({"version": "3", "services": {"web": {"restart": "always"}}})
        );
    }

    #[test]
    fn test_empty_sections_emitted_when_present() {
        let raw = json!({"version": "3", "services": {}, "volumes": {}});
        let doc = parse(&raw, Dialect::V3, &pro()).unwrap();
        assert_eq!(translate(&doc, Dialect::V3), raw);
    }
}
