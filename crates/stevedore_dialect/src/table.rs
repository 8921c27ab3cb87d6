//! Per-dialect field tables.

use crate::allowlist::{self, NETWORK_FIELDS, VOLUME_FIELDS};
use once_cell::sync::Lazy;
use std::collections::BTreeSet;
use stevedore_compose::Scope;
use stevedore_core::Dialect;

/// Everything that differs between dialects
#[derive(Debug, Clone)]
pub struct DialectTable {
    /// Dialect described by this table
    pub dialect: Dialect,
    service_fields: BTreeSet<&'static str>,
    volume_fields: BTreeSet<&'static str>,
    network_fields: BTreeSet<&'static str>,
    /// Whether `build` may be a map with a `context` key
    pub build_map: bool,
}

static V1: Lazy<DialectTable> = Lazy::new(|| DialectTable {
    dialect: Dialect::V1,
    service_fields: allowlist::v1_service_fields().into_iter().collect(),
    volume_fields: BTreeSet::new(),
    network_fields: BTreeSet::new(),
    build_map: false,
});

static V2: Lazy<DialectTable> = Lazy::new(|| DialectTable {
    dialect: Dialect::V2,
    service_fields: allowlist::v2_service_fields().into_iter().collect(),
    volume_fields: VOLUME_FIELDS.iter().copied().collect(),
    network_fields: NETWORK_FIELDS.iter().copied().collect(),
    build_map: true,
});

static V3: Lazy<DialectTable> = Lazy::new(|| DialectTable {
    dialect: Dialect::V3,
    service_fields: allowlist::v3_service_fields().into_iter().collect(),
    volume_fields: VOLUME_FIELDS.iter().copied().collect(),
    network_fields: NETWORK_FIELDS.iter().copied().collect(),
    build_map: true,
});

impl DialectTable {
    /// Shared table for a dialect
    #[must_use]
    pub fn of(dialect: Dialect) -> &'static DialectTable {
        match dialect {
            Dialect::V1 => &V1,
            Dialect::V2 => &V2,
            Dialect::V3 => &V3,
        }
    }

    /// Whether `name` is on the allow-list for `scope`
    ///
    /// Nothing is allowed at document scope; top-level keys are fixed by the
    /// tree shape.
    #[must_use]
    pub fn allows(&self, scope: Scope, name: &str) -> bool {
        let fields = match scope {
            Scope::Document => return false,
            Scope::Service => &self.service_fields,
            Scope::Volume => &self.volume_fields,
            Scope::Network => &self.network_fields,
        };
        fields.contains(name)
    }

    /// Whether the dialect has top-level sections
    #[must_use]
    pub fn has_sections(&self) -> bool {
        self.dialect.has_sections()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_by_dialect() {
        for dialect in Dialect::ALL {
            assert_eq!(DialectTable::of(dialect).dialect, dialect);
        }
    }

    #[test]
    fn test_service_allow_lists_differ() {
        let v1 = DialectTable::of(Dialect::V1);
        let v2 = DialectTable::of(Dialect::V2);
        let v3 = DialectTable::of(Dialect::V3);

        assert!(!v1.allows(Scope::Service, "depends_on"));
        assert!(v2.allows(Scope::Service, "depends_on"));
        assert!(v3.allows(Scope::Service, "depends_on"));

        assert!(v2.allows(Scope::Service, "mem_limit"));
        assert!(!v3.allows(Scope::Service, "mem_limit"));
        assert!(v3.allows(Scope::Service, "healthcheck"));
        assert!(!v3.allows(Scope::Service, "gpus"));
    }

    #[test]
    fn test_global_allow_lists() {
        let v3 = DialectTable::of(Dialect::V3);
        assert!(v3.allows(Scope::Network, "ipam"));
        assert!(!v3.allows(Scope::Volume, "ipam"));
        assert!(v3.allows(Scope::Volume, "external"));
        assert!(!v3.allows(Scope::Document, "services"));
        assert!(!DialectTable::of(Dialect::V1).allows(Scope::Volume, "driver"));
    }

    #[test]
    fn test_build_map() {
        assert!(!DialectTable::of(Dialect::V1).build_map);
        assert!(DialectTable::of(Dialect::V2).build_map);
    }
}
